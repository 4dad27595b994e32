//! Credential hashing and signed-token primitives for the account workflow.

pub mod password;
pub mod token;
