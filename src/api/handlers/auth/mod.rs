//! Staff account workflow handlers.

pub mod login;
pub mod password_reset;
pub mod register;
pub mod state;
pub mod types;
pub mod utils;
pub mod verification;
