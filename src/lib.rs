//! Account service for clinic staff: registration with profile photo
//! upload, email verification, login, and password reset.

pub mod api;
pub mod auth;
pub mod cli;
pub mod directory;

pub static APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

#[cfg(test)]
mod tests {
    use super::APP_USER_AGENT;

    #[test]
    fn user_agent_carries_name_and_version() {
        assert!(APP_USER_AGENT.starts_with(env!("CARGO_PKG_NAME")));
        assert!(APP_USER_AGENT.ends_with(env!("CARGO_PKG_VERSION")));
    }
}
