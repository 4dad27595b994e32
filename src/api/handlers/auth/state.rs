use crate::{
    api::{email::EmailSender, upload::MediaUploader},
    auth::token::{IDENTITY_TOKEN_TTL_SECONDS, RESET_TOKEN_TTL_SECONDS},
    directory::UserDirectory,
};
use secrecy::SecretString;
use std::sync::Arc;

/// Static configuration for the auth handlers.
#[derive(Clone)]
pub struct AuthConfig {
    pub base_url: String,
    pub token_secret: SecretString,
    pub identity_token_ttl: i64,
    pub reset_token_ttl: i64,
}

impl AuthConfig {
    #[must_use]
    pub fn new(base_url: String, token_secret: SecretString) -> Self {
        Self {
            base_url,
            token_secret,
            identity_token_ttl: IDENTITY_TOKEN_TTL_SECONDS,
            reset_token_ttl: RESET_TOKEN_TTL_SECONDS,
        }
    }
}

/// Shared state for the auth handlers, wired up in `api::new` and by tests.
#[derive(Clone)]
pub struct AuthState {
    pub config: AuthConfig,
    pub directory: Arc<dyn UserDirectory>,
    pub mailer: Arc<dyn EmailSender>,
    pub uploader: Arc<dyn MediaUploader>,
}
