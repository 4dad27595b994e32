//! Configuration passed into the server; business logic never reads the
//! process environment directly.

use secrecy::SecretString;

/// SMTP relay credentials for the notifier.
#[derive(Clone)]
pub struct SmtpSettings {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: SecretString,
    pub sender: String,
}

/// Cloudinary credentials for the media uploader.
#[derive(Clone)]
pub struct CloudinarySettings {
    pub cloud_name: String,
    pub api_key: String,
    pub api_secret: SecretString,
}

/// Process-wide configuration. `smtp`/`cloudinary` left unset fall back to
/// the logging stubs for local dev.
#[derive(Clone)]
pub struct GlobalArgs {
    pub base_url: String,
    pub token_secret: SecretString,
    pub smtp: Option<SmtpSettings>,
    pub cloudinary: Option<CloudinarySettings>,
}

impl GlobalArgs {
    #[must_use]
    pub fn new(base_url: String, token_secret: SecretString) -> Self {
        Self {
            base_url,
            token_secret,
            smtp: None,
            cloudinary: None,
        }
    }
}

impl std::fmt::Debug for GlobalArgs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GlobalArgs")
            .field("base_url", &self.base_url)
            .field("token_secret", &"***")
            .field("smtp", &self.smtp.as_ref().map(|s| &s.host))
            .field(
                "cloudinary",
                &self.cloudinary.as_ref().map(|c| &c.cloud_name),
            )
            .finish()
    }
}

impl std::fmt::Debug for SmtpSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmtpSettings")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &"***")
            .field("sender", &self.sender)
            .finish()
    }
}

impl std::fmt::Debug for CloudinarySettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CloudinarySettings")
            .field("cloud_name", &self.cloud_name)
            .field("api_key", &self.api_key)
            .field("api_secret", &"***")
            .finish()
    }
}
