use crate::cli::{
    actions::Action,
    globals::{CloudinarySettings, GlobalArgs, SmtpSettings},
};
use anyhow::{anyhow, Context, Result};
use secrecy::SecretString;

/// Build the action and global configuration from parsed arguments.
///
/// # Errors
///
/// Returns an error if a required argument is missing or inconsistent.
pub fn handler(matches: &clap::ArgMatches) -> Result<(Action, GlobalArgs)> {
    let required = |name: &str| -> Result<String> {
        matches
            .get_one::<String>(name)
            .map(ToString::to_string)
            .ok_or_else(|| anyhow!("missing required argument: --{name}"))
    };

    let action = Action::Server {
        port: matches.get_one::<u16>("port").copied().unwrap_or(8080),
        dsn: required("dsn")?,
    };

    let mut globals = GlobalArgs::new(
        required("base-url")?,
        SecretString::from(required("token-secret")?),
    );

    if let Some(host) = matches.get_one::<String>("smtp-host") {
        globals.smtp = Some(SmtpSettings {
            host: host.to_string(),
            port: matches.get_one::<u16>("smtp-port").copied().unwrap_or(587),
            username: required("smtp-username").context("SMTP relay needs --smtp-username")?,
            password: SecretString::from(
                required("smtp-password").context("SMTP relay needs --smtp-password")?,
            ),
            sender: required("smtp-sender").context("SMTP relay needs --smtp-sender")?,
        });
    }

    if let Some(cloud_name) = matches.get_one::<String>("cloudinary-cloud-name") {
        globals.cloudinary = Some(CloudinarySettings {
            cloud_name: cloud_name.to_string(),
            api_key: required("cloudinary-api-key")
                .context("Cloudinary needs --cloudinary-api-key")?,
            api_secret: SecretString::from(
                required("cloudinary-api-secret")
                    .context("Cloudinary needs --cloudinary-api-secret")?,
            ),
        });
    }

    Ok((action, globals))
}
