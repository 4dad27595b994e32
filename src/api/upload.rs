//! Media upload abstraction and Cloudinary client.
//!
//! Registration stages the profile photo in a temp file and hands the path to
//! a [`MediaUploader`], which returns a durable public URL. The default for
//! local dev is [`LogUploader`], which logs and returns a placeholder URL.

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use secrecy::ExposeSecret;
use serde::Deserialize;
use sha2::{Digest, Sha256};
use std::path::Path;
use tracing::info;

use crate::cli::globals::CloudinarySettings;

/// Upload a local file, returning a durable public URL.
#[async_trait]
pub trait MediaUploader: Send + Sync {
    async fn upload(&self, path: &Path, folder: &str) -> Result<String>;
}

/// Local dev uploader that logs the request and fabricates a URL.
#[derive(Clone, Debug)]
pub struct LogUploader;

#[async_trait]
impl MediaUploader for LogUploader {
    async fn upload(&self, path: &Path, folder: &str) -> Result<String> {
        info!(path = %path.display(), folder, "media upload stub");
        let name = path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("upload");
        Ok(format!("https://media.invalid/{folder}/{name}"))
    }
}

#[derive(Deserialize)]
struct UploadResponse {
    secure_url: Option<String>,
}

/// Cloudinary uploader using the signed upload endpoint.
pub struct CloudinaryUploader {
    http: reqwest::Client,
    settings: CloudinarySettings,
}

impl CloudinaryUploader {
    #[must_use]
    pub fn new(http: reqwest::Client, settings: CloudinarySettings) -> Self {
        Self { http, settings }
    }

    /// SHA-256 signature over the sorted request parameters plus the API secret.
    fn signature(&self, folder: &str, timestamp: i64) -> String {
        let mut hasher = Sha256::new();
        hasher.update(format!("folder={folder}&timestamp={timestamp}"));
        hasher.update(self.settings.api_secret.expose_secret());
        hex::encode(hasher.finalize())
    }
}

#[async_trait]
impl MediaUploader for CloudinaryUploader {
    async fn upload(&self, path: &Path, folder: &str) -> Result<String> {
        let bytes = tokio::fs::read(path)
            .await
            .with_context(|| format!("failed to read upload file {}", path.display()))?;
        let file_name = path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("upload")
            .to_string();

        let timestamp = Utc::now().timestamp();
        let form = reqwest::multipart::Form::new()
            .text("api_key", self.settings.api_key.clone())
            .text("timestamp", timestamp.to_string())
            .text("folder", folder.to_string())
            .text("signature", self.signature(folder, timestamp))
            .text("signature_algorithm", "sha256")
            .part(
                "file",
                reqwest::multipart::Part::bytes(bytes).file_name(file_name),
            );

        let url = format!(
            "https://api.cloudinary.com/v1_1/{}/auto/upload",
            self.settings.cloud_name
        );
        let response = self
            .http
            .post(&url)
            .multipart(form)
            .send()
            .await
            .context("cloudinary upload request failed")?;

        let status = response.status();
        if !status.is_success() {
            return Err(anyhow!("cloudinary upload rejected: {status}"));
        }

        let body: UploadResponse = response
            .json()
            .await
            .context("failed to decode cloudinary response")?;

        body.secure_url
            .ok_or_else(|| anyhow!("cloudinary response had no secure_url"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use secrecy::SecretString;

    #[tokio::test]
    async fn log_uploader_builds_url_from_folder_and_name() -> Result<()> {
        let url = LogUploader
            .upload(Path::new("/tmp/photo.png"), "profiles")
            .await?;
        assert_eq!(url, "https://media.invalid/profiles/photo.png");
        Ok(())
    }

    #[test]
    fn signature_is_stable_for_same_inputs() {
        let uploader = CloudinaryUploader::new(
            reqwest::Client::new(),
            CloudinarySettings {
                cloud_name: "clinic".to_string(),
                api_key: "key".to_string(),
                api_secret: SecretString::from("secret".to_string()),
            },
        );
        let first = uploader.signature("profiles", 1_700_000_000);
        let second = uploader.signature("profiles", 1_700_000_000);
        let other = uploader.signature("profiles", 1_700_000_001);
        assert_eq!(first, second);
        assert_ne!(first, other);
        assert_eq!(first.len(), 64);
    }
}
