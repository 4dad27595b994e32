use crate::{api::handlers::auth::utils::verified_label, directory::Account};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Account fields exposed to clients, the password hash never leaves
/// the directory layer.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AccountSummary {
    pub id: String,
    pub email: String,
    pub username: String,
    #[serde(rename = "profilePhoto")]
    pub profile_photo: String,
    pub role: String,
    pub token: String,
    // the wire format carries the flag as a string, "true" or "false"
    #[serde(rename = "isVerified")]
    pub is_verified: String,
}

impl AccountSummary {
    #[must_use]
    pub fn new(account: &Account, token: String) -> Self {
        Self {
            id: account.id.to_string(),
            email: account.email.clone(),
            username: account.username.clone(),
            profile_photo: account.profile_photo_url.clone(),
            role: account.role.as_str().to_string(),
            token,
            is_verified: verified_label(account.verified).to_string(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AuthResponse {
    pub message: String,
    pub user: AccountSummary,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct OutcomeResponse {
    pub success: bool,
    pub message: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct EmailRequest {
    #[serde(default)]
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct ConfirmEmailQuery {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub token: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ResetPasswordRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}
