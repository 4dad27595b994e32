use crate::{
    api::{
        email::password_reset_email,
        error::ApiError,
        handlers::auth::{
            state::AuthState,
            types::{EmailRequest, OutcomeResponse, ResetPasswordRequest},
            utils::{build_reset_url, normalize_email, strong_password, valid_email},
        },
    },
    auth::{
        password::hash_password,
        token::{issue_reset_token, reset_secret, verify_reset_token},
    },
};
use anyhow::{anyhow, Context};
use axum::{
    extract::{Extension, Path},
    response::{IntoResponse, Json},
};
use secrecy::ExposeSecret;
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;

const WEAK_PASSWORD_MESSAGE: &str =
    "Password is too weak. Must be 8+ chars with uppercase, lowercase, numbers, and symbols.";

/// Email a short-lived password reset link.
///
/// The reset token is signed with a secret derived from the account's
/// current password hash, so completing a reset invalidates any other
/// outstanding links.
#[utoipa::path(
    post,
    path = "/auth/forgot-password",
    tag = "auth",
    request_body = EmailRequest,
    responses(
        (status = 200, description = "Reset link sent", body = OutcomeResponse),
        (status = 400, description = "Email is required"),
        (status = 404, description = "No account for that email"),
        (status = 422, description = "Invalid email"),
    )
)]
#[instrument(skip_all)]
pub async fn forgot_password(
    Extension(state): Extension<Arc<AuthState>>,
    Json(request): Json<EmailRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if request.email.trim().is_empty() {
        return Err(ApiError::BadRequest("Email is required.".to_string()));
    }

    let email = normalize_email(&request.email);
    if !valid_email(&email) {
        return Err(ApiError::Validation(
            "Please provide a valid email.".to_string(),
        ));
    }

    let Some(account) = state.directory.find_by_email(&email).await? else {
        return Err(ApiError::NotFound(
            "No account found with that email.".to_string(),
        ));
    };

    let secret = reset_secret(
        state.config.token_secret.expose_secret(),
        &account.password_hash,
    );
    let token = issue_reset_token(
        &secret,
        &account.id.to_string(),
        &account.email,
        state.config.reset_token_ttl,
    )?;

    let link = build_reset_url(&state.config.base_url, &account.id.to_string(), &token);

    // SMTP delivery is blocking; keep it off the async workers.
    let mailer = state.mailer.clone();
    let message = password_reset_email(&account.email, &link);
    tokio::task::spawn_blocking(move || mailer.send(&message))
        .await
        .context("email delivery task failed")?
        .map_err(|err| ApiError::Internal(anyhow!("reset email delivery failed: {err}")))?;

    info!(account_id = %account.id, "reset link sent");

    Ok(Json(OutcomeResponse {
        success: true,
        message: "Reset link sent to email.".to_string(),
    }))
}

/// Set a new password using the link from the reset email.
#[utoipa::path(
    post,
    path = "/auth/reset-password/{id}/{token}",
    tag = "auth",
    request_body = ResetPasswordRequest,
    params(
        ("id" = String, Path, description = "Account id"),
        ("token" = String, Path, description = "Reset token"),
    ),
    responses(
        (status = 200, description = "Password updated", body = OutcomeResponse),
        (status = 400, description = "Missing fields"),
        (status = 401, description = "Invalid or expired link"),
        (status = 404, description = "Unknown account or email mismatch"),
        (status = 422, description = "Invalid email or weak password"),
    )
)]
#[instrument(skip_all)]
pub async fn reset_password(
    Extension(state): Extension<Arc<AuthState>>,
    Path((id, token)): Path<(String, String)>,
    Json(request): Json<ResetPasswordRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if request.email.trim().is_empty() || request.password.is_empty() {
        return Err(ApiError::BadRequest("All fields are required.".to_string()));
    }

    let email = normalize_email(&request.email);
    if !valid_email(&email) {
        return Err(ApiError::Validation("Invalid email format.".to_string()));
    }

    if !strong_password(&request.password) {
        return Err(ApiError::Validation(WEAK_PASSWORD_MESSAGE.to_string()));
    }

    let Ok(account_id) = Uuid::parse_str(&id) else {
        return Err(ApiError::NotFound(
            "User not found or email mismatch.".to_string(),
        ));
    };

    let account = state.directory.find_by_id(account_id).await?;
    let Some(mut account) = account.filter(|account| account.email == email) else {
        return Err(ApiError::NotFound(
            "User not found or email mismatch.".to_string(),
        ));
    };

    // Reconstructing the secret from the current hash is the replay guard:
    // once the hash changes, the old token stops verifying.
    let secret = reset_secret(
        state.config.token_secret.expose_secret(),
        &account.password_hash,
    );
    let valid = verify_reset_token(&secret, &token)
        .is_some_and(|claims| claims.sub == account.id.to_string() && claims.email == account.email);
    if !valid {
        return Err(ApiError::Unauthorized(
            "Invalid or expired reset link.".to_string(),
        ));
    }

    account.password_hash = hash_password(&request.password)?;
    state.directory.save(&account).await?;

    info!(account_id = %account.id, "password reset");

    Ok(Json(OutcomeResponse {
        success: true,
        message: "Password updated successfully. You can now log in.".to_string(),
    }))
}
