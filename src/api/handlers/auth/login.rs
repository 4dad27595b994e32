use crate::{
    api::{
        error::ApiError,
        handlers::auth::{
            state::AuthState,
            types::{AccountSummary, AuthResponse, LoginRequest},
            utils::{normalize_email, valid_email},
        },
    },
    auth::{password::verify_password, token::issue_identity_token},
};
use axum::{
    extract::Extension,
    http::StatusCode,
    response::{IntoResponse, Json},
};
use secrecy::ExposeSecret;
use std::sync::Arc;
use tracing::{info, instrument};

/// Authenticate with email and password, returning a fresh identity token.
///
/// An unverified account is turned away before the password is checked, so
/// the verification nudge reaches users who mistyped their password too.
#[utoipa::path(
    post,
    path = "/auth/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 201, description = "Logged in", body = AuthResponse),
        (status = 401, description = "Unverified account or bad credentials"),
        (status = 404, description = "No account for that email"),
    )
)]
#[instrument(skip_all)]
pub async fn login(
    Extension(state): Extension<Arc<AuthState>>,
    Json(request): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if request.email.trim().is_empty() {
        return Err(ApiError::Validation("Please provide your email.".to_string()));
    }

    if request.password.is_empty() {
        return Err(ApiError::Validation(
            "Please provide your password.".to_string(),
        ));
    }

    let email = normalize_email(&request.email);
    if !valid_email(&email) {
        return Err(ApiError::Validation(
            "Please provide a valid email.".to_string(),
        ));
    }

    let Some(account) = state.directory.find_by_email(&email).await? else {
        return Err(ApiError::NotFound("User not found.".to_string()));
    };

    if !account.verified {
        return Err(ApiError::Unauthorized("Please verify your email.".to_string()));
    }

    if !verify_password(&request.password, &account.password_hash) {
        return Err(ApiError::Unauthorized(
            "Invalid email or password.".to_string(),
        ));
    }

    let token = issue_identity_token(
        state.config.token_secret.expose_secret(),
        &account.id.to_string(),
        state.config.identity_token_ttl,
    )?;

    info!(account_id = %account.id, "login");

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            message: "User logged in successfully".to_string(),
            user: AccountSummary::new(&account, token),
        }),
    ))
}
