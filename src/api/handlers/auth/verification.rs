use crate::{
    api::{
        email::verification_email,
        error::ApiError,
        handlers::auth::{
            state::AuthState,
            types::{ConfirmEmailQuery, EmailRequest, MessageResponse},
            utils::{build_confirm_email_url, normalize_email, valid_email},
        },
    },
    auth::token::{issue_identity_token, verify_identity_token},
};
use anyhow::Context;
use axum::{
    extract::{Extension, Query},
    response::{IntoResponse, Json},
};
use secrecy::ExposeSecret;
use std::sync::Arc;
use tracing::{info, instrument, warn};

const SENT_MESSAGE: &str = "If an account exists for this email, a verification link has been sent.";

/// Send (or re-send) the verification email. The response never reveals
/// whether the address has an account.
#[utoipa::path(
    post,
    path = "/auth/verify-email-request",
    tag = "auth",
    request_body = EmailRequest,
    responses(
        (status = 200, description = "Verification email queued", body = MessageResponse),
        (status = 422, description = "Missing or invalid email"),
        (status = 502, description = "Email delivery failed"),
    )
)]
#[instrument(skip_all)]
pub async fn verify_email_request(
    Extension(state): Extension<Arc<AuthState>>,
    Json(request): Json<EmailRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if request.email.trim().is_empty() {
        return Err(ApiError::Validation("Please provide your email.".to_string()));
    }

    let email = normalize_email(&request.email);
    if !valid_email(&email) {
        return Err(ApiError::Validation(
            "Please provide a valid email.".to_string(),
        ));
    }

    if let Some(account) = state.directory.find_by_email(&email).await? {
        let token = issue_identity_token(
            state.config.token_secret.expose_secret(),
            &account.id.to_string(),
            state.config.identity_token_ttl,
        )?;
        let link = build_confirm_email_url(&state.config.base_url, &account.email, &token)?;

        // SMTP delivery is blocking; keep it off the async workers.
        let mailer = state.mailer.clone();
        let message = verification_email(&account.email, &link);
        let delivered = tokio::task::spawn_blocking(move || mailer.send(&message))
            .await
            .context("email delivery task failed")?;
        if let Err(err) = delivered {
            warn!("verification email failed for {}: {err:?}", account.email);
            return Err(ApiError::Gateway(
                "We couldn't send the verification email. Please try again later.".to_string(),
            ));
        }
    }

    Ok(Json(MessageResponse {
        message: SENT_MESSAGE.to_string(),
    }))
}

/// Confirm an email address from the link in the verification email.
///
/// The token subject must match the account the email resolves to, so a
/// valid token for one account cannot verify another.
#[utoipa::path(
    get,
    path = "/auth/confirmemail",
    tag = "auth",
    params(
        ("email" = String, Query, description = "Account email"),
        ("token" = String, Query, description = "Verification token"),
    ),
    responses(
        (status = 200, description = "Email verified", body = MessageResponse),
        (status = 401, description = "Invalid token"),
        (status = 404, description = "No account for that email"),
        (status = 422, description = "Missing inputs"),
    )
)]
#[instrument(skip_all)]
pub async fn confirm_email(
    Extension(state): Extension<Arc<AuthState>>,
    Query(query): Query<ConfirmEmailQuery>,
) -> Result<impl IntoResponse, ApiError> {
    if query.email.trim().is_empty() {
        return Err(ApiError::Validation("Please provide your email.".to_string()));
    }

    if query.token.is_empty() {
        return Err(ApiError::Validation("Please provide your token.".to_string()));
    }

    let email = normalize_email(&query.email);
    if !valid_email(&email) {
        return Err(ApiError::Validation(
            "Please provide a valid email.".to_string(),
        ));
    }

    let Some(mut account) = state.directory.find_by_email(&email).await? else {
        return Err(ApiError::NotFound("User not found.".to_string()));
    };

    let Some(claims) =
        verify_identity_token(state.config.token_secret.expose_secret(), &query.token)
    else {
        return Err(ApiError::Unauthorized("Invalid token.".to_string()));
    };

    if claims.sub != account.id.to_string() {
        return Err(ApiError::Unauthorized("Invalid token.".to_string()));
    }

    if !account.verified {
        account.verified = true;
        state.directory.save(&account).await?;
        info!(account_id = %account.id, "email verified");
    }

    Ok(Json(MessageResponse {
        message: "Email successfully verified.".to_string(),
    }))
}
