use crate::{
    api::{
        error::ApiError,
        handlers::auth::{
            state::AuthState,
            types::{AccountSummary, AuthResponse},
            utils::{normalize_email, strong_password, valid_email},
        },
    },
    auth::{password::hash_password, token::issue_identity_token},
    directory::{CreateOutcome, NewAccount, Role},
};
use anyhow::Context;
use axum::{
    extract::{Extension, Multipart},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use secrecy::ExposeSecret;
use std::io::Write;
use std::sync::Arc;
use tempfile::NamedTempFile;
use tracing::{info, instrument, warn};

/// Cloudinary folder for staff profile photos.
const PHOTO_FOLDER: &str = "profile_photos";

#[derive(Default)]
struct RegisterForm {
    username: Option<String>,
    email: Option<String>,
    password: Option<String>,
    role: Option<String>,
    photo: Option<(String, Vec<u8>)>,
}

async fn read_form(mut multipart: Multipart) -> Result<RegisterForm, ApiError> {
    let mut form = RegisterForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|err| ApiError::BadRequest(format!("Invalid form data: {err}")))?
    {
        let Some(name) = field.name().map(ToString::to_string) else {
            continue;
        };
        match name.as_str() {
            "username" => form.username = Some(read_text(field).await?),
            "email" => form.email = Some(read_text(field).await?),
            "password" => form.password = Some(read_text(field).await?),
            "role" => form.role = Some(read_text(field).await?),
            "file" | "photo" | "profilePhoto" => {
                let file_name = field
                    .file_name()
                    .map_or_else(|| "photo".to_string(), ToString::to_string);
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|err| ApiError::BadRequest(format!("Invalid form data: {err}")))?;
                form.photo = Some((file_name, bytes.to_vec()));
            }
            _ => {}
        }
    }

    Ok(form)
}

async fn read_text(field: axum::extract::multipart::Field<'_>) -> Result<String, ApiError> {
    field
        .text()
        .await
        .map_err(|err| ApiError::BadRequest(format!("Invalid form data: {err}")))
}

/// Stage the uploaded bytes on disk so the uploader can stream a real file.
fn stage_photo(file_name: &str, bytes: &[u8]) -> anyhow::Result<NamedTempFile> {
    let suffix = std::path::Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map_or_else(String::new, |ext| format!(".{ext}"));
    let mut staged = tempfile::Builder::new()
        .prefix("clinica-photo-")
        .suffix(&suffix)
        .tempfile()
        .context("failed to create staging file")?;
    staged
        .write_all(bytes)
        .context("failed to stage photo bytes")?;
    Ok(staged)
}

/// Register a new staff account from a multipart form and send the
/// verification email.
#[utoipa::path(
    post,
    path = "/auth/register",
    tag = "auth",
    responses(
        (status = 201, description = "Account created", body = AuthResponse),
        (status = 409, description = "Email already exists"),
        (status = 422, description = "Invalid input"),
        (status = 500, description = "Image upload failed"),
    )
)]
#[instrument(skip_all)]
pub async fn register(
    Extension(state): Extension<Arc<AuthState>>,
    multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    let form = read_form(multipart).await?;

    let (Some(username), Some(email), Some(password), Some(role), Some((file_name, bytes))) =
        (form.username, form.email, form.password, form.role, form.photo)
    else {
        return Err(ApiError::Validation("Please fill all the fields".to_string()));
    };

    if username.trim().is_empty() || email.trim().is_empty() || password.is_empty() {
        return Err(ApiError::Validation("Please fill all the fields".to_string()));
    }

    let email = normalize_email(&email);
    if !valid_email(&email) {
        return Err(ApiError::Validation("Please enter a valid email".to_string()));
    }

    if !strong_password(&password) {
        return Err(ApiError::Validation(
            "Please enter a stronger password".to_string(),
        ));
    }

    let Some(role) = Role::parse(&role) else {
        return Err(ApiError::Validation("Invalid role".to_string()));
    };

    // Fast-path duplicate check; the store's unique constraint still has
    // the final word below.
    if state.directory.find_by_email(&email).await?.is_some() {
        return Err(ApiError::Conflict("Email already exists".to_string()));
    }

    let password_hash = hash_password(&password)?;

    let staged = stage_photo(&file_name, &bytes)?;
    let profile_photo_url = match state.uploader.upload(staged.path(), PHOTO_FOLDER).await {
        Ok(url) => url,
        Err(err) => {
            warn!("profile photo upload failed: {err:?}");
            return Err(ApiError::Upload("Image upload failed".to_string()));
        }
    };

    let account = match state
        .directory
        .create(NewAccount {
            email: email.clone(),
            username: username.trim().to_string(),
            password_hash,
            role,
            profile_photo_url,
        })
        .await?
    {
        CreateOutcome::Created(account) => account,
        CreateOutcome::Conflict => {
            return Err(ApiError::Conflict("Email already exists".to_string()));
        }
    };

    let token = issue_identity_token(
        state.config.token_secret.expose_secret(),
        &account.id.to_string(),
        state.config.identity_token_ttl,
    )?;

    info!(account_id = %account.id, "account registered");

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            message: "User successfully registered".to_string(),
            user: AccountSummary::new(&account, token),
        }),
    ))
}
