use crate::api::handlers::{auth, health};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health,
        auth::register::register,
        auth::login::login,
        auth::verification::verify_email_request,
        auth::verification::confirm_email,
        auth::password_reset::forgot_password,
        auth::password_reset::reset_password,
    ),
    components(schemas(
        health::Health,
        auth::types::AccountSummary,
        auth::types::AuthResponse,
        auth::types::MessageResponse,
        auth::types::OutcomeResponse,
        auth::types::LoginRequest,
        auth::types::EmailRequest,
        auth::types::ResetPasswordRequest,
    )),
    tags(
        (name = "auth", description = "Clinic staff account workflow"),
        (name = "health", description = "Service health"),
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn doc_includes_all_auth_paths() {
        let doc = ApiDoc::openapi();
        let paths = &doc.paths.paths;
        for path in [
            "/health",
            "/auth/register",
            "/auth/login",
            "/auth/verify-email-request",
            "/auth/confirmemail",
            "/auth/forgot-password",
            "/auth/reset-password/{id}/{token}",
        ] {
            assert!(paths.contains_key(path), "missing path {path}");
        }
    }
}
