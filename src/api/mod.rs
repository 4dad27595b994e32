//! HTTP server wiring for the staff account service.

use crate::{
    api::{
        email::{EmailSender, LogEmailSender, SmtpEmailSender},
        handlers::{
            auth::{
                login, password_reset, register,
                state::{AuthConfig, AuthState},
                verification,
            },
            health, root,
        },
        openapi::ApiDoc,
        upload::{CloudinaryUploader, LogUploader, MediaUploader},
    },
    cli::globals::GlobalArgs,
    directory::PgDirectory,
};
use anyhow::{Context, Result};
use axum::{
    body::Body,
    extract::MatchedPath,
    http::{HeaderName, HeaderValue, Request},
    routing::{get, post},
    Extension, Router,
};
use sqlx::postgres::PgPoolOptions;
use std::{sync::Arc, time::Duration};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    request_id::PropagateRequestIdLayer, set_header::SetRequestHeaderLayer, trace::TraceLayer,
};
use tracing::{info, info_span, Span};
use ulid::Ulid;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub mod email;
pub mod error;
pub mod handlers;
pub mod openapi;
pub mod upload;

/// Build the application router. Tests drive this directly with in-memory
/// collaborators; `new` wires the production ones.
#[must_use]
pub fn app(state: Arc<AuthState>) -> Router {
    Router::new()
        .route("/", get(root::root))
        .route("/health", get(health::health))
        .route("/auth/register", post(register::register))
        .route("/auth/login", post(login::login))
        .route(
            "/auth/verify-email-request",
            post(verification::verify_email_request),
        )
        .route("/auth/confirmemail", get(verification::confirm_email))
        .route("/auth/forgot-password", post(password_reset::forgot_password))
        .route(
            "/auth/reset-password/:id/:token",
            post(password_reset::reset_password),
        )
        .layer(Extension(state))
}

/// Start the server
/// # Errors
/// Return error if failed to start the server
pub async fn new(port: u16, dsn: String, globals: &GlobalArgs) -> Result<()> {
    // Connect to database
    let pool = PgPoolOptions::new()
        .min_connections(1)
        .max_connections(5)
        .max_lifetime(Duration::from_secs(60 * 2))
        .test_before_acquire(true)
        .connect(&dsn)
        .await
        .context("Failed to connect to database")?;

    let mailer: Arc<dyn EmailSender> = match &globals.smtp {
        Some(settings) => Arc::new(SmtpEmailSender::new(settings)?),
        None => {
            info!("no SMTP relay configured, logging emails instead");
            Arc::new(LogEmailSender)
        }
    };

    let uploader: Arc<dyn MediaUploader> = match &globals.cloudinary {
        Some(settings) => Arc::new(CloudinaryUploader::new(
            reqwest::Client::builder()
                .user_agent(crate::APP_USER_AGENT)
                .build()
                .context("Failed to build HTTP client")?,
            settings.clone(),
        )),
        None => {
            info!("no Cloudinary credentials configured, logging uploads instead");
            Arc::new(LogUploader)
        }
    };

    let state = Arc::new(AuthState {
        config: AuthConfig::new(globals.base_url.clone(), globals.token_secret.clone()),
        directory: Arc::new(PgDirectory::new(pool)),
        mailer,
        uploader,
    });

    let app = app(state)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestHeaderLayer::if_not_present(
                    HeaderName::from_static("x-request-id"),
                    |_req: &_| HeaderValue::from_str(Ulid::new().to_string().as_str()).ok(),
                ))
                .layer(PropagateRequestIdLayer::new(HeaderName::from_static(
                    "x-request-id",
                )))
                .layer(TraceLayer::new_for_http().make_span_with(make_span)),
        );

    let listener = TcpListener::bind(format!("::0:{port}")).await?;

    info!("Listening on [::]:{}", port);

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Gracefully shutdown");
        })
        .await?;

    Ok(())
}

fn make_span(request: &Request<Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|val| val.to_str().ok())
        .unwrap_or("none");
    let matched_path = request
        .extensions()
        .get::<MatchedPath>()
        .map_or_else(|| request.uri().path(), MatchedPath::as_str);

    info_span!(
        "http.request",
        http.method = %request.method(),
        http.route = matched_path,
        request_id
    )
}
