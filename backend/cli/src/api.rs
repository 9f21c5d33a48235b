use std::any::Any;
use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, DefaultBodyLimit, State},
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE},
        HeaderName, StatusCode,
    },
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde_json::{json, Value};
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{self, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use draftschema_config::defaults::BODY_LIMIT_BYTES;
use draftschema_config::Config;
use draftschema_core::{schema, DesignDocument, ProxyError, SchemaProvider};
use draftschema_logging::redact_sensitive_data;

/// Shared application state for API handlers.
pub struct AppState {
    pub config: Config,
    pub provider: Arc<dyn SchemaProvider>,
}

impl AppState {
    pub fn new(config: Config, provider: Arc<dyn SchemaProvider>) -> Self {
        Self { config, provider }
    }
}

/// Build the Axum router with all API routes, CORS, and request tracing.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(health))
        .route("/models", get(list_models))
        .route("/infer-schema", post(infer_schema))
        .layer(DefaultBodyLimit::max(BODY_LIMIT_BYTES))
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(cors_layer())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Any origin; preflights are answered by the layer with an empty 200.
fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(cors::Any)
        .allow_methods(cors::Any)
        .allow_headers([
            CONTENT_TYPE,
            AUTHORIZATION,
            HeaderName::from_static("x-goog-api-key"),
        ])
}

/// Error response carrying the `{ "error", "raw" }` body.
pub struct ApiError(pub ProxyError);

impl From<ProxyError> for ApiError {
    fn from(err: ProxyError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.0.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        if status.is_server_error() {
            error!(status = status.as_u16(), error = %redact_sensitive_data(&self.0.to_string()), "Request failed");
        } else {
            warn!(status = status.as_u16(), error = %self.0, "Request rejected");
        }
        (status, Json(self.0.to_body())).into_response()
    }
}

/// Turn a handler panic into the generic internal error body.
fn panic_response(err: Box<dyn Any + Send + 'static>) -> Response {
    let message = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "handler panicked".to_string()
    };
    error!(error = %message, "Handler panicked");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": message })),
    )
        .into_response()
}

/// Liveness check.
async fn health() -> &'static str {
    "OK"
}

/// Forward the provider's model catalog with its own status code.
async fn list_models(State(state): State<Arc<AppState>>) -> Result<Response, ApiError> {
    let reply = state.provider.list_models().await?;
    let status = StatusCode::from_u16(reply.status).unwrap_or(StatusCode::BAD_GATEWAY);
    Ok((status, [(CONTENT_TYPE, "application/json")], reply.body).into_response())
}

/// Turn a design document into schema JSON via the configured provider.
async fn infer_schema(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(design) = match payload {
        Ok(payload) => payload,
        Err(rejection) => {
            warn!(status = rejection.status().as_u16(), reason = %rejection.body_text(), "Rejected design body");
            return Ok((
                rejection.status(),
                Json(json!({ "error": rejection.body_text() })),
            )
                .into_response());
        }
    };

    let text = infer(&state, &DesignDocument::from(design)).await?;
    Ok(([(CONTENT_TYPE, "application/json")], text).into_response())
}

/// Call the provider and, when enabled, check the output shape.
///
/// The returned text is always the provider's output, unmodified.
pub async fn infer(state: &AppState, design: &DesignDocument) -> Result<String, ProxyError> {
    let provider = state.provider.name();
    info!(provider = %provider, "Inferring schema");

    let text = state.provider.generate(design).await?;

    if state.config.validate_output {
        schema::validate(&text)?;
    }

    info!(provider = %provider, bytes = text.len(), "Schema inferred");
    Ok(text)
}
