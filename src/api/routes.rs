//! HTTP routes of the web form.

use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use tower_http::trace::TraceLayer;

use super::page::INDEX_HTML;
use super::session::{session_cookie, session_id, SessionStore};
use super::types::{
    ErrorResponse, HealthResponse, RecipeRequest, RecipeResponse, SessionResponse, SetKeyRequest,
};
use crate::config::{ApiKey, Config, SessionConfig};
use crate::recipe::ResponseGenerator;

/// Builds a generator bound to one session's credential.
pub type GeneratorFactory = Arc<dyn Fn(ApiKey) -> ResponseGenerator + Send + Sync>;

/// Shared application state.
pub struct AppState {
    pub sessions: SessionStore,
    pub secure_cookie: bool,
    pub generators: GeneratorFactory,
}

impl AppState {
    /// State whose generators talk to the configured model and weather endpoints.
    pub fn new(config: Config) -> Self {
        let session = config.session.clone();
        let config = Arc::new(config);
        Self::with_generators(
            &session,
            Arc::new(move |key: ApiKey| ResponseGenerator::new(config.as_ref().clone(), key)),
        )
    }

    pub fn with_generators(session: &SessionConfig, generators: GeneratorFactory) -> Self {
        Self {
            sessions: SessionStore::new(session.idle_timeout),
            secure_cookie: session.secure_cookie,
            generators,
        }
    }
}

/// Build the router.
pub fn create_app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/api/health", get(health))
        .route("/api/session", get(get_session))
        .route("/api/session/key", post(set_key).delete(clear_key))
        .route("/api/recipe", post(create_recipe))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

async fn get_session(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Json<SessionResponse> {
    let has_key = match session_id(&headers) {
        Some(id) => state.sessions.get(id).await.is_some(),
        None => false,
    };
    Json(SessionResponse { has_key })
}

async fn set_key(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(req): Json<SetKeyRequest>,
) -> Response {
    let Some(key) = ApiKey::new(req.api_key) else {
        return error_response(StatusCode::BAD_REQUEST, "API key must not be empty");
    };

    // The id always comes from the server; a presented one is retired.
    if let Some(previous) = session_id(&headers) {
        state.sessions.clear(previous).await;
    }
    let id = state.sessions.create(key).await;
    let active = state.sessions.len().await;
    tracing::info!(session = %id, active, "Stored API key for session");

    (
        [(header::SET_COOKIE, session_cookie(id, state.secure_cookie))],
        Json(SessionResponse { has_key: true }),
    )
        .into_response()
}

async fn clear_key(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Json<SessionResponse> {
    if let Some(id) = session_id(&headers) {
        if state.sessions.clear(id).await {
            tracing::info!(session = %id, "Cleared API key for session");
        }
    }
    Json(SessionResponse { has_key: false })
}

async fn create_recipe(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(req): Json<RecipeRequest>,
) -> Response {
    let key = match session_id(&headers) {
        Some(id) => state.sessions.get(id).await,
        None => None,
    };
    let Some(key) = key else {
        return error_response(StatusCode::UNAUTHORIZED, "Set an API key first");
    };

    let generator = (state.generators)(key);
    let response = generator.generate(&req.text).await;
    Json(RecipeResponse { response }).into_response()
}

fn error_response(status: StatusCode, message: &str) -> Response {
    (
        status,
        Json(ErrorResponse {
            error: message.to_string(),
        }),
    )
        .into_response()
}
