//! REST API endpoint handlers.
//!
//! These complement the WebSocket channel for clients that prefer
//! request/response semantics: session management, options for building
//! the controls, and non-streaming turns.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use omni_tutor::Message;
use omni_tutor::catalog::Subject;
use omni_tutor::client::CompletionClient;
use omni_tutor::error::{ConfigError, TutorError};
use omni_tutor::session::SessionConfig;
use omni_tutor::turn::{ModelSettings, run_turn};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::registry::{SessionRegistry, SharedSession};
use crate::snapshot::{OptionsSnapshot, SessionSnapshot};

/// The embedded single-page UI.
pub const INDEX_HTML: &str = include_str!("../static/index.html");

/// Shared application state passed to all handlers via axum's `State` extractor.
#[derive(Clone)]
pub struct AppState {
    pub sessions: SessionRegistry,
    pub client: Arc<dyn CompletionClient>,
    pub settings: Arc<ModelSettings>,
}

/// Error body: `{"kind": ..., "message": ...}`.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    kind: &'static str,
    message: String,
}

impl ApiError {
    fn not_found(id: &Uuid) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            kind: "not_found",
            message: format!("no session with id {id}"),
        }
    }

    fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            kind: "bad_request",
            message: message.into(),
        }
    }
}

impl From<TutorError> for ApiError {
    fn from(err: TutorError) -> Self {
        let status = match &err {
            TutorError::Config(ConfigError::UnknownStyle(_) | ConfigError::UnknownSubject(_)) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            TutorError::Config(_) => StatusCode::SERVICE_UNAVAILABLE,
            TutorError::Remote(_) => StatusCode::BAD_GATEWAY,
        };
        Self {
            status,
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}

impl From<ConfigError> for ApiError {
    fn from(err: ConfigError) -> Self {
        TutorError::from(err).into()
    }
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    kind: &'a str,
    message: &'a str,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            kind: self.kind,
            message: &self.message,
        };
        (self.status, Json(body)).into_response()
    }
}

fn lookup(app: &AppState, id: &Uuid) -> Result<SharedSession, ApiError> {
    app.sessions.get(id).ok_or_else(|| ApiError::not_found(id))
}

/// GET /: The chat page.
pub async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

/// GET /api/options: Subjects, styles and slider range for the controls.
pub async fn get_options() -> Json<OptionsSnapshot> {
    Json(OptionsSnapshot::current())
}

/// POST /api/sessions: Start a session seeded with the greeting.
pub async fn create_session(State(app): State<AppState>) -> (StatusCode, Json<SessionSnapshot>) {
    let (_, session) = app.sessions.create();
    let snapshot = SessionSnapshot::from_session(&*session.lock().await);
    (StatusCode::CREATED, Json(snapshot))
}

/// GET /api/sessions/{id}: Full history of a session.
pub async fn get_session(
    State(app): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionSnapshot>, ApiError> {
    let session = lookup(&app, &id)?;
    let snapshot = SessionSnapshot::from_session(&*session.lock().await);
    Ok(Json(snapshot))
}

/// DELETE /api/sessions/{id}: Discard a session.
pub async fn delete_session(
    State(app): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    if app.sessions.remove(&id) {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::not_found(&id))
    }
}

/// Request body for POST /api/sessions/{id}/reset.
#[derive(Deserialize)]
pub struct ResetRequest {
    pub subject: String,
}

/// POST /api/sessions/{id}/reset: Clear history, greet for the subject.
pub async fn reset_session(
    State(app): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<ResetRequest>,
) -> Result<Json<SessionSnapshot>, ApiError> {
    let session = lookup(&app, &id)?;
    let subject: Subject = body.subject.parse()?;
    let mut session = session.lock().await;
    session.reset(subject);
    Ok(Json(SessionSnapshot::from_session(&session)))
}

/// Request body for POST /api/sessions/{id}/chat.
#[derive(Deserialize)]
pub struct ChatRequest {
    pub message: String,
    pub subject: String,
    pub style: String,
    #[serde(default)]
    pub temperature: Option<f32>,
}

/// Response body for POST /api/sessions/{id}/chat.
#[derive(Serialize)]
pub struct ChatResponse {
    pub reply: String,
    pub messages: Vec<Message>,
}

/// POST /api/sessions/{id}/chat: Run a turn and return the finished reply.
///
/// Holds the session for the whole turn. Returns 400 for blank input, 422
/// for a subject or style outside the catalog, 503 for other configuration
/// problems (no API key) and 502 when the completion endpoint fails.
pub async fn post_chat(
    State(app): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, ApiError> {
    let session = lookup(&app, &id)?;
    if body.message.trim().is_empty() {
        return Err(ApiError::bad_request("message must not be blank"));
    }
    let config = SessionConfig::parse(&body.subject, &body.style, body.temperature)?;

    let mut session = session.lock().await;
    let reply = run_turn(
        &mut session,
        app.client.as_ref(),
        &config,
        &app.settings,
        &body.message,
        |_| {},
    )
    .await?;

    Ok(Json(ChatResponse {
        reply,
        messages: session.history.all().to_vec(),
    }))
}
