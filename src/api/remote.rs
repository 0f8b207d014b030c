//! Remote chat with per-session short-term memory

use crate::api::{ApiError, RequireApiKey, api_error, lenient_json};
use crate::core::prompt;
use crate::core::sessions::Role;
use crate::core::traits::{Completer, SessionStore};
use axum::body::Bytes;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use di_axum::Inject;
use log::info;

/// Session used when the caller does not name one.
pub const DEFAULT_SESSION: &str = "default";

pub fn router() -> Router {
    Router::new()
        .route("/chat", post(remote_chat))
        .route("/sessions", get(list_sessions))
        .route("/session/reset", post(reset_session))
}

async fn remote_chat(
    _: RequireApiKey,
    Inject(sessions): Inject<dyn SessionStore>,
    Inject(completer): Inject<dyn Completer>,
    body: Bytes,
) -> Result<Json<schemas::RemoteChatResponse>, ApiError> {
    let request: schemas::RemoteChatRequest = lenient_json(&body);
    let message = request.message.as_deref().unwrap_or_default().trim();
    if message.is_empty() {
        return Err(api_error(StatusCode::BAD_REQUEST, "Empty message"));
    }

    let session_id = request
        .session_id
        .filter(|id| !id.is_empty())
        .unwrap_or_else(|| DEFAULT_SESSION.to_owned());

    let context = sessions.build_context(&session_id);
    let response = completer
        .complete_text(&prompt::remote_prompt(&context, message))
        .await;

    // not atomic as a pair: a concurrent request on the same session may land in between
    sessions.append_turn(&session_id, Role::User, message);
    sessions.append_turn(&session_id, Role::Assistant, &response);

    Ok(Json(schemas::RemoteChatResponse {
        response,
        session_id,
    }))
}

async fn list_sessions(Inject(sessions): Inject<dyn SessionStore>) -> Json<schemas::SessionList> {
    Json(schemas::SessionList {
        sessions: sessions
            .list_sessions()
            .into_iter()
            .map(|(id, turns)| schemas::SessionSummary { id, turns })
            .collect(),
    })
}

async fn reset_session(
    _: RequireApiKey,
    Inject(sessions): Inject<dyn SessionStore>,
    body: Bytes,
) -> Result<Json<schemas::SessionReset>, ApiError> {
    let request: schemas::ResetRequest = lenient_json(&body);
    let Some(session_id) = request.session_id.filter(|id| !id.is_empty()) else {
        return Err(api_error(StatusCode::BAD_REQUEST, "session_id required"));
    };

    sessions.reset(&session_id);
    info!("cleared remote session {session_id}");

    Ok(Json(schemas::SessionReset {
        status: "cleared",
        session_id,
    }))
}

pub mod schemas {
    use serde::{Deserialize, Serialize};

    #[derive(Deserialize, Debug, Default)]
    pub struct RemoteChatRequest {
        #[serde(default, deserialize_with = "crate::api::lenient_string")]
        pub message: Option<String>,
        #[serde(default, deserialize_with = "crate::api::lenient_string")]
        pub session_id: Option<String>,
    }

    #[derive(Serialize, Debug)]
    pub struct RemoteChatResponse {
        pub response: String,
        pub session_id: String,
    }

    #[derive(Serialize, Debug)]
    pub struct SessionSummary {
        pub id: String,
        pub turns: usize,
    }

    #[derive(Serialize, Debug)]
    pub struct SessionList {
        pub sessions: Vec<SessionSummary>,
    }

    #[derive(Deserialize, Debug, Default)]
    pub struct ResetRequest {
        #[serde(default, deserialize_with = "crate::api::lenient_string")]
        pub session_id: Option<String>,
    }

    #[derive(Serialize, Debug)]
    pub struct SessionReset {
        pub status: &'static str,
        pub session_id: String,
    }
}
