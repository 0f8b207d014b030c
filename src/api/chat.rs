//! Primary chat endpoint

use crate::api::{RequireApiKey, lenient_json};
use crate::core::traits::TaskRouter;
use async_trait::async_trait;
use axum::body::Bytes;
use axum::extract::FromRequestParts;
use axum::http::StatusCode;
use axum::http::request::Parts;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use di_axum::Inject;
use log::info;

pub fn router() -> Router {
    Router::new().route("/chat", post(chat))
}

/// [`RequireApiKey`] for the chat UI, which reads rejections from the `response` field.
pub struct ChatApiKey;

#[async_trait]
impl<S> FromRequestParts<S> for ChatApiKey
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Response> {
        match RequireApiKey::from_request_parts(parts, state).await {
            Ok(RequireApiKey) => Ok(ChatApiKey),
            Err((status, _)) if status == StatusCode::UNAUTHORIZED => Err((
                StatusCode::UNAUTHORIZED,
                Json(schemas::ChatResponse {
                    response: "Unauthorized".to_owned(),
                }),
            )
                .into_response()),
            Err(rejection) => Err(rejection.into_response()),
        }
    }
}

async fn chat(
    _: ChatApiKey,
    Inject(task_router): Inject<dyn TaskRouter>,
    body: Bytes,
) -> (StatusCode, Json<schemas::ChatResponse>) {
    let request: schemas::ChatRequest = lenient_json(&body);
    let message = request.message.as_deref().unwrap_or_default().trim();

    if message.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(schemas::ChatResponse {
                response: "Please provide a message.".to_owned(),
            }),
        );
    }

    info!("chat request ({} chars)", message.len());
    let response = task_router.route_task(message).await;

    (StatusCode::OK, Json(schemas::ChatResponse { response }))
}

pub mod schemas {
    use serde::{Deserialize, Serialize};

    #[derive(Deserialize, Debug, Default)]
    pub struct ChatRequest {
        #[serde(default, deserialize_with = "crate::api::lenient_string")]
        pub message: Option<String>,
    }

    #[derive(Serialize, Debug)]
    pub struct ChatResponse {
        pub response: String,
    }
}
