//! Debug endpoints backed by the task router

use crate::api::{ApiError, RequireApiKey, api_error};
use crate::core::traits::TaskRouter;
use crate::infrastructure::memory;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use di_axum::Inject;
use log::error;

pub fn router() -> Router {
    Router::new()
        .route("/debug/last_prompt", get(last_prompt))
        .route("/debug/reset_greeting", post(reset_greeting))
}

async fn last_prompt(
    _: RequireApiKey,
    Inject(task_router): Inject<dyn TaskRouter>,
) -> Json<schemas::LastPrompt> {
    Json(schemas::LastPrompt {
        last_prompt: task_router.last_prompt(),
    })
}

async fn reset_greeting(
    _: RequireApiKey,
    Inject(task_router): Inject<dyn TaskRouter>,
) -> Result<Json<schemas::Status>, ApiError> {
    memory::clear_greeting_flags(task_router.memory_file())
        .await
        .map_err(|e| {
            error!("{e}");
            api_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "failed to update memory file",
            )
        })?;

    Ok(Json(schemas::Status {
        status: "ok",
        message: "Greeting flags cleared.",
    }))
}

pub mod schemas {
    use serde::Serialize;

    #[derive(Serialize, Debug)]
    pub struct LastPrompt {
        pub last_prompt: String,
    }

    #[derive(Serialize, Debug)]
    pub struct Status {
        pub status: &'static str,
        pub message: &'static str,
    }
}
