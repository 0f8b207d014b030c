//! Root document and health check

use crate::infrastructure::config::GatewayConfig;
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use di_axum::Inject;
use log::debug;

pub fn router() -> Router {
    Router::new()
        .route("/", get(index))
        .route("/health", get(health))
}

async fn index(Inject(config): Inject<GatewayConfig>) -> Response {
    match tokio::fs::read_to_string(&config.index_html).await {
        Ok(page) => Html(page).into_response(),
        Err(e) => {
            debug!("no root document at {}: {e}", config.index_html.display());
            Json(schemas::Running {
                message: "Kouri backend running",
                hint: "index.html not found at root.",
            })
            .into_response()
        }
    }
}

async fn health(Inject(config): Inject<GatewayConfig>) -> Json<schemas::Health> {
    Json(schemas::Health {
        status: "ok",
        model: config.model.clone(),
        mode: config.mode(),
    })
}

pub mod schemas {
    use serde::Serialize;

    #[derive(Serialize, Debug)]
    pub struct Running {
        pub message: &'static str,
        pub hint: &'static str,
    }

    #[derive(Serialize, Debug)]
    pub struct Health {
        pub status: &'static str,
        pub model: String,
        pub mode: &'static str,
    }
}
