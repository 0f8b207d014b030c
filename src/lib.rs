//! Kouri gateway: HTTP front-end for a local Ollama model - library exports for testing
//!
//! (c) Kouri gateway authors 2025

pub mod api;
pub mod core;
pub mod infrastructure;

use crate::core::router::PassthroughRouter;
use crate::core::sessions::InMemorySessionStore;
use crate::infrastructure::config::GatewayConfig;
use crate::infrastructure::ollama_api::ApiCompleter;
use crate::infrastructure::ollama_cli::CliCompleter;
use axum::Router;
use axum::http::Method;
use di::{
    Injectable, Ref, ServiceCollection, ServiceDescriptor, ServiceProvider, singleton_factory,
};
use di_axum::RouterServiceProviderExtensions;
use std::path::Path;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;

/// Registers the gateway services with the completer selected by `config.use_cli`.
pub fn services(config: GatewayConfig) -> ServiceCollection {
    let completer = if config.use_cli {
        CliCompleter::singleton()
    } else {
        ApiCompleter::singleton()
    };

    services_with(config, completer)
}

/// Registers the gateway services around an explicitly chosen completer.
pub fn services_with(
    config: GatewayConfig,
    completer: impl Into<ServiceDescriptor>,
) -> ServiceCollection {
    let config = Ref::new(config);

    let mut services = ServiceCollection::new();
    services
        .add(singleton_factory(move |_| config.clone()))
        .add(completer)
        .add(PassthroughRouter::singleton())
        .add(InMemorySessionStore::singleton());
    services
}

/// The complete HTTP application: API routes, static assets and CORS.
pub fn app(provider: ServiceProvider, static_dir: &Path) -> Router {
    api::router()
        .nest_service(
            "/static",
            ServiceBuilder::new().service(ServeDir::new(static_dir)),
        )
        .layer(
            CorsLayer::new()
                .allow_headers(Any)
                .allow_methods([Method::GET, Method::POST])
                .allow_origin(Any),
        )
        .with_provider(provider)
}
