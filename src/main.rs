//! Kouri gateway: HTTP front-end for a local Ollama model
//!
//! (c) Kouri gateway authors 2025

use kouri_gateway::infrastructure::config::GatewayConfig;

use anyhow::anyhow;
use log::info;
use tokio::runtime::{Builder, Runtime};

fn main() -> anyhow::Result<()> {
    // initialize tracing
    tracing_subscriber::fmt::init();

    let config = GatewayConfig::from_env();
    let runtime: Runtime = Builder::new_multi_thread().enable_all().build()?;

    runtime.block_on(web_server_task(config))
}

async fn web_server_task(config: GatewayConfig) -> anyhow::Result<()> {
    info!(
        "serving model {} via the ollama {} ({})",
        config.model,
        config.mode(),
        if config.use_cli {
            &config.ollama_bin
        } else {
            &config.ollama_host
        }
    );
    if config.api_token.is_none() {
        info!("KOURI_API_TOKEN not set, guarded routes are open");
    }

    let port = config.port;
    let static_dir = config.static_dir.clone();
    let provider = kouri_gateway::services(config)
        .build_provider()
        .map_err(|e| anyhow!("invalid service registrations: {e:?}"))?;

    let app = kouri_gateway::app(provider, &static_dir);

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port)).await?;
    info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await?;
    info!("Shutting down...");

    Ok(())
}
