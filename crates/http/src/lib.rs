//! HTTP server facade with Axum, error handling, extractors and OpenAPI support.

use anyhow::Context;
use axum::{routing::get, Router};

use courselib_kernel::{
    settings::{Environment, Settings},
    ModuleRegistry,
};

pub mod binding;
pub mod error;
pub mod extract;
pub mod router;
pub mod validation;

pub use error::{AppError, FieldErrors};
pub use router::RouterBuilder;

/// Start the HTTP server with the given module registry.
/// Returns once Ctrl-C is received and in-flight requests have drained.
pub async fn start_server(registry: &ModuleRegistry, settings: &Settings) -> anyhow::Result<()> {
    let address = settings.server.bind_address();
    tracing::info!("starting HTTP server on {}", address);

    let app = build_router(registry, settings);

    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("failed to bind to address {address}"))?;

    tracing::info!("HTTP server listening on http://{}", address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server failed")?;

    tracing::info!("HTTP server stopped");
    Ok(())
}

/// Build the main HTTP router with all module routes mounted
pub fn build_router(registry: &ModuleRegistry, settings: &Settings) -> Router {
    let mut router_builder = RouterBuilder::new();

    for module in registry.modules() {
        let base_path = module.base_path();
        tracing::info!(module = module.name(), "mounting module routes under {}", base_path);
        router_builder = router_builder.mount_module(&base_path, module.routes());
    }

    // Layers wrap only the routes registered above them.
    router_builder
        .with_content_negotiation()
        .with_error_redaction(settings.environment == Environment::Production)
        .route("/healthz", get(health_check))
        .with_openapi(registry)
        .with_timeout(settings.server.request_timeout_ms)
        .with_cors(&settings.server.cors_allowed_origins)
        .with_tracing()
        .with_request_id()
        .build()
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "ok"
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}
