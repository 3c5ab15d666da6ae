//! Authors and courses REST API.
//!
//! Resource modules live under [`modules`]; [`build_registry`] wires them to a
//! shared [`LibraryStore`] and [`run`] drives the module lifecycle around the
//! HTTP server.

use anyhow::Context;
use axum::Router;
use courselib_kernel::{settings::Settings, InitCtx, ModuleRegistry};
use courselib_store::LibraryStore;

pub mod modules;
pub mod utils;

/// Registry holding every resource module, all backed by `store`.
pub fn build_registry(store: &LibraryStore) -> ModuleRegistry {
    let mut registry = ModuleRegistry::new();
    modules::register_all(&mut registry, store);
    registry
}

/// Initialize the modules and return the complete application router.
pub async fn build_app(store: &LibraryStore, settings: &Settings) -> anyhow::Result<Router> {
    let registry = build_registry(store);
    registry.init_all(&InitCtx { settings }).await?;
    Ok(courselib_http::build_router(&registry, settings))
}

/// Serve until shutdown: init and start every module, run the server, then
/// stop the modules in reverse order.
pub async fn run(settings: Settings) -> anyhow::Result<()> {
    let store = LibraryStore::new();
    let registry = build_registry(&store);
    let ctx = InitCtx {
        settings: &settings,
    };

    registry.init_all(&ctx).await?;
    registry.start_all(&ctx).await?;

    let served = courselib_http::start_server(&registry, &settings)
        .await
        .context("server terminated with an error");

    registry.stop_all().await?;
    served
}
