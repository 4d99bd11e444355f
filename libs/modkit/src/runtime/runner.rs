//! ModKit runtime runner.
//!
//! We build **one stable ModuleCtx** and reuse it across all phases
//! (init → db → rest → serve → wait). Shutdown can be driven by OS signals,
//! an external `CancellationToken`, or an arbitrary future.

use std::{future::Future, net::SocketAddr, pin::Pin, sync::Arc};

use axum::{routing::get, Router};
use sea_orm::DatabaseConnection;
use tokio_util::sync::CancellationToken;

use crate::client_hub::ClientHub;
use crate::context::{ConfigProvider, ModuleCtx, ModuleCtxBuilder};
use crate::http::ingress::{apply_ingress_layers, ApiIngressConfig};
use crate::registry::ModuleRegistry;
use crate::runtime::shutdown;
use crate::web;

/// How the runtime should decide when to stop.
pub enum ShutdownOptions {
    /// Listen for OS signals (Ctrl+C / SIGTERM).
    Signals,
    /// An external `CancellationToken` controls the lifecycle.
    Token(CancellationToken),
    /// An arbitrary future; when it completes, we initiate shutdown.
    Future(Pin<Box<dyn Future<Output = ()> + Send>>),
}

/// Options for running the ModKit runner.
pub struct RunOptions {
    /// Provider of module config sections (raw JSON by module name).
    pub modules_cfg: Arc<dyn ConfigProvider>,
    pub registry: ModuleRegistry,
    /// `None` skips the migration phase and leaves `ModuleCtx::db()` empty.
    pub db: Option<DatabaseConnection>,
    /// Routes owned by the application itself.
    pub base_router: Router,
    pub ingress: ApiIngressConfig,
    pub bind_addr: SocketAddr,
    pub shutdown: ShutdownOptions,
}

/// Run init → db → rest against `ctx` and wrap the result with the ingress stack.
///
/// Adds `/health` and the problem-JSON 404 fallback.
pub async fn assemble_router(
    registry: &ModuleRegistry,
    ctx: &ModuleCtx,
    base_router: Router,
    ingress: &ApiIngressConfig,
) -> anyhow::Result<Router> {
    tracing::info!("Phase: init");
    registry.run_init_phase(ctx).await?;

    match ctx.db() {
        Some(db) => {
            tracing::info!("Phase: db");
            registry.run_db_phase(&db).await?;
        }
        None => tracing::warn!("Phase: db skipped, no database configured"),
    }

    tracing::info!("Phase: rest (sync)");
    let router = registry
        .run_rest_phase(ctx, base_router)?
        .route("/health", get(web::health_check))
        .fallback(web::route_not_found);

    apply_ingress_layers(router, ingress)
}

fn spawn_shutdown_waiter(shutdown: ShutdownOptions, cancel: &CancellationToken) {
    match shutdown {
        ShutdownOptions::Signals => {
            let c = cancel.clone();
            tokio::spawn(async move {
                if let Err(e) = shutdown::wait_for_shutdown().await {
                    tracing::warn!(
                        error = %e,
                        "shutdown: primary waiter failed; falling back to ctrl_c()"
                    );
                    let _ = tokio::signal::ctrl_c().await;
                }
                c.cancel();
            });
        }
        ShutdownOptions::Future(waiter) => {
            let c = cancel.clone();
            tokio::spawn(async move {
                waiter.await;
                tracing::info!("shutdown: external future completed");
                c.cancel();
            });
        }
        ShutdownOptions::Token(_) => {
            tracing::info!("shutdown: external token will control lifecycle");
        }
    }
}

/// Full cycle: init → db → rest → serve until shutdown.
pub async fn run(opts: RunOptions) -> anyhow::Result<()> {
    let cancel = match &opts.shutdown {
        ShutdownOptions::Token(t) => t.clone(),
        _ => CancellationToken::new(),
    };
    spawn_shutdown_waiter(opts.shutdown, &cancel);

    let mut ctx_builder = ModuleCtxBuilder::new()
        .with_client_hub(Arc::new(ClientHub::default()))
        .with_config_provider(opts.modules_cfg.clone());
    if let Some(db) = opts.db {
        ctx_builder = ctx_builder.with_db(db);
    }
    let base_ctx = ctx_builder.build();

    let app = assemble_router(&opts.registry, &base_ctx, opts.base_router, &opts.ingress).await?;

    let listener = tokio::net::TcpListener::bind(opts.bind_addr).await?;
    tracing::info!("HTTP server listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(cancel.cancelled_owned())
        .await?;

    tracing::info!("HTTP server stopped");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::RegistryBuilder;
    use std::time::Duration;

    struct Noop;

    #[async_trait::async_trait]
    impl crate::contracts::Module for Noop {
        async fn init(&self, _ctx: &ModuleCtx) -> anyhow::Result<()> {
            Ok(())
        }
    }

    struct EmptyConfig;

    impl ConfigProvider for EmptyConfig {
        fn get_module_config(&self, _module_name: &str) -> Option<&serde_json::Value> {
            None
        }
    }

    #[tokio::test]
    async fn run_stops_when_token_is_cancelled() {
        let registry = RegistryBuilder::new()
            .register("noop", &[], Arc::new(Noop), None, None)
            .build()
            .unwrap();
        let token = CancellationToken::new();

        let handle = tokio::spawn(run(RunOptions {
            modules_cfg: Arc::new(EmptyConfig),
            registry,
            db: None,
            base_router: Router::new(),
            ingress: ApiIngressConfig::default(),
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 0)),
            shutdown: ShutdownOptions::Token(token.clone()),
        }));

        tokio::time::sleep(Duration::from_millis(50)).await;
        token.cancel();

        let result = tokio::time::timeout(Duration::from_secs(5), handle)
            .await
            .expect("runner should stop after cancel")
            .expect("runner task panicked");
        assert!(result.is_ok());
    }
}
