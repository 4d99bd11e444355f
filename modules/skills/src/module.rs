use std::sync::Arc;

use async_trait::async_trait;
use modkit::{DbModule, Module, ModuleCtx, RestfulModule};
use parking_lot::RwLock;
use sea_orm::DatabaseConnection;
use sea_orm_migration::MigratorTrait;
use tracing::{debug, info};

use accounts::auth::SessionGuard;

use crate::api::rest::routes;
use crate::config::SkillsConfig;
use crate::contract::client::SkillsApi;
use crate::domain::service::{Service, ServiceConfig};
use crate::gateways::local::SkillsLocalClient;
use crate::infra::storage::sea_orm_repo::SeaOrmSkillsRepository;

/// Skills module: the shared skill catalogue.
///
/// Depends on `accounts` for the session guard protecting writes.
#[derive(Default)]
pub struct Skills {
    state: RwLock<Option<(Arc<Service>, SessionGuard)>>,
}

impl Skills {
    pub const NAME: &'static str = "skills";
    pub const DEPS: &'static [&'static str] = &["accounts"];
}

#[async_trait]
impl Module for Skills {
    async fn init(&self, ctx: &ModuleCtx) -> anyhow::Result<()> {
        info!("Initializing skills module");

        let cfg: SkillsConfig = ctx.module_config()?;
        debug!("Loaded skills config: max_name_length={}", cfg.max_name_length);

        let db = ctx.db().ok_or_else(|| anyhow::anyhow!("DB required"))?;
        let hub = ctx.client_hub();
        let guard = hub.get::<SessionGuard>()?;

        let repo = SeaOrmSkillsRepository::new(db);
        let service = Arc::new(Service::new(
            Arc::new(repo),
            ServiceConfig {
                max_name_length: cfg.max_name_length,
            },
        ));

        let api: Arc<dyn SkillsApi> = Arc::new(SkillsLocalClient::new(service.clone()));
        hub.register::<dyn SkillsApi>(api);
        info!("Skills API exposed to ClientHub");

        *self.state.write() = Some((service, guard.as_ref().clone()));
        Ok(())
    }
}

#[async_trait]
impl DbModule for Skills {
    async fn migrate(&self, db: &DatabaseConnection) -> anyhow::Result<()> {
        info!("Running skills database migrations");
        crate::infra::storage::migrations::Migrator::up(db, None).await?;
        info!("Skills database migrations completed successfully");
        Ok(())
    }
}

impl RestfulModule for Skills {
    fn register_rest(
        &self,
        _ctx: &ModuleCtx,
        router: axum::Router,
    ) -> anyhow::Result<axum::Router> {
        info!("Registering skills REST routes");

        let (service, guard) = self
            .state
            .read()
            .clone()
            .ok_or_else(|| anyhow::anyhow!("Service not initialized"))?;

        let router = routes::register_routes(router, service, guard)?;
        info!("Skills REST routes registered successfully");
        Ok(router)
    }
}
