use std::sync::Arc;

use async_trait::async_trait;
use modkit::{DbModule, Module, ModuleCtx, RestfulModule};
use parking_lot::RwLock;
use sea_orm::DatabaseConnection;
use sea_orm_migration::MigratorTrait;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::api::rest::{cookies::SessionCookies, routes};
use crate::auth::SessionGuard;
use crate::config::AccountsConfig;
use crate::contract::client::AccountsApi;
use crate::domain::ports::SystemClock;
use crate::domain::service::{Service, ServiceConfig, ServiceDeps};
use crate::domain::streak::{DayPolicy, StreakEvaluator};
use crate::gateways::local::AccountsLocalClient;
use crate::infra::crypto::Argon2Hasher;
use crate::infra::session::JwtSessions;
use crate::infra::storage::sea_orm_repo::SeaOrmUsersRepository;

/// Accounts module: users, sessions, profile and streaks.
///
/// Publishes `dyn AccountsApi` and a [`SessionGuard`] to the `ClientHub`.
#[derive(Default)]
pub struct Accounts {
    state: RwLock<Option<Wired>>,
}

#[derive(Clone)]
struct Wired {
    service: Arc<Service>,
    cookies: SessionCookies,
    guard: SessionGuard,
}

impl Accounts {
    pub const NAME: &'static str = "accounts";
}

#[async_trait]
impl Module for Accounts {
    async fn init(&self, ctx: &ModuleCtx) -> anyhow::Result<()> {
        info!("Initializing accounts module");

        let cfg: AccountsConfig = ctx.module_config()?;
        debug!(
            "Loaded accounts config: min_password_length={}, max_name_length={}, day_offset_minutes={}",
            cfg.min_password_length, cfg.max_name_length, cfg.day_offset_minutes
        );

        let db = ctx.db().ok_or_else(|| anyhow::anyhow!("DB required"))?;

        let policy = DayPolicy::with_offset_minutes(cfg.day_offset_minutes).ok_or_else(|| {
            anyhow::anyhow!(
                "accounts.day_offset_minutes out of range: {}",
                cfg.day_offset_minutes
            )
        })?;

        let secret = if cfg.session.secret.is_empty() {
            warn!("accounts.session.secret is empty; using a random per-process secret, sessions will not survive a restart");
            random_secret()
        } else {
            cfg.session.secret.as_bytes().to_vec()
        };
        if cfg.session.same_site_cross_origin && !cfg.session.secure {
            warn!("SameSite=None without Secure: browsers will drop the session cookie");
        }

        let hashing = &cfg.password_hashing;
        let hasher =
            Argon2Hasher::with_params(hashing.memory_kib, hashing.iterations, hashing.parallelism)?;
        let sessions = JwtSessions::new(&secret, cfg.session.max_age_seconds);

        let service = Arc::new(Service::new(
            ServiceDeps {
                repo: Arc::new(SeaOrmUsersRepository::new(db)),
                hasher: Arc::new(hasher),
                sessions: Arc::new(sessions),
                clock: Arc::new(SystemClock),
            },
            StreakEvaluator::new(policy),
            ServiceConfig {
                min_password_length: cfg.min_password_length,
                max_name_length: cfg.max_name_length,
            },
        ));

        // Local in-process client implementation published to ClientHub
        let api: Arc<dyn AccountsApi> = Arc::new(AccountsLocalClient::new(service.clone()));
        let guard = SessionGuard::new(api.clone(), cfg.session.cookie_name.clone());

        let hub = ctx.client_hub();
        hub.register::<dyn AccountsApi>(api);
        hub.register::<SessionGuard>(Arc::new(guard.clone()));
        info!("Accounts API and session guard exposed to ClientHub");

        *self.state.write() = Some(Wired {
            service,
            cookies: SessionCookies::from_config(&cfg.session),
            guard,
        });
        Ok(())
    }
}

#[async_trait]
impl DbModule for Accounts {
    async fn migrate(&self, db: &DatabaseConnection) -> anyhow::Result<()> {
        info!("Running accounts database migrations");
        crate::infra::storage::migrations::Migrator::up(db, None).await?;
        info!("Accounts database migrations completed successfully");
        Ok(())
    }
}

impl RestfulModule for Accounts {
    fn register_rest(
        &self,
        _ctx: &ModuleCtx,
        router: axum::Router,
    ) -> anyhow::Result<axum::Router> {
        info!("Registering accounts REST routes");

        let wired = self
            .state
            .read()
            .clone()
            .ok_or_else(|| anyhow::anyhow!("Service not initialized"))?;

        let router = routes::register_routes(router, wired.service, wired.cookies, wired.guard)?;
        info!("Accounts REST routes registered successfully");
        Ok(router)
    }
}

fn random_secret() -> Vec<u8> {
    let mut secret = Vec::with_capacity(32);
    secret.extend_from_slice(Uuid::new_v4().as_bytes());
    secret.extend_from_slice(Uuid::new_v4().as_bytes());
    secret
}
