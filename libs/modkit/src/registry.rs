use axum::Router;
use sea_orm::DatabaseConnection;
use std::collections::HashSet;
use std::sync::Arc;

use thiserror::Error;

use crate::context;
use crate::contracts;

pub struct ModuleEntry {
    pub name: &'static str,
    pub deps: &'static [&'static str],
    pub core: Arc<dyn contracts::Module>,
    pub rest: Option<Arc<dyn contracts::RestfulModule>>,
    pub db: Option<Arc<dyn contracts::DbModule>>,
}

impl std::fmt::Debug for ModuleEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModuleEntry")
            .field("name", &self.name)
            .field("deps", &self.deps)
            .field("has_rest", &self.rest.is_some())
            .field("has_db", &self.db.is_some())
            .finish()
    }
}

/// Ordered runtime registry. Every module comes after its dependencies.
pub struct ModuleRegistry {
    modules: Vec<ModuleEntry>,
}

impl std::fmt::Debug for ModuleRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<&'static str> = self.modules.iter().map(|m| m.name).collect();
        f.debug_struct("ModuleRegistry")
            .field("modules", &names)
            .finish()
    }
}

impl ModuleRegistry {
    pub fn modules(&self) -> &[ModuleEntry] {
        &self.modules
    }

    // ---- Ordered phases: init → DB → REST ----

    pub async fn run_init_phase(&self, base_ctx: &context::ModuleCtx) -> Result<(), RegistryError> {
        for e in &self.modules {
            let ctx = base_ctx.clone().for_module(e.name);
            e.core
                .init(&ctx)
                .await
                .map_err(|source| RegistryError::Init {
                    module: e.name,
                    source,
                })?;
        }
        Ok(())
    }

    pub async fn run_db_phase(&self, db: &DatabaseConnection) -> Result<(), RegistryError> {
        for e in &self.modules {
            if let Some(dbm) = &e.db {
                dbm.migrate(db)
                    .await
                    .map_err(|source| RegistryError::DbMigrate {
                        module: e.name,
                        source,
                    })?;
            }
        }
        Ok(())
    }

    pub fn run_rest_phase(
        &self,
        base_ctx: &context::ModuleCtx,
        mut router: Router,
    ) -> Result<Router, RegistryError> {
        for e in &self.modules {
            if let Some(rest) = &e.rest {
                let ctx = base_ctx.clone().for_module(e.name);
                router = rest
                    .register_rest(&ctx, router)
                    .map_err(|source| RegistryError::RestRegister {
                        module: e.name,
                        source,
                    })?;
            }
        }
        Ok(router)
    }
}

/// Collects module registrations in declaration order.
#[derive(Default)]
pub struct RegistryBuilder {
    modules: Vec<ModuleEntry>,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a module; `deps` must name modules registered before it.
    pub fn register(
        mut self,
        name: &'static str,
        deps: &'static [&'static str],
        core: Arc<dyn contracts::Module>,
        db: Option<Arc<dyn contracts::DbModule>>,
        rest: Option<Arc<dyn contracts::RestfulModule>>,
    ) -> Self {
        self.modules.push(ModuleEntry {
            name,
            deps,
            core,
            rest,
            db,
        });
        self
    }

    /// Validate names and dependency order.
    pub fn build(self) -> Result<ModuleRegistry, RegistryError> {
        let mut seen: HashSet<&'static str> = HashSet::new();
        for e in &self.modules {
            for &d in e.deps {
                if d == e.name {
                    return Err(RegistryError::CycleDetected { path: vec![d, d] });
                }
                if !seen.contains(d) {
                    let declared_later = self.modules.iter().any(|m| m.name == d);
                    return Err(if declared_later {
                        RegistryError::DependencyOrder {
                            module: e.name.to_string(),
                            depends_on: d.to_string(),
                        }
                    } else {
                        RegistryError::UnknownDependency {
                            module: e.name.to_string(),
                            depends_on: d.to_string(),
                        }
                    });
                }
            }
            if !seen.insert(e.name) {
                return Err(RegistryError::DuplicateModule(e.name.to_string()));
            }
        }
        Ok(ModuleRegistry {
            modules: self.modules,
        })
    }
}

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("module '{0}' is already registered")]
    DuplicateModule(String),
    #[error("module '{module}' depends on unknown '{depends_on}'")]
    UnknownDependency { module: String, depends_on: String },
    #[error("module '{module}' must be registered after its dependency '{depends_on}'")]
    DependencyOrder { module: String, depends_on: String },
    #[error("cyclic dependency detected: {}", path.join(" -> "))]
    CycleDetected { path: Vec<&'static str> },

    #[error("initialization failed for module '{module}'")]
    Init {
        module: &'static str,
        #[source]
        source: anyhow::Error,
    },
    #[error("DB migration failed for module '{module}'")]
    DbMigrate {
        module: &'static str,
        #[source]
        source: anyhow::Error,
    },
    #[error("REST registration failed for module '{module}'")]
    RestRegister {
        module: &'static str,
        #[source]
        source: anyhow::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::ModuleCtxBuilder;
    use parking_lot::Mutex;

    struct Recorder {
        name: &'static str,
        log: Arc<Mutex<Vec<String>>>,
        fail_init: bool,
    }

    #[async_trait::async_trait]
    impl contracts::Module for Recorder {
        async fn init(&self, ctx: &context::ModuleCtx) -> anyhow::Result<()> {
            if self.fail_init {
                anyhow::bail!("boom");
            }
            self.log.lock().push(format!(
                "init:{}:{}",
                self.name,
                ctx.current_module().unwrap_or("?")
            ));
            Ok(())
        }
    }

    impl contracts::RestfulModule for Recorder {
        fn register_rest(
            &self,
            _ctx: &context::ModuleCtx,
            router: Router,
        ) -> anyhow::Result<Router> {
            self.log.lock().push(format!("rest:{}", self.name));
            Ok(router)
        }
    }

    fn recorder(name: &'static str, log: &Arc<Mutex<Vec<String>>>) -> Arc<Recorder> {
        Arc::new(Recorder {
            name,
            log: log.clone(),
            fail_init: false,
        })
    }

    #[tokio::test]
    async fn phases_run_in_registration_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let a = recorder("accounts", &log);
        let b = recorder("skills", &log);

        let registry = RegistryBuilder::new()
            .register("accounts", &[], a.clone(), None, Some(a))
            .register("skills", &["accounts"], b.clone(), None, Some(b))
            .build()
            .unwrap();

        let ctx = ModuleCtxBuilder::new().build();
        registry.run_init_phase(&ctx).await.unwrap();
        registry.run_rest_phase(&ctx, Router::new()).unwrap();

        assert_eq!(
            *log.lock(),
            vec![
                "init:accounts:accounts",
                "init:skills:skills",
                "rest:accounts",
                "rest:skills"
            ]
        );
    }

    #[test]
    fn dependency_must_precede_dependent() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let err = RegistryBuilder::new()
            .register("skills", &["accounts"], recorder("skills", &log), None, None)
            .register("accounts", &[], recorder("accounts", &log), None, None)
            .build()
            .unwrap_err();
        assert!(matches!(err, RegistryError::DependencyOrder { .. }));
    }

    #[test]
    fn unknown_dependency_and_duplicates_are_rejected() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let err = RegistryBuilder::new()
            .register("skills", &["missing"], recorder("skills", &log), None, None)
            .build()
            .unwrap_err();
        assert!(matches!(err, RegistryError::UnknownDependency { .. }));

        let err = RegistryBuilder::new()
            .register("accounts", &[], recorder("accounts", &log), None, None)
            .register("accounts", &[], recorder("accounts", &log), None, None)
            .build()
            .unwrap_err();
        assert!(matches!(err, RegistryError::DuplicateModule(_)));
    }

    #[tokio::test]
    async fn init_failure_names_the_module() {
        let failing = Arc::new(Recorder {
            name: "accounts",
            log: Arc::new(Mutex::new(Vec::new())),
            fail_init: true,
        });
        let registry = RegistryBuilder::new()
            .register("accounts", &[], failing, None, None)
            .build()
            .unwrap();

        let err = registry
            .run_init_phase(&ModuleCtxBuilder::new().build())
            .await
            .unwrap_err();
        assert!(matches!(err, RegistryError::Init { module: "accounts", .. }));
    }
}
