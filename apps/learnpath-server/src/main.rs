use anyhow::{anyhow, Context, Result};
use axum::{response::Json, routing::get, Router};
use clap::{Parser, Subcommand};
use mimalloc::MiMalloc;
use modkit::http::ingress::ApiIngressConfig;
use modkit::runtime::{run, RunOptions, ShutdownOptions};
use modkit::{ModuleRegistry, RegistryBuilder};
use runtime::{AppConfig, AppConfigProvider, CliArgs, DatabaseConfig};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use url::Url;

use accounts::Accounts;
use skills::Skills;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

const INGRESS_SECTION: &str = "api_ingress";
const MEMORY_DSN: &str = "sqlite::memory:";

/// Expand a sqlite DSN into an absolute-path DSN using a base directory.
/// - Keeps "sqlite::memory:" as-is.
/// - Normalizes backslashes into forward slashes (important on Windows).
fn absolutize_sqlite_dsn(dsn: &str, base_dir: &Path, create_dirs: bool) -> Result<String> {
    if dsn.eq_ignore_ascii_case(MEMORY_DSN) || dsn.eq_ignore_ascii_case("sqlite://:memory:") {
        return Ok(MEMORY_DSN.to_string());
    }
    let db_path = dsn
        .strip_prefix("sqlite://")
        .ok_or_else(|| anyhow!("DSN must start with sqlite:// (got: {})", dsn))?;

    let (path_str, query) = match db_path.split_once('?') {
        Some((p, q)) => (p, Some(q)),
        None => (db_path, None),
    };

    let mut p = PathBuf::from(path_str);
    if p.as_os_str().is_empty() {
        return Err(anyhow!("Empty SQLite path in DSN"));
    }
    if p.is_relative() {
        p = base_dir.join(p);
    }

    if let Some(dir) = p.parent() {
        if create_dirs {
            std::fs::create_dir_all(dir)?;
        }
    }

    // Rebuild DSN with absolute path and normalized slashes
    let mut out = String::from("sqlite://");
    out.push_str(&p.to_string_lossy().replace('\\', "/"));
    if let Some(q) = query {
        out.push('?');
        out.push_str(q);
    }
    Ok(out)
}

/// LearnPath Server - skill tracking REST API
#[derive(Parser)]
#[command(name = "learnpath-server")]
#[command(about = "LearnPath Server - skill tracking REST API with daily streaks")]
#[command(version = "0.1.0")]
struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Port for HTTP server (overrides config)
    #[arg(short, long)]
    port: Option<u16>,

    /// Print current configuration and exit
    #[arg(long)]
    print_config: bool,

    /// Log verbosity level (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Use an in-memory SQLite database
    #[arg(long)]
    mock: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the server
    Run,
    /// Check configuration
    Check,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // CLI args passed down to config/app
    let args = CliArgs {
        config: cli.config.as_ref().map(|p| p.to_string_lossy().to_string()),
        port: cli.port,
        print_config: cli.print_config,
        verbose: cli.verbose,
        mock: cli.mock,
    };

    // Load configuration (normalized home_dir is applied inside)
    let mut config = AppConfig::load_or_default(cli.config.as_deref())?;

    // Apply CLI overrides (port / verbosity)
    config.apply_cli_overrides(&args);

    // Initialize logging
    let logging_config = config.logging.as_ref().cloned().unwrap_or_default();
    runtime::logging::init_logging_from_config(&logging_config, Path::new(&config.server.home_dir));
    tracing::info!("LearnPath Server starting");

    // Print config and exit if requested
    if cli.print_config {
        println!("{}", config.to_yaml()?);
        return Ok(());
    }

    // Execute command
    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => run_server(config, args).await,
        Commands::Check => check_config(config),
    }
}

/// Detect DB backend from URL scheme.
fn detect_from_dsn(dsn: &str) -> Result<&'static str> {
    let raw = dsn.trim();
    if raw.is_empty() {
        return Err(anyhow!("Database URL not configured"));
    }

    let url = Url::parse(raw).map_err(|e| anyhow!("Invalid database DSN '{}': {}", raw, e))?;

    match url.scheme() {
        "sqlite" | "sqlite3" => Ok("sqlite"),
        "postgres" | "postgresql" => Ok("postgres"),
        other => Err(anyhow!("Unsupported database type: {}", other)),
    }
}

async fn connect_db(
    db_config: &DatabaseConfig,
    base_dir: &Path,
    mock: bool,
) -> Result<DatabaseConnection> {
    // Use URL from config; override with in-memory SQLite when --mock is set
    let dsn = if mock {
        MEMORY_DSN.to_string()
    } else {
        db_config.url.trim().to_owned()
    };

    let backend = detect_from_dsn(&dsn)?;
    let dsn = if backend == "sqlite" {
        // Absolutize sqlite DSNs to avoid cwd issues
        absolutize_sqlite_dsn(&dsn, base_dir, true)?
    } else {
        dsn
    };

    let mut opts = ConnectOptions::new(dsn.clone());
    opts.acquire_timeout(Duration::from_secs(5)).sqlx_logging(false);
    if dsn == MEMORY_DSN {
        // every pooled connection would otherwise get its own empty database
        opts.max_connections(1);
    } else {
        opts.max_connections(db_config.max_conns.unwrap_or(10));
    }
    if backend == "sqlite" {
        let busy = Duration::from_millis(u64::from(db_config.busy_timeout_ms.unwrap_or(5000)));
        opts.map_sqlx_sqlite_opts(move |o| o.busy_timeout(busy));
    }

    tracing::info!("Connecting to database: {}", redact_dsn(&dsn));
    let db = Database::connect(opts)
        .await
        .with_context(|| format!("failed to connect to {backend} database"))?;
    tracing::info!("Connected DB backend: {}", backend);
    Ok(db)
}

/// DSN with the password (if any) masked, for logs.
fn redact_dsn(dsn: &str) -> String {
    match Url::parse(dsn) {
        Ok(mut url) if url.password().is_some() => {
            let _ = url.set_password(Some("***"));
            url.to_string()
        }
        _ => dsn.to_string(),
    }
}

fn ingress_config(config: &AppConfig) -> Result<ApiIngressConfig> {
    let mut ingress: ApiIngressConfig = match config.module_section(INGRESS_SECTION) {
        Some(raw) => serde_json::from_value(raw.clone())
            .with_context(|| format!("invalid modules.{INGRESS_SECTION} config"))?,
        None => ApiIngressConfig::default(),
    };
    if config.server.timeout_sec > 0 {
        ingress.request_timeout_secs = config.server.timeout_sec;
    }
    Ok(ingress)
}

async fn bind_addr(config: &AppConfig) -> Result<SocketAddr> {
    let host = config.server.host.as_str();
    tokio::net::lookup_host((host, config.server.port))
        .await
        .with_context(|| format!("cannot resolve server.host '{host}'"))?
        .next()
        .ok_or_else(|| anyhow!("server.host '{}' resolved to no address", host))
}

async fn root() -> Json<Value> {
    Json(json!({ "message": "LearnPath API running" }))
}

async fn run_server(config: AppConfig, args: CliArgs) -> Result<()> {
    tracing::info!("Initializing modules...");

    // Base dir for resolving relative sqlite paths (already absolute & created)
    let base_dir = PathBuf::from(&config.server.home_dir);

    let db = match (&config.database, args.mock) {
        (Some(db_config), mock) => Some(connect_db(db_config, &base_dir, mock).await?),
        (None, true) => {
            let db_config = DatabaseConfig {
                url: MEMORY_DSN.to_string(),
                max_conns: Some(1),
                busy_timeout_ms: None,
            };
            Some(connect_db(&db_config, &base_dir, true).await?)
        }
        (None, false) => {
            tracing::warn!("No database configuration found, running without database");
            None
        }
    };

    let registry = build_registry()?;

    let ingress = ingress_config(&config)?;
    let bind_addr = bind_addr(&config).await?;

    // Provide module configs to modkit
    let modules_cfg = Arc::new(AppConfigProvider::new(config));

    run(RunOptions {
        modules_cfg,
        registry,
        db,
        base_router: Router::new().route("/", get(root)),
        ingress,
        bind_addr,
        shutdown: ShutdownOptions::Signals,
    })
    .await
}

/// Modules in dependency order.
fn build_registry() -> Result<ModuleRegistry> {
    let accounts = Arc::new(Accounts::default());
    let skills = Arc::new(Skills::default());

    let registry = RegistryBuilder::new()
        .register(
            Accounts::NAME,
            &[],
            accounts.clone(),
            Some(accounts.clone()),
            Some(accounts),
        )
        .register(
            Skills::NAME,
            Skills::DEPS,
            skills.clone(),
            Some(skills.clone()),
            Some(skills),
        )
        .build()?;
    Ok(registry)
}

fn check_config(config: AppConfig) -> Result<()> {
    tracing::info!("Checking configuration...");

    if let Some(db) = &config.database {
        detect_from_dsn(&db.url)?;
    }
    ingress_config(&config)?;
    strict_section::<accounts::config::AccountsConfig>(&config, Accounts::NAME)?;
    strict_section::<skills::config::SkillsConfig>(&config, Skills::NAME)?;

    // AppConfig::load_* already normalized & created home_dir
    tracing::info!("Configuration is valid");
    println!("Configuration check passed");
    println!("Server config:");
    println!("{}", config.to_yaml()?);

    Ok(())
}

/// A present module section must deserialize cleanly; absent means defaults.
fn strict_section<T: serde::de::DeserializeOwned>(config: &AppConfig, module: &str) -> Result<()> {
    if let Some(raw) = config.module_section(module) {
        serde_json::from_value::<T>(raw.clone())
            .with_context(|| format!("invalid modules.{module} config"))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_dsn_is_kept() {
        let base = Path::new("/srv/learnpath");
        assert_eq!(absolutize_sqlite_dsn("sqlite::memory:", base, false).unwrap(), MEMORY_DSN);
        assert_eq!(absolutize_sqlite_dsn("sqlite://:memory:", base, false).unwrap(), MEMORY_DSN);
    }

    #[test]
    fn relative_sqlite_paths_are_anchored_to_home() {
        let tmp = tempfile::tempdir().unwrap();
        let dsn = absolutize_sqlite_dsn("sqlite://database/lp.db?mode=rwc", tmp.path(), true).unwrap();
        let expected = tmp.path().join("database/lp.db");
        assert_eq!(
            dsn,
            format!("sqlite://{}?mode=rwc", expected.to_string_lossy().replace('\\', "/"))
        );
        assert!(tmp.path().join("database").is_dir());
    }

    #[test]
    fn registry_orders_accounts_before_skills() {
        let registry = build_registry().unwrap();
        let names: Vec<&str> = registry.modules().iter().map(|m| m.name).collect();
        assert_eq!(names, ["accounts", "skills"]);
    }

    #[test]
    fn backend_detection() {
        assert_eq!(detect_from_dsn("sqlite://x.db").unwrap(), "sqlite");
        assert_eq!(detect_from_dsn("postgres://u:p@localhost/lp").unwrap(), "postgres");
        assert!(detect_from_dsn("mysql://localhost/lp").is_err());
        assert!(detect_from_dsn("  ").is_err());
    }

    #[test]
    fn passwords_are_not_logged() {
        let shown = redact_dsn("postgres://lp:hunter2@db:5432/lp");
        assert!(!shown.contains("hunter2"));
        assert_eq!(redact_dsn("sqlite://x.db"), "sqlite://x.db");
    }

    #[test]
    fn server_timeout_overrides_ingress_timeout() {
        let mut config = AppConfig::default();
        assert_eq!(ingress_config(&config).unwrap().request_timeout_secs, 30);
        config.server.timeout_sec = 5;
        assert_eq!(ingress_config(&config).unwrap().request_timeout_secs, 5);

        config
            .modules
            .insert(INGRESS_SECTION.into(), json!({"cors_enabled": "yes"}));
        assert!(ingress_config(&config).is_err());
    }
}
