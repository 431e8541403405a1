//! # Vitrine Server
//!
//! Admin backend for a product catalog and its orders.
//!
//! ## Commands
//!
//! - `vitrine-server` / `vitrine-server serve`: run the HTTP API
//! - `vitrine-server db migrate`: apply the embedded schema migrations
//! - `vitrine-server db analyze`: refresh planner statistics of the catalog
//! - `vitrine-server db diagnose`: print plans of the listing hot paths
//! - `vitrine-server cache flush`: drop every listing cache entry

use std::{net::SocketAddr, path::PathBuf, sync::Arc};

use anyhow::Context;
use clap::{Args as ClapArgs, Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use vitrine_config::{Config, ConfigLoad, ConfigLoader};
use vitrine_core::{AppUnitOfWork, CacheMaintenance, StoreMaintenance};
use vitrine_server::{
    create_app,
    infra::startup::{build_state, connect_database, listing_cache},
};

/// CLI entry point
#[derive(Parser, Debug)]
#[command(name = "vitrine-server")]
#[command(about = "Catalog and order listing admin backend")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    #[command(flatten)]
    serve: ServeArgs,
}

#[derive(ClapArgs, Debug, Clone)]
struct ServeArgs {
    /// Path to a TOML configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Server port (overrides config)
    #[arg(short, long)]
    port: Option<u16>,

    /// Server host (overrides config)
    #[arg(long)]
    host: Option<String>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the HTTP API (default)
    Serve,
    #[command(subcommand)]
    Db(DbCommand),
    #[command(subcommand)]
    Cache(CacheCommand),
}

#[derive(Debug, Subcommand)]
enum DbCommand {
    /// Apply database migrations and exit
    Migrate,
    /// Run ANALYZE over the catalog tables and exit
    Analyze,
    /// Explain the listing queries and print table activity
    Diagnose,
}

#[derive(Debug, Subcommand)]
enum CacheCommand {
    /// Delete every key under the configured namespace
    Flush,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = load_runtime_config(&cli.serve)?;

    match cli.command {
        None | Some(Command::Serve) => run_server(config).await,
        Some(Command::Db(DbCommand::Migrate)) => run_db_migrate(&config).await,
        Some(Command::Db(DbCommand::Analyze)) => run_db_analyze(&config).await,
        Some(Command::Db(DbCommand::Diagnose)) => {
            run_db_diagnose(&config).await
        }
        Some(Command::Cache(CacheCommand::Flush)) => {
            run_cache_flush(&config).await
        }
    }
}

fn load_runtime_config(args: &ServeArgs) -> anyhow::Result<Arc<Config>> {
    let mut loader = ConfigLoader::new();
    if let Some(path) = args.config.clone() {
        loader = loader.with_config_path(path);
    }
    let ConfigLoad {
        mut config,
        warnings,
    } = loader.load().context("failed to load configuration")?;

    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(host) = args.host.clone() {
        config.server.host = host;
    }

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=warn,sqlx=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if config.metadata.env_file_loaded {
        info!("loaded .env file");
    }
    if let Some(path) = config.metadata.config_path.as_ref() {
        info!(path = %path.display(), "loaded configuration file");
    }

    for warning in &warnings.items {
        match &warning.hint {
            Some(hint) => {
                warn!(
                    message = %warning.message,
                    hint = %hint,
                    "configuration warning"
                )
            }
            None => {
                warn!(message = %warning.message, "configuration warning")
            }
        }
    }

    Ok(Arc::new(config))
}

async fn run_server(config: Arc<Config>) -> anyhow::Result<()> {
    let (state, postgres) = build_state(&config).await?;
    let stats = postgres.pool_stats();
    info!(
        pool_size = stats.size,
        max_connections = stats.max_size,
        cache_enabled = state.cache_enabled,
        "listing services ready"
    );

    let router = create_app(state);
    let addr: SocketAddr = config
        .server
        .bind_address()
        .parse()
        .with_context(|| {
            format!("invalid bind address {}", config.server.bind_address())
        })?;

    info!("Starting Vitrine admin API on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

async fn run_db_migrate(config: &Config) -> anyhow::Result<()> {
    let pg = connect_database(config).await?;
    pg.initialize_schema()
        .await
        .context("database migration failed")?;
    info!("Database migrations applied successfully");
    Ok(())
}

async fn maintenance(config: &Config) -> anyhow::Result<StoreMaintenance> {
    let pg = connect_database(config).await?;
    let uow = AppUnitOfWork::from_postgres(&pg)
        .map_err(|e| anyhow::anyhow!("failed to wire repositories: {e}"))?;
    Ok(StoreMaintenance::new(uow.maintenance.clone()))
}

async fn run_db_analyze(config: &Config) -> anyhow::Result<()> {
    let tables = maintenance(config)
        .await?
        .analyze_tables()
        .await
        .context("ANALYZE failed")?;
    for table in tables {
        println!("analyzed {}", table.as_str());
    }
    Ok(())
}

async fn run_db_diagnose(config: &Config) -> anyhow::Result<()> {
    let diagnostics = maintenance(config)
        .await?
        .diagnose()
        .await
        .context("diagnostics failed")?;

    for plan in &diagnostics.plans {
        println!("== {} ==", plan.title);
        for line in &plan.lines {
            println!("{line}");
        }
        println!();
    }

    println!("== table activity ==");
    for activity in &diagnostics.activity {
        let last_analyze = activity
            .last_analyze
            .map(|at| at.to_rfc3339())
            .unwrap_or_else(|| "never".to_string());
        println!(
            "{:<16} live_rows={:<10} last_analyze={}",
            activity.table, activity.live_rows, last_analyze
        );
    }
    Ok(())
}

async fn run_cache_flush(config: &Config) -> anyhow::Result<()> {
    if config.redis.is_none() {
        anyhow::bail!("no Redis configured; nothing to flush");
    }
    let (cache, enabled) = listing_cache(config).await;
    if !enabled {
        anyhow::bail!("Redis is unreachable; cache was not flushed");
    }
    let removed = CacheMaintenance::new(cache)
        .flush()
        .await
        .context("cache flush failed")?;
    println!("removed {removed} cache entries");
    Ok(())
}
