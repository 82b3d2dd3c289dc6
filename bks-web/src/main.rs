//! bks-web: bookstore catalog service
//!
//! Seeds the catalog from Open Library on first start, refreshes it on a
//! timer and serves it over HTTP.

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info};

use bks_common::api::load_or_create_shared_secret;
use bks_common::config::{
    load_bootstrap_config, CompiledDefaults, RootFolderInitializer, RootFolderResolver,
    ENV_BOOKS_COUNT, ENV_PORT, ENV_REFRESH_INTERVAL_MINUTES, ENV_ROOT_FOLDER,
};
use bks_common::db::init_database;
use bks_web::services::OpenLibraryClient;
use bks_web::{Application, CatalogConfig};

#[derive(Parser, Debug)]
#[command(name = "bks-web")]
#[command(about = "Bookstore catalog service fed by Open Library")]
#[command(version)]
struct Args {
    /// TOML config file (defaults to the platform config location)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Root folder holding bks.db
    #[arg(long, env = ENV_ROOT_FOLDER)]
    root_folder: Option<PathBuf>,

    /// HTTP listen port
    #[arg(long, env = ENV_PORT)]
    port: Option<u16>,

    /// Minutes between scheduled catalog refreshes
    #[arg(long, env = ENV_REFRESH_INTERVAL_MINUTES)]
    refresh_interval_minutes: Option<u64>,

    /// Books kept per scheduled refresh
    #[arg(long, env = ENV_BOOKS_COUNT)]
    books_count: Option<usize>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Loaded before tracing so `[logging] level` can seed the filter
    let toml_config = load_bootstrap_config(args.config.as_deref());

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&toml_config.logging.level)),
        )
        .init();

    info!(
        "Starting bks-web v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let root_folder = RootFolderResolver::new(args.root_folder, &toml_config).resolve();
    let initializer = RootFolderInitializer::new(root_folder);
    initializer.ensure_directory_exists()?;
    info!("Root folder: {}", initializer.root_folder().display());

    let db_path = initializer.database_path();
    info!("Database path: {}", db_path.display());

    let pool = match init_database(&db_path).await {
        Ok(pool) => {
            info!("✓ Database ready");
            pool
        }
        Err(e) => {
            error!("Failed to open database: {}", e);
            return Err(e.into());
        }
    };

    let shared_secret = load_or_create_shared_secret(&pool).await?;
    if shared_secret == 0 {
        info!("API authentication disabled (shared_secret = 0)");
    }

    let catalog_config =
        CatalogConfig::resolve(args.refresh_interval_minutes, args.books_count, &toml_config)?;
    let port = args
        .port
        .or(toml_config.port)
        .unwrap_or_else(|| CompiledDefaults::for_current_platform().port);

    let source = Arc::new(OpenLibraryClient::new()?);
    let mut app = Application::new(pool, source, catalog_config, shared_secret);
    app.start().await;

    let addr = format!("127.0.0.1:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("bks-web listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app.router())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    app.stop().await;
    info!("bks-web stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
    }
    info!("Shutdown signal received");
}
