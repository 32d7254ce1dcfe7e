use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use coursescope_audit::AuditParsingConfigBuilder;
use coursescope_catalog::{CatalogDatabase, SharedCatalog};
use coursescope_core::config_file;

mod error;
mod handlers;
mod models;
mod router;
mod state;
mod upload;

use state::AppState;

/// Catalog file used when neither the config file nor `COURSESCOPE_DB` names one.
const DEFAULT_DB_PATH: &str = "uic_courses.db";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let settings = config_file::resolve(&config_file::load_config());

    let db_path = settings
        .db_path
        .clone()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DB_PATH));
    let catalog = CatalogDatabase::open(&db_path).with_context(|| {
        format!(
            "failed to open course catalog at {} (create it with `coursescope init-db`)",
            db_path.display()
        )
    })?;
    tracing::info!(path = %db_path.display(), "course catalog loaded");

    let mut parsing = AuditParsingConfigBuilder::new()
        .track_planned_and_needed(settings.track_planned_and_needed);
    for pattern in &settings.extra_ignore_patterns {
        parsing = parsing.add_ignore_pattern(pattern.clone());
    }
    let parsing = parsing
        .build()
        .context("invalid ignore pattern in [parsing] config")?;

    let chain = coursescope_ingest::default_chain();
    tracing::info!(backends = ?chain.names(), "PDF backends");

    let state = Arc::new(AppState {
        catalog: SharedCatalog::new(catalog),
        chain,
        parsing,
    });

    let app = router::build_router(state, settings.max_upload_bytes());

    let addr: SocketAddr = settings
        .bind_addr
        .parse()
        .with_context(|| format!("invalid bind address {:?}", settings.bind_addr))?;
    tracing::info!(max_upload_mb = settings.max_upload_mb, "listening on http://{addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
