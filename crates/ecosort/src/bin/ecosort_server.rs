//! Runs the EcoSort HTTP API.
//!
//! Usage: `cargo run --bin ecosort-server`

use std::net::SocketAddr;
use std::sync::Arc;

use ecosort::{CoreError, CoreResult, FileStorage, Server};
use ecosort_identify::{Resolver, ResolverSettingsStore};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8787";

#[tokio::main]
async fn main() -> CoreResult<()> {
    let _ = dotenvy::dotenv();
    init_tracing();

    let settings = ResolverSettingsStore::default_location();
    let config = settings.load()?.with_env_overrides();
    let resolver = Arc::new(Resolver::new(config)?);

    let bind_addr: SocketAddr = std::env::var("ECOSORT_BIND_ADDR")
        .unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string())
        .parse()
        .map_err(|error| CoreError::InvalidInput(format!("invalid ECOSORT_BIND_ADDR: {error}")))?;
    let storage = FileStorage::default_location();
    tracing::info!(
        data_dir = %storage.root().display(),
        settings = %settings.path().display(),
        "starting ecosort"
    );

    let mut server = Server::new(bind_addr, resolver, Arc::new(storage), Some(settings)).await?;
    if let Err(error) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {error}");
    }
    tracing::info!("shutting down");
    server.shutdown()
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if env_bool("ECOSORT_LOG_JSON", false) {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}

fn env_bool(name: &str, default: bool) -> bool {
    match std::env::var(name) {
        Ok(value) => matches!(value.trim(), "1" | "true" | "TRUE" | "yes" | "YES"),
        Err(_) => default,
    }
}
