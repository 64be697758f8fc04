use axum::routing::{get, post, put};
use axum::Router;
use chrono::Utc;
use ecosort_identify::{IdentificationResult, Resolver, ResolverSettingsStore};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::{oneshot, Mutex};
use tower_http::cors::{Any, CorsLayer};
use uuid::Uuid;

use crate::error::{CoreError, CoreResult};
use crate::ledger::{ScanLedger, ScanMode};
use crate::reminders::ReminderBook;
use crate::storage::SharedStorage;

pub mod catalog;
pub mod error;
pub mod ledger;
pub mod openapi;
pub mod reminders;
pub mod resolver;
pub mod scan;

pub struct Server {
    addr: SocketAddr,
    shutdown: Option<oneshot::Sender<()>>,
    state: Arc<ServerState>,
}

impl Server {
    /// Loads the ledger and reminders, binds `bind_addr` and serves until
    /// shut down. Port 0 picks a free port; see [`Server::addr`].
    pub async fn new(
        bind_addr: SocketAddr,
        resolver: Arc<Resolver>,
        storage: SharedStorage,
        settings: Option<ResolverSettingsStore>,
    ) -> CoreResult<Self> {
        let ledger = ScanLedger::load(storage.as_ref()).await?;
        let reminder_book = ReminderBook::load(storage.as_ref()).await?;
        let state = Arc::new(ServerState {
            resolver,
            ledger: Mutex::new(ledger),
            reminders: Mutex::new(reminder_book),
            storage,
            settings: Mutex::new(settings),
        });
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
        let app = Router::new()
            .route("/health", get(health))
            .route("/identify", post(scan::identify))
            .route("/search", post(scan::search))
            .route("/status", get(resolver::status))
            .route(
                "/config",
                get(resolver::get_config).put(resolver::replace_config),
            )
            .route("/config/toggle-primary", post(resolver::toggle_primary))
            .route("/history", get(ledger::history))
            .route("/stats", get(ledger::stats))
            .route("/categories/:category", get(catalog::category_guide))
            .route(
                "/reminders",
                get(reminders::list_reminders).post(reminders::create_reminder),
            )
            .route(
                "/reminders/:id",
                put(reminders::update_reminder).delete(reminders::delete_reminder),
            )
            .with_state(state.clone())
            .layer(cors);
        let listener = TcpListener::bind(bind_addr)
            .await
            .map_err(|error| CoreError::Internal(format!("failed to bind {bind_addr}: {error}")))?;
        let addr = listener
            .local_addr()
            .map_err(|error| CoreError::Internal(error.to_string()))?;
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

        tokio::spawn(async move {
            if let Err(error) = axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    let _ = shutdown_rx.await;
                })
                .await
            {
                tracing::error!("server stopped with error: {error}");
            }
        });
        tracing::info!(%addr, "ecosort server listening");

        Ok(Server {
            addr,
            shutdown: Some(shutdown_tx),
            state,
        })
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn resolver(&self) -> &Arc<Resolver> {
        &self.state.resolver
    }

    pub fn shutdown(&mut self) -> CoreResult<()> {
        if let Some(sender) = self.shutdown.take() {
            sender
                .send(())
                .map_err(|_| CoreError::Internal("failed to send server shutdown signal".to_string()))
        } else {
            Ok(())
        }
    }
}

impl Drop for Server {
    fn drop(&mut self) {
        let _ = self.shutdown();
    }
}

async fn health() -> &'static str {
    "ok"
}

pub(crate) struct ServerState {
    pub(crate) resolver: Arc<Resolver>,
    pub(crate) ledger: Mutex<ScanLedger>,
    pub(crate) reminders: Mutex<ReminderBook>,
    pub(crate) storage: SharedStorage,
    /// Held across a config change and its save so the file ends up in
    /// the order changes were applied.
    pub(crate) settings: Mutex<Option<ResolverSettingsStore>>,
}

impl ServerState {
    /// Records a scan and persists the ledger. A failed write is logged;
    /// the in-memory ledger still holds the scan.
    pub(crate) async fn record(&self, result: IdentificationResult, mode: ScanMode) -> Uuid {
        let mut ledger = self.ledger.lock().await;
        let id = ledger.record(result, mode, Utc::now()).id;
        if let Err(error) = ledger.save(self.storage.as_ref()).await {
            tracing::warn!("failed to persist scan ledger: {error}");
        }
        id
    }
}
