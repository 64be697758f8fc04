use axum::{extract::State, Json};
use ecosort_identify::{BackendKind, ResolverConfig, ResolverSettingsStore, ServiceStatus};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use utoipa::ToSchema;

use crate::server::error::{ApiError, ApiErrorResponse};
use crate::server::ServerState;

#[derive(Debug, Serialize, ToSchema)]
pub struct TogglePrimaryResponse {
    pub primary_backend: BackendKind,
}

#[utoipa::path(
    get,
    path = "/status",
    tag = "resolver",
    responses(
        (status = 200, description = "Backend order and reachability", body = ServiceStatus),
    ),
    description = "Report which backend is asked first and which are reachable."
)]
#[tracing::instrument(skip_all)]
pub(crate) async fn status(State(state): State<Arc<ServerState>>) -> Json<ServiceStatus> {
    Json(state.resolver.status().await)
}

#[utoipa::path(
    get,
    path = "/config",
    tag = "resolver",
    responses(
        (status = 200, description = "Current resolver config", body = ResolverConfig),
    )
)]
pub(crate) async fn get_config(State(state): State<Arc<ServerState>>) -> Json<ResolverConfig> {
    Json(state.resolver.config().await.as_ref().clone())
}

/// Body of `PUT /config`. Every field is required so a partial body can't
/// silently reset the rest to defaults.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct ResolverConfigUpdate {
    pub primary_backend: BackendKind,
    pub fallback_enabled: bool,
    pub confidence_threshold: f64,
    pub candidate_endpoints: Vec<String>,
    pub remote_endpoint: String,
    pub request_timeout_ms: u64,
}

impl From<ResolverConfigUpdate> for ResolverConfig {
    fn from(update: ResolverConfigUpdate) -> Self {
        Self {
            primary_backend: update.primary_backend,
            fallback_enabled: update.fallback_enabled,
            confidence_threshold: update.confidence_threshold,
            candidate_endpoints: update.candidate_endpoints,
            remote_endpoint: update.remote_endpoint,
            request_timeout_ms: update.request_timeout_ms,
        }
    }
}

#[utoipa::path(
    put,
    path = "/config",
    tag = "resolver",
    request_body = ResolverConfigUpdate,
    responses(
        (status = 200, description = "Config replaced", body = ResolverConfig),
        (status = 400, body = ApiErrorResponse),
    ),
    description = "Replace the whole resolver config. Scans already running keep the old one."
)]
#[tracing::instrument(skip_all)]
pub(crate) async fn replace_config(
    State(state): State<Arc<ServerState>>,
    Json(body): Json<Value>,
) -> Result<Json<ResolverConfig>, ApiError> {
    let update: ResolverConfigUpdate = serde_json::from_value(body)
        .map_err(|error| ApiError::bad_request(format!("invalid config: {error}")))?;
    let config = ResolverConfig::from(update);

    let settings = state.settings.lock().await;
    state.resolver.replace_config(config.clone()).await?;
    persist(settings.as_ref(), &config).await;
    Ok(Json(config))
}

#[utoipa::path(
    post,
    path = "/config/toggle-primary",
    tag = "resolver",
    responses(
        (status = 200, description = "Backend now asked first", body = TogglePrimaryResponse),
    )
)]
#[tracing::instrument(skip_all)]
pub(crate) async fn toggle_primary(
    State(state): State<Arc<ServerState>>,
) -> Json<TogglePrimaryResponse> {
    let settings = state.settings.lock().await;
    let primary_backend = state.resolver.toggle_primary().await;
    let config = state.resolver.config().await;
    persist(settings.as_ref(), &config).await;
    Json(TogglePrimaryResponse { primary_backend })
}

async fn persist(store: Option<&ResolverSettingsStore>, config: &ResolverConfig) {
    let Some(store) = store.cloned() else {
        return;
    };
    let path = store.path().clone();
    let config = config.clone();
    match tokio::task::spawn_blocking(move || store.save(&config)).await {
        Ok(Ok(())) => tracing::debug!(path = %path.display(), "saved resolver settings"),
        Ok(Err(error)) => {
            tracing::warn!(path = %path.display(), "failed to save resolver settings: {error}")
        }
        Err(error) => tracing::warn!("resolver settings save task failed: {error}"),
    }
}
