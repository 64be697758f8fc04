use axum::{extract::State, Json};
use ecosort_identify::{BackendKind, IdentificationRequest, IdentificationResult, Resolution};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::ledger::ScanMode;
use crate::server::error::{ApiError, ApiErrorResponse};
use crate::server::ServerState;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum CaptureMode {
    #[default]
    Camera,
    Barcode,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct IdentifyRequest {
    /// Base64 image, optionally with a `data:` URI prefix.
    pub image: String,
    #[serde(default)]
    pub mode: CaptureMode,
    #[serde(default = "default_record")]
    pub record: bool,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SearchRequest {
    pub query: String,
    #[serde(default = "default_record")]
    pub record: bool,
}

fn default_record() -> bool {
    true
}

#[derive(Debug, Serialize, ToSchema)]
pub struct FailedAttempt {
    pub backend: BackendKind,
    pub reason: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ScanResponse {
    pub result: IdentificationResult,
    pub answered_by: Option<BackendKind>,
    pub degraded: bool,
    pub failures: Vec<FailedAttempt>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub record_id: Option<Uuid>,
}

impl ScanResponse {
    fn new(resolution: Resolution, record_id: Option<Uuid>) -> Self {
        let degraded = resolution.is_degraded();
        Self {
            failures: resolution
                .failures
                .into_iter()
                .map(|attempt| FailedAttempt {
                    backend: attempt.backend,
                    reason: attempt.failure.to_string(),
                })
                .collect(),
            result: resolution.result,
            answered_by: resolution.answered_by,
            degraded,
            record_id,
        }
    }
}

async fn resolve_and_record(
    state: &ServerState,
    request: IdentificationRequest,
    mode: ScanMode,
    record: bool,
) -> ScanResponse {
    let resolution = state.resolver.resolve(&request).await;
    let record_id = if record {
        Some(state.record(resolution.result.clone(), mode).await)
    } else {
        None
    };
    ScanResponse::new(resolution, record_id)
}

#[utoipa::path(
    post,
    path = "/identify",
    tag = "scan",
    request_body = IdentifyRequest,
    responses(
        (status = 200, description = "Identified item, or the degraded result", body = ScanResponse),
        (status = 400, body = ApiErrorResponse),
    ),
    description = "Identify a photographed item or barcode."
)]
#[tracing::instrument(skip_all)]
pub(crate) async fn identify(
    State(state): State<Arc<ServerState>>,
    Json(payload): Json<IdentifyRequest>,
) -> Result<Json<ScanResponse>, ApiError> {
    tracing::debug!(mode = ?payload.mode, bytes = payload.image.len(), "identify request");
    let (request, mode) = match payload.mode {
        CaptureMode::Camera => (IdentificationRequest::image(payload.image)?, ScanMode::Camera),
        CaptureMode::Barcode => (
            IdentificationRequest::barcode(payload.image)?,
            ScanMode::Barcode,
        ),
    };
    Ok(Json(
        resolve_and_record(&state, request, mode, payload.record).await,
    ))
}

#[utoipa::path(
    post,
    path = "/search",
    tag = "scan",
    request_body = SearchRequest,
    responses(
        (status = 200, description = "Guidance for the query, or the degraded result", body = ScanResponse),
        (status = 400, body = ApiErrorResponse),
    ),
    description = "Look up recycling guidance for a free-text item name."
)]
#[tracing::instrument(skip_all)]
pub(crate) async fn search(
    State(state): State<Arc<ServerState>>,
    Json(payload): Json<SearchRequest>,
) -> Result<Json<ScanResponse>, ApiError> {
    let request = IdentificationRequest::text(&payload.query)?;
    Ok(Json(
        resolve_and_record(&state, request, ScanMode::Search, payload.record).await,
    ))
}
