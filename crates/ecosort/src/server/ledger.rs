use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;
use std::sync::Arc;
use utoipa::IntoParams;

use crate::ledger::{RecyclingStats, ScanRecord};
use crate::server::ServerState;

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct HistoryQuery {
    pub limit: Option<usize>,
}

#[utoipa::path(
    get,
    path = "/history",
    tag = "ledger",
    params(HistoryQuery),
    responses(
        (status = 200, description = "Recorded scans, newest first", body = [ScanRecord]),
    )
)]
pub(crate) async fn history(
    State(state): State<Arc<ServerState>>,
    Query(query): Query<HistoryQuery>,
) -> Json<Vec<ScanRecord>> {
    let ledger = state.ledger.lock().await;
    let records = ledger.history();
    let limit = query.limit.unwrap_or(records.len()).min(records.len());
    Json(records[..limit].to_vec())
}

#[utoipa::path(
    get,
    path = "/stats",
    tag = "ledger",
    responses(
        (status = 200, description = "Scan counts, CO2 saved, streak and level", body = RecyclingStats),
    )
)]
pub(crate) async fn stats(State(state): State<Arc<ServerState>>) -> Json<RecyclingStats> {
    Json(state.ledger.lock().await.stats().clone())
}
