use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::backend::BackendKind;

/// Snapshot of which backend is asked first and which are reachable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ServiceStatus {
    /// The backend asked first.
    pub strategy: BackendKind,
    pub fallback_enabled: bool,
    pub backends: Vec<BackendStatus>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct BackendStatus {
    pub kind: BackendKind,
    pub available: bool,
    pub endpoint: String,
    pub primary: bool,
}
