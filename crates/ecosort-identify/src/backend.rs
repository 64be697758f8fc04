pub mod local;
pub mod prompt;
pub mod remote;

pub use local::LocalModelBackend;
pub use remote::RemoteGenerativeBackend;

use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::config::ResolverConfig;
use crate::error::{BackendFailure, IdentifyError};
use crate::request::IdentificationRequest;
use crate::result::IdentificationResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    LocalModel,
    RemoteAi,
}

impl BackendKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BackendKind::LocalModel => "local_model",
            BackendKind::RemoteAi => "remote_ai",
        }
    }

    pub fn other(&self) -> BackendKind {
        match self {
            BackendKind::LocalModel => BackendKind::RemoteAi,
            BackendKind::RemoteAi => BackendKind::LocalModel,
        }
    }
}

impl Default for BackendKind {
    fn default() -> Self {
        BackendKind::LocalModel
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BackendKind {
    type Err = IdentifyError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "local_model" | "local" | "ml" => Ok(BackendKind::LocalModel),
            "remote_ai" | "remote" | "ai" => Ok(BackendKind::RemoteAi),
            other => Err(IdentifyError::InvalidInput(format!(
                "unknown backend: {other}"
            ))),
        }
    }
}

/// Reachability as seen by a backend's own health check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendHealth {
    pub available: bool,
    pub endpoint: String,
}

/// One way of turning a request into a result.
///
/// Backends hold no per-request state. Everything that may change at
/// runtime (endpoints, timeouts, thresholds) is read from the config
/// snapshot passed to each call.
#[async_trait]
pub trait IdentificationBackend: Send + Sync {
    fn kind(&self) -> BackendKind;

    fn supports(&self, request: &IdentificationRequest) -> bool;

    async fn query(
        &self,
        request: &IdentificationRequest,
        config: &ResolverConfig,
    ) -> Result<IdentificationResult, BackendFailure>;

    async fn health(&self, config: &ResolverConfig) -> BackendHealth;
}
