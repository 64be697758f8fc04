pub mod file;
pub mod memory;

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

use crate::error::CoreResult;

/// Keyed JSON documents. A key path like `["scan_history"]` names one
/// document.
#[async_trait]
pub trait Storage: Send + Sync {
    async fn write(&self, keys: &[&str], data: &Value) -> CoreResult<()>;
    async fn read(&self, keys: &[&str]) -> CoreResult<Option<Value>>;
}

pub type SharedStorage = Arc<dyn Storage>;
