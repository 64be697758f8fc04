use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::Mutex;

use crate::error::{CoreError, CoreResult};
use crate::storage::Storage;

/// Process-local storage, used when nothing should touch disk.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    documents: Mutex<HashMap<String, Value>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

fn joined(keys: &[&str]) -> CoreResult<String> {
    if keys.is_empty() {
        return Err(CoreError::InvalidInput("storage keys empty".to_string()));
    }
    Ok(keys.join("/"))
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn write(&self, keys: &[&str], data: &Value) -> CoreResult<()> {
        let key = joined(keys)?;
        self.documents.lock().await.insert(key, data.clone());
        Ok(())
    }

    async fn read(&self, keys: &[&str]) -> CoreResult<Option<Value>> {
        let key = joined(keys)?;
        Ok(self.documents.lock().await.get(&key).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn round_trips_documents_by_key_path() {
        let storage = MemoryStorage::new();
        storage.write(&["a", "b"], &json!({"x": 1})).await.unwrap();
        assert_eq!(storage.read(&["a", "b"]).await.unwrap(), Some(json!({"x": 1})));
        assert_eq!(storage.read(&["a"]).await.unwrap(), None);
        assert!(storage.read(&[]).await.is_err());
    }
}
