use async_trait::async_trait;
use serde_json::Value;
use std::path::{Path, PathBuf};

use crate::error::{CoreError, CoreResult};
use crate::storage::Storage;

/// One pretty-printed JSON file per key path under `root`.
#[derive(Clone)]
pub struct FileStorage {
    root: PathBuf,
}

impl FileStorage {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    /// Uses `ECOSORT_DATA_DIR` or falls back to the app data directory.
    pub fn default_location() -> Self {
        let root = std::env::var("ECOSORT_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| {
                dirs::data_dir()
                    .unwrap_or_else(|| PathBuf::from("."))
                    .join("ecosort")
                    .join("data")
            });
        Self::new(root)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn document_path(&self, keys: &[&str]) -> CoreResult<PathBuf> {
        let Some((last, parents)) = keys.split_last() else {
            return Err(CoreError::InvalidInput("storage keys empty".to_string()));
        };
        let mut path = self.root.clone();
        for key in parents {
            validate_key(key)?;
            path.push(key);
        }
        validate_key(last)?;
        path.push(format!("{last}.json"));
        Ok(path)
    }
}

#[async_trait]
impl Storage for FileStorage {
    /// Writes to a sibling temp file first so readers never see a torn
    /// document.
    async fn write(&self, keys: &[&str], data: &Value) -> CoreResult<()> {
        let path = self.document_path(keys)?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(|error| {
                CoreError::Internal(format!(
                    "failed to create storage directory {}: {error}",
                    parent.display()
                ))
            })?;
        }
        let serialized = serde_json::to_vec_pretty(data)
            .map_err(|error| CoreError::Internal(format!("storage serialize error: {error}")))?;
        let staging = path.with_extension("json.tmp");
        tokio::fs::write(&staging, serialized)
            .await
            .map_err(|error| {
                CoreError::Internal(format!(
                    "failed to write storage file {}: {error}",
                    staging.display()
                ))
            })?;
        tokio::fs::rename(&staging, &path).await.map_err(|error| {
            CoreError::Internal(format!(
                "failed to replace storage file {}: {error}",
                path.display()
            ))
        })
    }

    async fn read(&self, keys: &[&str]) -> CoreResult<Option<Value>> {
        let path = self.document_path(keys)?;
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(error) => {
                return Err(CoreError::Internal(format!(
                    "failed to read storage file {}: {error}",
                    path.display()
                )))
            }
        };
        let value = serde_json::from_slice(&bytes)
            .map_err(|error| CoreError::Internal(format!("storage parse error: {error}")))?;
        Ok(Some(value))
    }
}

fn validate_key(key: &str) -> CoreResult<()> {
    if key.is_empty() || key == "." || key == ".." || key.contains(&['/', '\\'][..]) {
        return Err(CoreError::InvalidInput(format!("invalid storage key {key}")));
    }
    Ok(())
}
