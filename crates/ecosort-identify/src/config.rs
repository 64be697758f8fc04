//! Resolver configuration.
//!
//! Configuration is layered: built-in defaults, then an optional JSON
//! settings file, then `ECOSORT_*` environment variables. The result is
//! validated once and treated as immutable; replacing it means swapping the
//! whole value.

use std::env;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::backend::BackendKind;
use crate::error::IdentifyError;

const DEFAULT_LOCAL_MODEL_URL: &str = "http://localhost:8000";
const DEFAULT_REMOTE_AI_URL: &str = "https://toolkit.rork.com/text/llm/";
const DEFAULT_CONFIDENCE_THRESHOLD: f64 = 0.7;
const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 30_000;

pub const ENV_PRIMARY_BACKEND: &str = "ECOSORT_PRIMARY_BACKEND";
pub const ENV_FALLBACK_ENABLED: &str = "ECOSORT_FALLBACK_ENABLED";
pub const ENV_CONFIDENCE_THRESHOLD: &str = "ECOSORT_CONFIDENCE_THRESHOLD";
pub const ENV_LOCAL_MODEL_URLS: &str = "ECOSORT_LOCAL_MODEL_URLS";
pub const ENV_REMOTE_AI_URL: &str = "ECOSORT_REMOTE_AI_URL";
pub const ENV_REQUEST_TIMEOUT_MS: &str = "ECOSORT_REQUEST_TIMEOUT_MS";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct ResolverConfig {
    /// Backend asked first.
    pub primary_backend: BackendKind,
    /// Whether the other backend is asked when the primary fails.
    pub fallback_enabled: bool,
    /// Minimum local-model confidence, in `[0, 1]`.
    pub confidence_threshold: f64,
    /// Local-model base URLs, tried in order.
    pub candidate_endpoints: Vec<String>,
    /// Remote generative completion URL.
    pub remote_endpoint: String,
    /// Per-request timeout in milliseconds.
    pub request_timeout_ms: u64,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            primary_backend: BackendKind::LocalModel,
            fallback_enabled: true,
            confidence_threshold: DEFAULT_CONFIDENCE_THRESHOLD,
            candidate_endpoints: vec![DEFAULT_LOCAL_MODEL_URL.to_string()],
            remote_endpoint: DEFAULT_REMOTE_AI_URL.to_string(),
            request_timeout_ms: DEFAULT_REQUEST_TIMEOUT_MS,
        }
    }
}

impl ResolverConfig {
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(|key| env::var(key).ok())
    }

    /// Applies overrides from `lookup`. Values that do not parse are
    /// skipped and logged.
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let lookup = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        if let Some(value) = lookup(ENV_PRIMARY_BACKEND) {
            match value.parse::<BackendKind>() {
                Ok(kind) => self.primary_backend = kind,
                Err(error) => tracing::warn!("ignoring {ENV_PRIMARY_BACKEND}: {error}"),
            }
        }
        if let Some(value) = lookup(ENV_FALLBACK_ENABLED) {
            match parse_bool(&value) {
                Some(enabled) => self.fallback_enabled = enabled,
                None => tracing::warn!("ignoring {ENV_FALLBACK_ENABLED}: not a boolean: {value}"),
            }
        }
        if let Some(value) = lookup(ENV_CONFIDENCE_THRESHOLD) {
            match value.trim().parse::<f64>() {
                Ok(threshold) => self.confidence_threshold = threshold,
                Err(error) => tracing::warn!("ignoring {ENV_CONFIDENCE_THRESHOLD}: {error}"),
            }
        }
        if let Some(value) = lookup(ENV_LOCAL_MODEL_URLS) {
            self.candidate_endpoints = value
                .split(',')
                .map(str::trim)
                .filter(|url| !url.is_empty())
                .map(str::to_string)
                .collect();
        }
        if let Some(value) = lookup(ENV_REMOTE_AI_URL) {
            self.remote_endpoint = value.trim().to_string();
        }
        if let Some(value) = lookup(ENV_REQUEST_TIMEOUT_MS) {
            match value.trim().parse::<u64>() {
                Ok(timeout) => self.request_timeout_ms = timeout,
                Err(error) => tracing::warn!("ignoring {ENV_REQUEST_TIMEOUT_MS}: {error}"),
            }
        }
        self
    }

    pub fn validate(&self) -> Result<(), IdentifyError> {
        if !(0.0..=1.0).contains(&self.confidence_threshold) {
            return Err(IdentifyError::Config(format!(
                "confidence_threshold must be within [0, 1], got {}",
                self.confidence_threshold
            )));
        }
        if self.candidate_endpoints.is_empty() {
            return Err(IdentifyError::Config(
                "at least one local model endpoint is required".to_string(),
            ));
        }
        for url in &self.candidate_endpoints {
            validate_url(url)?;
        }
        validate_url(&self.remote_endpoint)?;
        if self.request_timeout_ms == 0 {
            return Err(IdentifyError::Config(
                "request_timeout_ms must be positive".to_string(),
            ));
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    /// A copy of this config with the primary backend swapped.
    pub fn with_primary_toggled(&self) -> Self {
        Self {
            primary_backend: self.primary_backend.other(),
            ..self.clone()
        }
    }
}

fn validate_url(url: &str) -> Result<(), IdentifyError> {
    let valid = url
        .strip_prefix("http://")
        .or_else(|| url.strip_prefix("https://"))
        .map(|rest| !rest.is_empty())
        .unwrap_or(false);
    if valid {
        Ok(())
    } else {
        Err(IdentifyError::Config(format!(
            "endpoint must be an http(s) URL: {url}"
        )))
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim() {
        "1" | "true" | "TRUE" | "yes" | "YES" => Some(true),
        "0" | "false" | "FALSE" | "no" | "NO" => Some(false),
        _ => None,
    }
}

/// Resolver settings persisted as JSON.
#[derive(Debug, Clone)]
pub struct ResolverSettingsStore {
    path: PathBuf,
}

impl ResolverSettingsStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Uses `ECOSORT_SETTINGS_PATH` or falls back to the app data directory.
    pub fn default_location() -> Self {
        let path = env::var("ECOSORT_SETTINGS_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| {
                dirs::data_dir()
                    .unwrap_or_else(|| PathBuf::from("."))
                    .join("ecosort")
                    .join("resolver.json")
            });
        Self::new(path)
    }

    /// Load settings from disk, returning defaults if the file is absent.
    pub fn load(&self) -> Result<ResolverConfig, IdentifyError> {
        if !self.path.exists() {
            return Ok(ResolverConfig::default());
        }
        let data = fs::read_to_string(&self.path).map_err(|error| {
            IdentifyError::Config(format!("failed to read {}: {error}", self.path.display()))
        })?;
        serde_json::from_str(&data).map_err(|error| {
            IdentifyError::Config(format!("failed to parse {}: {error}", self.path.display()))
        })
    }

    pub fn save(&self, config: &ResolverConfig) -> Result<(), IdentifyError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|error| {
                IdentifyError::Config(format!("failed to create {}: {error}", parent.display()))
            })?;
        }
        let data = serde_json::to_string_pretty(config)
            .map_err(|error| IdentifyError::Config(error.to_string()))?;
        fs::write(&self.path, data).map_err(|error| {
            IdentifyError::Config(format!("failed to write {}: {error}", self.path.display()))
        })
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }
}
