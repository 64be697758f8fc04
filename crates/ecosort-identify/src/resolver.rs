use std::sync::Arc;

use tokio::sync::RwLock;

use crate::backend::{BackendKind, IdentificationBackend, LocalModelBackend, RemoteGenerativeBackend};
use crate::config::ResolverConfig;
use crate::error::{BackendFailure, IdentifyError};
use crate::request::IdentificationRequest;
use crate::result::IdentificationResult;
use crate::status::{BackendStatus, ServiceStatus};

/// A backend that was asked and did not answer.
#[derive(Debug, Clone, PartialEq)]
pub struct BackendAttempt {
    pub backend: BackendKind,
    pub failure: BackendFailure,
}

/// The outcome of one identification, with diagnostics.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub result: IdentificationResult,
    /// `None` when every backend failed and the result is degraded.
    pub answered_by: Option<BackendKind>,
    pub failures: Vec<BackendAttempt>,
}

impl Resolution {
    pub fn is_degraded(&self) -> bool {
        self.answered_by.is_none()
    }
}

/// Orders the registered backends per the current config and asks them in
/// turn until one answers.
pub struct Resolver {
    config: RwLock<Arc<ResolverConfig>>,
    backends: Vec<Arc<dyn IdentificationBackend>>,
}

impl Resolver {
    /// Local model and remote generative backends sharing one connection
    /// pool.
    pub fn new(config: ResolverConfig) -> Result<Self, IdentifyError> {
        let client = reqwest::Client::builder().build()?;
        Self::with_backends(
            config,
            vec![
                Arc::new(LocalModelBackend::with_client(client.clone())),
                Arc::new(RemoteGenerativeBackend::with_client(client)),
            ],
        )
    }

    /// Registration order decides the order of non-primary backends.
    pub fn with_backends(
        config: ResolverConfig,
        backends: Vec<Arc<dyn IdentificationBackend>>,
    ) -> Result<Self, IdentifyError> {
        config.validate()?;
        Ok(Self {
            config: RwLock::new(Arc::new(config)),
            backends,
        })
    }

    pub async fn config(&self) -> Arc<ResolverConfig> {
        self.config.read().await.clone()
    }

    /// Swaps in a whole new config. Calls already in flight keep the
    /// snapshot they started with.
    pub async fn replace_config(&self, config: ResolverConfig) -> Result<(), IdentifyError> {
        config.validate()?;
        let mut guard = self.config.write().await;
        tracing::info!(
            primary = %config.primary_backend,
            fallback_enabled = config.fallback_enabled,
            candidates = config.candidate_endpoints.len(),
            "resolver config replaced"
        );
        *guard = Arc::new(config);
        Ok(())
    }

    /// Swaps which backend is asked first and returns the new primary.
    pub async fn toggle_primary(&self) -> BackendKind {
        let mut guard = self.config.write().await;
        let toggled = guard.with_primary_toggled();
        let primary = toggled.primary_backend;
        *guard = Arc::new(toggled);
        tracing::info!(%primary, "switched primary backend");
        primary
    }

    /// Never fails: falls back to a degraded result for the request kind.
    pub async fn identify(&self, request: &IdentificationRequest) -> IdentificationResult {
        self.resolve(request).await.result
    }

    pub async fn resolve(&self, request: &IdentificationRequest) -> Resolution {
        let config = self.config().await;
        let mut failures = Vec::new();

        for backend in self.plan(request, &config) {
            match backend.query(request, &config).await {
                Ok(result) => {
                    tracing::info!(
                        backend = %backend.kind(),
                        kind = ?request.kind(),
                        category = %result.category,
                        "identified item"
                    );
                    return Resolution {
                        result,
                        answered_by: Some(backend.kind()),
                        failures,
                    };
                }
                Err(failure) => {
                    tracing::warn!(backend = %backend.kind(), "backend failed: {failure}");
                    failures.push(BackendAttempt {
                        backend: backend.kind(),
                        failure,
                    });
                }
            }
        }

        tracing::warn!(
            kind = ?request.kind(),
            attempts = failures.len(),
            "no backend could identify the item, returning degraded result"
        );
        Resolution {
            result: IdentificationResult::degraded_for(request),
            answered_by: None,
            failures,
        }
    }

    pub async fn status(&self) -> ServiceStatus {
        let config = self.config().await;
        let mut backends = Vec::with_capacity(self.backends.len());
        for backend in &self.backends {
            let health = backend.health(&config).await;
            backends.push(BackendStatus {
                kind: backend.kind(),
                available: health.available,
                endpoint: health.endpoint,
                primary: backend.kind() == config.primary_backend,
            });
        }
        ServiceStatus {
            strategy: config.primary_backend,
            fallback_enabled: config.fallback_enabled,
            backends,
        }
    }

    /// Primary first, the rest in registration order, minus backends that
    /// cannot handle the request. Without fallback only the head is kept.
    fn plan(
        &self,
        request: &IdentificationRequest,
        config: &ResolverConfig,
    ) -> Vec<&Arc<dyn IdentificationBackend>> {
        let primary = config.primary_backend;
        let mut ordered: Vec<&Arc<dyn IdentificationBackend>> = self
            .backends
            .iter()
            .filter(|backend| backend.kind() == primary)
            .chain(self.backends.iter().filter(|backend| backend.kind() != primary))
            .filter(|backend| backend.supports(request))
            .collect();
        if !config.fallback_enabled {
            ordered.truncate(1);
        }
        ordered
    }
}
