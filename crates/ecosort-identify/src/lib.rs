pub mod backend;
pub mod catalog;
pub mod category;
pub mod config;
pub mod error;
pub mod request;
pub mod resolver;
pub mod result;
pub mod status;

#[cfg(test)]
pub(crate) mod test_support;

pub use backend::{
    BackendHealth, BackendKind, IdentificationBackend, LocalModelBackend, RemoteGenerativeBackend,
};
pub use catalog::CategoryGuide;
pub use category::Category;
pub use config::{ResolverConfig, ResolverSettingsStore};
pub use error::{BackendFailure, IdentifyError};
pub use request::{IdentificationRequest, ImagePayload, RequestKind};
pub use resolver::{BackendAttempt, Resolution, Resolver};
pub use result::IdentificationResult;
pub use status::{BackendStatus, ServiceStatus};
