//! Error types for the discovery core
//!
//! Soft terminations (missing owner, unsupported kind, Pod not yet visible)
//! are not errors and never show up here.

/// Discovery errors
#[derive(Debug, thiserror::Error)]
pub enum DiscoveryError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Namespace not found: {0}")]
    NamespaceNotFound(String),

    #[error("Conflicting update to {namespace}/{name}")]
    Conflict { namespace: String, name: String },

    #[error("Kubernetes API error: {0}")]
    Kube(#[from] kube::Error),

    #[error("Failed to serialize discovery document: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for discovery operations
pub type Result<T> = std::result::Result<T, DiscoveryError>;
