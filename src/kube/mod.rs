//! Kubernetes client module
//!
//! Handles connection to the Kubernetes API server and provides the
//! [`ClusterStore`] seam and the kind registry used by owner resolution.

pub mod registry;
pub mod store;

pub use registry::{KIND_REGISTRY, KindEntry};
pub use store::{ClusterStore, KubeStore};

use anyhow::{Context, Result};
use kube::{Client, Config};

/// Initialize and return a Kubernetes client
///
/// Uses the default config loading strategy:
/// 1. In-cluster config (if running in a pod)
/// 2. KUBECONFIG environment variable
/// 3. ~/.kube/config
pub async fn create_client() -> Result<Client> {
    let config = Config::infer()
        .await
        .context("Failed to infer Kubernetes configuration")?;
    tracing::debug!(cluster_url = %config.cluster_url, "Connecting to Kubernetes API");
    Client::try_from(config).context("Failed to create Kubernetes client")
}

/// Normalize a configured watch namespace
///
/// Empty, `all` and `-A` mean every namespace and map to `None`.
pub fn watch_namespace(configured: &str) -> Option<String> {
    let ns = configured.trim();
    if ns.is_empty() || ns == "all" || ns == "-A" {
        None
    } else {
        Some(ns.to_string())
    }
}
