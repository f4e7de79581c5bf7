//! Backlink controller
//!
//! Watches discovery ConfigMaps and drives [`link_artifact`] for each one.
//! The kube runtime guarantees a single worker per object while distinct
//! objects are reconciled concurrently.

pub mod backlink;

pub use backlink::{LinkOutcome, SkipReason, link_artifact};

use std::sync::Arc;
use std::time::Duration;

use futures::StreamExt;
use k8s_openapi::api::core::v1::ConfigMap;
use kube::runtime::controller::{self, Action, Controller};
use kube::runtime::watcher;
use kube::{Api, Client, ResourceExt};
use tracing::{debug, info, warn};

use crate::config::schema::{Config, ControllerConfig};
use crate::discovery::{COMPONENT_LABEL, DISCOVERY_COMPONENT};
use crate::error::DiscoveryError;
use crate::kube::{ClusterStore, KubeStore, watch_namespace};

/// Timing and parallelism settings for the controller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControllerSettings {
    pub workers: u16,
    /// Delay before retrying when the Pod is not visible yet
    pub retry_interval: Duration,
    /// Delay before retrying after an API error
    pub error_backoff: Duration,
}

impl From<&ControllerConfig> for ControllerSettings {
    fn from(config: &ControllerConfig) -> Self {
        Self {
            workers: config.workers,
            retry_interval: Duration::from_secs(config.retry_interval_seconds),
            error_backoff: Duration::from_secs(config.error_backoff_seconds),
        }
    }
}

/// Shared state handed to every reconcile call
pub struct ControllerContext {
    pub store: Arc<dyn ClusterStore>,
    pub settings: ControllerSettings,
}

/// Map a link outcome to the next controller action
pub fn action_for(outcome: &LinkOutcome, settings: &ControllerSettings) -> Action {
    match outcome {
        LinkOutcome::Retry => Action::requeue(settings.retry_interval),
        LinkOutcome::Linked { .. } | LinkOutcome::Skipped(_) => Action::await_change(),
    }
}

/// Reconcile one discovery ConfigMap
pub async fn reconcile(
    cm: Arc<ConfigMap>,
    ctx: Arc<ControllerContext>,
) -> Result<Action, DiscoveryError> {
    let namespace = cm.namespace().unwrap_or_default();
    let name = cm.name_any();

    let outcome = link_artifact(ctx.store.as_ref(), &namespace, &name).await?;
    debug!(configmap = %name, %namespace, ?outcome, "Reconciled discovery ConfigMap");
    Ok(action_for(&outcome, &ctx.settings))
}

/// Requeue after an API failure
pub fn error_policy(
    cm: Arc<ConfigMap>,
    error: &DiscoveryError,
    ctx: Arc<ControllerContext>,
) -> Action {
    warn!(
        configmap = %cm.name_any(),
        namespace = %cm.namespace().unwrap_or_default(),
        %error,
        "Failed to link discovery ConfigMap"
    );
    Action::requeue(ctx.settings.error_backoff)
}

/// Run the backlink controller until a shutdown signal arrives
pub async fn run(client: Client, config: &Config) -> anyhow::Result<()> {
    let namespace = watch_namespace(&config.namespace);
    let api: Api<ConfigMap> = match &namespace {
        Some(ns) => Api::namespaced(client.clone(), ns),
        None => Api::all(client.clone()),
    };

    let settings = ControllerSettings::from(&config.controller);
    let ctx = Arc::new(ControllerContext {
        store: Arc::new(KubeStore::new(client)),
        settings,
    });

    let selector = format!("{COMPONENT_LABEL}={DISCOVERY_COMPONENT}");
    info!(
        namespace = namespace.as_deref().unwrap_or("<all>"),
        workers = settings.workers,
        "Starting discovery ConfigMap controller"
    );

    Controller::new(api, watcher::Config::default().labels(&selector))
        .with_config(controller::Config::default().concurrency(settings.workers))
        .shutdown_on_signal()
        .run(reconcile, error_policy, ctx)
        .for_each(|result| async move {
            match result {
                Ok((obj, _)) => debug!(configmap = %obj.name, "Reconcile finished"),
                Err(e) => warn!(error = %e, "Reconcile failed"),
            }
        })
        .await;

    info!("Discovery ConfigMap controller stopped");
    Ok(())
}
