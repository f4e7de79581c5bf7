//! Owner backlink state machine
//!
//! A discovery ConfigMap is usually created before its Pod exists, so it
//! starts out without an owner reference. [`link_artifact`] finds the Pod it
//! was written for and adds the reference, so the ConfigMap is garbage
//! collected together with the Pod.
//!
//! Every transition is idempotent. Running it again on a linked ConfigMap is
//! a no-op, and a Pod that is not visible yet only asks for a retry.

use k8s_openapi::api::core::v1::ConfigMap;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use tracing::{debug, info};

use crate::discovery::artifact::pod_owner_reference;
use crate::discovery::{
    COMPONENT_LABEL, DISCOVERY_COMPONENT, DISCOVERY_NAME_PREFIX, GENERATE_NAME_ANNOTATION,
};
use crate::error::{DiscoveryError, Result};
use crate::kube::ClusterStore;
use crate::models::KubeNodeType;

/// Why a ConfigMap was left untouched
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The ConfigMap no longer exists
    ArtifactGone,
    /// The ConfigMap does not carry the discovery component label
    NotManaged,
    /// The name does not start with the discovery prefix
    UnrecognizedName,
    /// An owner reference is already present
    AlreadyLinked,
}

/// Result of one link attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkOutcome {
    /// Terminal, nothing to do
    Skipped(SkipReason),
    /// The owner reference was written
    Linked { pod: String, uid: String },
    /// The Pod is not visible yet (or the write raced); try again later
    Retry,
}

/// Pod identifier embedded in a discovery ConfigMap name
pub fn artifact_identifier(name: &str) -> Option<&str> {
    name.strip_prefix(DISCOVERY_NAME_PREFIX)
        .filter(|id| !id.is_empty())
}

/// Generate-name prefix of an identifier: everything up to and including the
/// last `-`
pub fn generate_name_prefix(identifier: &str) -> Option<&str> {
    identifier.rfind('-').map(|i| &identifier[..=i])
}

fn is_managed(artifact: &ConfigMap) -> bool {
    artifact
        .metadata
        .labels
        .as_ref()
        .and_then(|l| l.get(COMPONENT_LABEL))
        .is_some_and(|c| c == DISCOVERY_COMPONENT)
}

/// Whether the ConfigMap name was derived from a generate-name prefix
fn from_generate_name(artifact: &ConfigMap) -> bool {
    artifact
        .metadata
        .annotations
        .as_ref()
        .is_some_and(|a| a.contains_key(GENERATE_NAME_ANNOTATION))
}

fn is_linked(artifact: &ConfigMap) -> bool {
    artifact
        .metadata
        .owner_references
        .as_ref()
        .is_some_and(|refs| !refs.is_empty())
}

/// Pod that owns the ConfigMap
struct PodIdentity {
    name: String,
    uid: String,
}

impl PodIdentity {
    fn from_meta(meta: ObjectMeta) -> Option<Self> {
        match (meta.name, meta.uid) {
            (Some(name), Some(uid)) if !name.is_empty() && !uid.is_empty() => {
                Some(Self { name, uid })
            }
            _ => None,
        }
    }
}

/// Find the Pod a ConfigMap identifier refers to.
///
/// Tries the exact name first. When the ConfigMap was named from a
/// generate-name prefix plus a random suffix, the real Pod name differs, so
/// fall back to the first Pod with a UID whose name starts with the prefix.
/// ConfigMaps named after an assigned Pod name never fall back, so they are
/// not attached to a sibling Pod.
async fn find_pod(
    store: &dyn ClusterStore,
    namespace: &str,
    identifier: &str,
    generated: bool,
) -> Result<Option<PodIdentity>> {
    if let Some(meta) = store
        .get_object(KubeNodeType::Pod, namespace, identifier)
        .await?
    {
        return Ok(PodIdentity::from_meta(meta));
    }
    if !generated {
        debug!(pod = identifier, namespace, "Named Pod not visible yet");
        return Ok(None);
    }

    let Some(prefix) = generate_name_prefix(identifier) else {
        debug!(pod = identifier, namespace, "Pod not found and no generate-name prefix");
        return Ok(None);
    };

    let pods = store.list_objects(KubeNodeType::Pod, namespace).await?;
    let matched = pods
        .into_iter()
        .filter(|meta| meta.name.as_deref().is_some_and(|n| n.starts_with(prefix)))
        .find_map(PodIdentity::from_meta);

    if matched.is_none() {
        debug!(prefix, namespace, "No Pod matches generate-name prefix");
    }
    Ok(matched)
}

/// Link a discovery ConfigMap to its Pod.
pub async fn link_artifact(
    store: &dyn ClusterStore,
    namespace: &str,
    name: &str,
) -> Result<LinkOutcome> {
    let Some(artifact) = store.get_artifact(namespace, name).await? else {
        return Ok(LinkOutcome::Skipped(SkipReason::ArtifactGone));
    };
    if !is_managed(&artifact) {
        return Ok(LinkOutcome::Skipped(SkipReason::NotManaged));
    }
    let Some(identifier) = artifact_identifier(name) else {
        info!(configmap = name, "ConfigMap name doesn't match expected format");
        return Ok(LinkOutcome::Skipped(SkipReason::UnrecognizedName));
    };
    if is_linked(&artifact) {
        return Ok(LinkOutcome::Skipped(SkipReason::AlreadyLinked));
    }

    let generated = from_generate_name(&artifact);
    let Some(pod) = find_pod(store, namespace, identifier, generated).await? else {
        info!(pod = identifier, namespace, "Pod not found yet, will retry");
        return Ok(LinkOutcome::Retry);
    };

    // Re-check right before writing; another worker may have linked it meanwhile
    let Some(current) = store.get_artifact(namespace, name).await? else {
        return Ok(LinkOutcome::Skipped(SkipReason::ArtifactGone));
    };
    if is_linked(&current) {
        return Ok(LinkOutcome::Skipped(SkipReason::AlreadyLinked));
    }

    let owner = pod_owner_reference(&pod.name, &pod.uid);
    match store
        .set_artifact_owner(namespace, name, current.metadata.resource_version, owner)
        .await
    {
        Ok(()) => {}
        Err(DiscoveryError::Conflict { .. }) => {
            debug!(configmap = name, namespace, "Concurrent update, will retry");
            return Ok(LinkOutcome::Retry);
        }
        Err(e) => return Err(e),
    }

    info!(configmap = name, pod = %pod.name, namespace, "Added owner reference to discovery ConfigMap");
    Ok(LinkOutcome::Linked {
        pod: pod.name,
        uid: pod.uid,
    })
}
