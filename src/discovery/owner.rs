//! Owner reference selection and resolution
//!
//! One step of the owner chain walk: pick the most relevant owner of an
//! object, then fetch it through the kind registry.

use k8s_openapi::apimachinery::pkg::apis::meta::v1::{ObjectMeta, OwnerReference};
use tracing::debug;

use super::labels::copy_labels;
use crate::error::{DiscoveryError, Result};
use crate::kube::{ClusterStore, registry};
use crate::models::{DiscoveryNode, KubeNodeType};

/// An owner that was found in the cluster
#[derive(Debug, Clone)]
pub struct ResolvedOwner {
    /// Discovery node for the owner, with empty children
    pub node: DiscoveryNode,
    pub kind: KubeNodeType,
    /// Metadata of the fetched owner, used to continue the walk
    pub meta: ObjectMeta,
}

/// Select the most relevant owner reference.
///
/// The first kind in `expected` that matches any reference wins, regardless
/// of input order. If no reference has an expected kind, the first reference
/// is used. An empty list ends the chain.
pub fn select_owner<'a>(
    owners: &'a [OwnerReference],
    expected: &[KubeNodeType],
) -> Option<&'a OwnerReference> {
    expected
        .iter()
        .find_map(|kind| owners.iter().find(|owner| owner.kind == kind.as_str()))
        .or_else(|| owners.first())
}

/// Fetch the object behind an owner reference.
///
/// Returns `Ok(None)` when the kind is outside the registry or the owner no
/// longer exists; both simply end the chain. Other read failures propagate.
pub async fn resolve(
    store: &dyn ClusterStore,
    owner: &OwnerReference,
    namespace: &str,
) -> Result<Option<ResolvedOwner>> {
    let Some(entry) = registry::lookup_kind(&owner.kind) else {
        debug!(kind = %owner.kind, name = %owner.name, "Unsupported owner kind, ending chain");
        return Ok(None);
    };
    // The namespace is always the root and is never taken from an owner reference
    if entry.kind == KubeNodeType::Namespace {
        return Ok(None);
    }
    if owner.name.is_empty() {
        return Err(DiscoveryError::Validation(format!(
            "owner reference of kind {} in namespace {} has an empty name",
            owner.kind, namespace
        )));
    }

    match store.get_object(entry.kind, namespace, &owner.name).await? {
        Some(meta) => {
            let node = DiscoveryNode::new(
                owner.name.clone(),
                entry.kind,
                copy_labels(meta.labels.as_ref()),
            );
            Ok(Some(ResolvedOwner {
                node,
                kind: entry.kind,
                meta,
            }))
        }
        None => {
            debug!(kind = %owner.kind, name = %owner.name, namespace, "Owner not found, ending chain");
            Ok(None)
        }
    }
}
