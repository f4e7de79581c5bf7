//! Discovery hierarchy construction
//!
//! Builds the tree `Namespace → [Deployment/StatefulSet/...] → ... → Pod` for
//! a Pod by walking its owner references up to the highest ancestor that can
//! still be fetched.

use k8s_openapi::api::core::v1::Pod;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use tracing::debug;

use super::labels::copy_labels;
use super::owner::{resolve, select_owner};
use crate::error::{DiscoveryError, Result};
use crate::kube::ClusterStore;
use crate::models::{DiscoveryNode, EXPECTED_OWNER_KINDS, KubeNodeType};

/// Name used for the Pod node: its name, or its generate-name prefix when the
/// name is not assigned yet. Trailing `-`, `_` and `.` are trimmed.
pub fn pod_identifier(pod: &Pod) -> Option<String> {
    let raw = pod
        .metadata
        .name
        .as_deref()
        .filter(|n| !n.is_empty())
        .or(pod.metadata.generate_name.as_deref())
        .unwrap_or_default();
    let trimmed = raw.trim_end_matches(['-', '_', '.']);
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Pod namespace, rejecting a missing or empty one
pub(crate) fn pod_namespace(pod: &Pod) -> Result<&str> {
    pod.metadata
        .namespace
        .as_deref()
        .filter(|ns| !ns.is_empty())
        .ok_or_else(|| {
            DiscoveryError::Validation(format!(
                "pod namespace cannot be empty for pod {}",
                pod_identifier(pod).unwrap_or_default()
            ))
        })
}

/// Walk the owner chain of `start` and return the owners in discovery order
/// (closest owner first).
pub async fn walk_owner_chain(
    store: &dyn ClusterStore,
    start: &ObjectMeta,
    namespace: &str,
) -> Result<Vec<DiscoveryNode>> {
    let mut chain: Vec<DiscoveryNode> = Vec::new();
    let mut current = start.clone();

    loop {
        let owners = current.owner_references.as_deref().unwrap_or_default();
        let Some(selected) = select_owner(owners, EXPECTED_OWNER_KINDS) else {
            break;
        };
        let Some(owner) = resolve(store, selected, namespace).await? else {
            break;
        };

        // Check if we're already tracking this owner in the chain (reference cycle)
        let already_in_chain = chain
            .iter()
            .any(|n| n.node_type == owner.node.node_type && n.name == owner.node.name);
        if already_in_chain {
            debug!(kind = %owner.kind, name = %owner.node.name, "Owner already in chain, stopping walk");
            break;
        }

        debug!(kind = %owner.kind, name = %owner.node.name, namespace, "Resolved owner");
        chain.push(owner.node);
        current = owner.meta;
    }

    Ok(chain)
}

/// Build the complete discovery hierarchy for a Pod.
///
/// The root is always the Pod's Namespace and the leaf is always the Pod.
pub async fn build_hierarchy(store: &dyn ClusterStore, pod: &Pod) -> Result<DiscoveryNode> {
    let pod_name = pod_identifier(pod).ok_or_else(|| {
        DiscoveryError::Validation("pod name and generateName are both empty".to_string())
    })?;
    let namespace = pod_namespace(pod)?;

    let pod_node = DiscoveryNode::new(
        pod_name,
        KubeNodeType::Pod,
        copy_labels(pod.metadata.labels.as_ref()),
    );
    let owners = walk_owner_chain(store, &pod.metadata, namespace).await?;

    let ns_meta = store
        .get_object(KubeNodeType::Namespace, namespace, namespace)
        .await?
        .ok_or_else(|| DiscoveryError::NamespaceNotFound(namespace.to_string()))?;
    let mut root = DiscoveryNode::new(
        ns_meta.name.unwrap_or_else(|| namespace.to_string()),
        KubeNodeType::Namespace,
        copy_labels(ns_meta.labels.as_ref()),
    );

    // Nest from the Pod upward: each owner adopts the subtree below it
    let subtree = owners.into_iter().fold(pod_node, |child, mut owner| {
        owner.children.push(child);
        owner
    });
    root.children.push(subtree);

    Ok(root)
}
