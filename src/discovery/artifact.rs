//! Discovery ConfigMap construction
//!
//! Serializes the hierarchy and metadata documents and wraps them in a
//! ConfigMap named after the Pod. During admission the Pod usually has no
//! name or UID yet, so the ConfigMap is normally created without an owner
//! reference and linked later by the backlink controller.

use std::collections::BTreeMap;

use k8s_openapi::api::core::v1::{ConfigMap, Pod};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::{ObjectMeta, OwnerReference};
use rand::Rng;
use tracing::info;

use super::hierarchy::{build_hierarchy, pod_namespace};
use super::metadata::extract_pod_metadata;
use super::{
    COMPONENT_LABEL, DISCOVERY_COMPONENT, DISCOVERY_MANAGED_BY, DISCOVERY_NAME_PREFIX,
    GENERATE_NAME_ANNOTATION, HIERARCHY_KEY, MANAGED_BY_LABEL, METADATA_KEY,
};
use crate::error::{DiscoveryError, Result};
use crate::kube::ClusterStore;

const LOWER_ALPHANUMERICS: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";
const RANDOM_SUFFIX_LENGTH: usize = 5;
/// Maximum length of a Kubernetes object name
pub const NAME_LENGTH_LIMIT: usize = 253;

/// Generate a random suffix of lowercase alphanumerics
pub fn random_suffix(len: usize) -> String {
    let mut rng = rand::rng();
    (0..len)
        .map(|_| {
            let idx = rng.random_range(0..LOWER_ALPHANUMERICS.len());
            LOWER_ALPHANUMERICS[idx] as char
        })
        .collect()
}

/// Prefix an identifier and bound the result to [`NAME_LENGTH_LIMIT`].
///
/// Truncated names never end in `-` or `.`.
pub fn artifact_name_for(identifier: &str) -> String {
    let name = format!("{DISCOVERY_NAME_PREFIX}{identifier}");
    if name.len() <= NAME_LENGTH_LIMIT {
        return name;
    }
    let cut = name
        .char_indices()
        .nth(NAME_LENGTH_LIMIT)
        .map(|(i, _)| i)
        .unwrap_or(name.len());
    name[..cut].trim_end_matches(['-', '.']).to_string()
}

/// Generate-name prefix the ConfigMap name is derived from, when the Pod
/// has no name yet
fn pending_generate_name(pod: &Pod) -> Option<&str> {
    let name = pod.metadata.name.as_deref().unwrap_or_default();
    pod.metadata
        .generate_name
        .as_deref()
        .filter(|g| name.is_empty() && !g.is_empty())
}

/// Compute the ConfigMap name for a Pod.
///
/// Uses the Pod name when assigned. Otherwise the generate-name prefix plus a
/// random suffix, so two Pods admitted from the same template get distinct
/// ConfigMaps (with high probability, not certainty).
pub fn artifact_name(pod: &Pod) -> Result<String> {
    let identifier = match (pod.metadata.name.as_deref(), pending_generate_name(pod)) {
        (Some(name), _) if !name.is_empty() => name.to_string(),
        (_, Some(generate_name)) => {
            format!("{generate_name}{}", random_suffix(RANDOM_SUFFIX_LENGTH))
        }
        _ => {
            return Err(DiscoveryError::Validation(
                "pod has neither name nor generateName set".to_string(),
            ));
        }
    };

    Ok(artifact_name_for(&identifier))
}

/// Owner reference from a discovery ConfigMap to its Pod
pub fn pod_owner_reference(name: &str, uid: &str) -> OwnerReference {
    OwnerReference {
        api_version: "v1".to_string(),
        kind: "Pod".to_string(),
        name: name.to_string(),
        uid: uid.to_string(),
        controller: Some(true),
        block_owner_deletion: None,
    }
}

/// Labels carried by every discovery ConfigMap
pub fn artifact_labels() -> BTreeMap<String, String> {
    BTreeMap::from([
        (MANAGED_BY_LABEL.to_string(), DISCOVERY_MANAGED_BY.to_string()),
        (COMPONENT_LABEL.to_string(), DISCOVERY_COMPONENT.to_string()),
    ])
}

/// Build the discovery ConfigMap for a Pod without persisting it.
///
/// The owner reference is attached only when both the Pod name and UID are
/// already known. A name derived from a generate-name prefix is recorded in
/// [`GENERATE_NAME_ANNOTATION`] so the backlink controller knows it may match
/// sibling Pods by that prefix.
pub async fn write_artifact(store: &dyn ClusterStore, pod: &Pod) -> Result<ConfigMap> {
    let hierarchy = build_hierarchy(store, pod).await?;
    let hierarchy_json = serde_json::to_string(&hierarchy)?;
    let metadata_json = serde_json::to_string(&extract_pod_metadata(pod))?;

    let name = artifact_name(pod)?;
    let namespace = pod_namespace(pod)?.to_string();

    let owner_references = match (pod.metadata.name.as_deref(), pod.metadata.uid.as_deref()) {
        (Some(pod_name), Some(uid)) if !pod_name.is_empty() && !uid.is_empty() => {
            Some(vec![pod_owner_reference(pod_name, uid)])
        }
        _ => None,
    };

    let annotations = pending_generate_name(pod).map(|generate_name| {
        BTreeMap::from([(
            GENERATE_NAME_ANNOTATION.to_string(),
            generate_name.to_string(),
        )])
    });

    Ok(ConfigMap {
        metadata: ObjectMeta {
            name: Some(name),
            namespace: Some(namespace),
            labels: Some(artifact_labels()),
            annotations,
            owner_references,
            ..ObjectMeta::default()
        },
        data: Some(BTreeMap::from([
            (HIERARCHY_KEY.to_string(), hierarchy_json),
            (METADATA_KEY.to_string(), metadata_json),
        ])),
        ..ConfigMap::default()
    })
}

/// Build the discovery ConfigMap for a Pod and create it in the cluster
pub async fn publish_artifact(store: &dyn ClusterStore, pod: &Pod) -> Result<ConfigMap> {
    let artifact = write_artifact(store, pod).await?;
    let created = store.create_artifact(&artifact).await?;
    info!(
        configmap = created.metadata.name.as_deref().unwrap_or_default(),
        namespace = created.metadata.namespace.as_deref().unwrap_or_default(),
        linked = created.metadata.owner_references.is_some(),
        "Published discovery ConfigMap"
    );
    Ok(created)
}
