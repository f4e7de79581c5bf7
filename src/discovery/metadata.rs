//! Pod metadata extraction

use k8s_openapi::api::core::v1::Pod;

use super::labels::copy_labels;
use crate::models::DiscoveryMetadata;

/// Extract all labels and annotations from a Pod.
///
/// Nothing is filtered: `kubernetes.io/*` and other reserved keys are passed
/// through so the agent sees exactly what the Pod carries.
pub fn extract_pod_metadata(pod: &Pod) -> DiscoveryMetadata {
    DiscoveryMetadata {
        labels: copy_labels(pod.metadata.labels.as_ref()),
        annotations: copy_labels(pod.metadata.annotations.as_ref()),
    }
}
