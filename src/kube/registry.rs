//! Kind registry for owner resolution
//!
//! Maps every discovery node type to the API coordinates needed to fetch it.
//! Owner resolution is driven entirely by this table: supporting another
//! owner kind means adding a `KubeNodeType` variant and one entry here.

use kube::core::{ApiResource, GroupVersionKind};

use crate::models::KubeNodeType;

/// Registry entry for a fetchable resource kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KindEntry {
    pub kind: KubeNodeType,
    pub group: &'static str,
    pub version: &'static str,
    pub plural: &'static str,
    pub namespaced: bool,
}

impl KindEntry {
    /// Build the dynamic API resource for this kind
    pub fn api_resource(&self) -> ApiResource {
        let gvk = GroupVersionKind::gvk(self.group, self.version, self.kind.as_str());
        ApiResource::from_gvk_with_plural(&gvk, self.plural)
    }
}

/// Registry of all fetchable kinds
pub const KIND_REGISTRY: &[KindEntry] = &[
    KindEntry {
        kind: KubeNodeType::Namespace,
        group: "",
        version: "v1",
        plural: "namespaces",
        namespaced: false,
    },
    KindEntry {
        kind: KubeNodeType::Deployment,
        group: "apps",
        version: "v1",
        plural: "deployments",
        namespaced: true,
    },
    KindEntry {
        kind: KubeNodeType::ReplicaSet,
        group: "apps",
        version: "v1",
        plural: "replicasets",
        namespaced: true,
    },
    KindEntry {
        kind: KubeNodeType::StatefulSet,
        group: "apps",
        version: "v1",
        plural: "statefulsets",
        namespaced: true,
    },
    KindEntry {
        kind: KubeNodeType::DaemonSet,
        group: "apps",
        version: "v1",
        plural: "daemonsets",
        namespaced: true,
    },
    KindEntry {
        kind: KubeNodeType::ReplicationController,
        group: "",
        version: "v1",
        plural: "replicationcontrollers",
        namespaced: true,
    },
    KindEntry {
        kind: KubeNodeType::DeploymentConfig,
        group: "apps.openshift.io",
        version: "v1",
        plural: "deploymentconfigs",
        namespaced: true,
    },
    KindEntry {
        kind: KubeNodeType::Pod,
        group: "",
        version: "v1",
        plural: "pods",
        namespaced: true,
    },
];

/// Look up the registry entry for a node type
pub fn lookup(kind: KubeNodeType) -> Option<&'static KindEntry> {
    KIND_REGISTRY.iter().find(|entry| entry.kind == kind)
}

/// Look up the registry entry for a raw resource kind string
///
/// Returns None for kinds outside the closed node type set.
pub fn lookup_kind(kind: &str) -> Option<&'static KindEntry> {
    KubeNodeType::parse_optional(kind).and_then(lookup)
}
