//! Discovery node type definitions
//!
//! The closed set of resource kinds that may appear in a discovery hierarchy.
//! The string forms are consumed verbatim by the in-Pod agent, so they must
//! never be renamed.

use std::fmt;
use std::str::FromStr;

/// Enumeration of all resource kinds a discovery node can represent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KubeNodeType {
    Namespace,
    // Workload controllers
    Deployment,
    ReplicaSet,
    StatefulSet,
    DaemonSet,
    ReplicationController,
    // OpenShift
    DeploymentConfig,
    Pod,
}

/// Owner kinds in tie-break priority order.
///
/// When an object has several owner references, the first kind in this list
/// that matches one of them wins.
pub const EXPECTED_OWNER_KINDS: &[KubeNodeType] = &[
    KubeNodeType::Deployment,
    KubeNodeType::StatefulSet,
    KubeNodeType::DaemonSet,
    KubeNodeType::ReplicaSet,
    KubeNodeType::ReplicationController,
    KubeNodeType::DeploymentConfig,
];

impl KubeNodeType {
    /// Get the node type as it appears in `hierarchy.json`
    pub fn as_str(&self) -> &'static str {
        match self {
            KubeNodeType::Namespace => "Namespace",
            KubeNodeType::Deployment => "Deployment",
            KubeNodeType::ReplicaSet => "ReplicaSet",
            KubeNodeType::StatefulSet => "StatefulSet",
            KubeNodeType::DaemonSet => "DaemonSet",
            KubeNodeType::ReplicationController => "ReplicationController",
            KubeNodeType::DeploymentConfig => "DeploymentConfig",
            KubeNodeType::Pod => "Pod",
        }
    }

    /// Try to parse a resource kind, returning None for kinds outside the closed set
    pub fn parse_optional(s: &str) -> Option<Self> {
        s.parse().ok()
    }

    /// Get all node types
    pub fn all() -> &'static [Self] {
        &[
            KubeNodeType::Namespace,
            KubeNodeType::Deployment,
            KubeNodeType::ReplicaSet,
            KubeNodeType::StatefulSet,
            KubeNodeType::DaemonSet,
            KubeNodeType::ReplicationController,
            KubeNodeType::DeploymentConfig,
            KubeNodeType::Pod,
        ]
    }
}

impl fmt::Display for KubeNodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl From<KubeNodeType> for String {
    fn from(kind: KubeNodeType) -> Self {
        kind.as_str().to_string()
    }
}

impl FromStr for KubeNodeType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Namespace" => Ok(KubeNodeType::Namespace),
            "Deployment" => Ok(KubeNodeType::Deployment),
            "ReplicaSet" => Ok(KubeNodeType::ReplicaSet),
            "StatefulSet" => Ok(KubeNodeType::StatefulSet),
            "DaemonSet" => Ok(KubeNodeType::DaemonSet),
            "ReplicationController" => Ok(KubeNodeType::ReplicationController),
            "DeploymentConfig" => Ok(KubeNodeType::DeploymentConfig),
            "Pod" => Ok(KubeNodeType::Pod),
            _ => Err(format!("Unsupported discovery node type: {}", s)),
        }
    }
}
