//! Data structures for the discovery payload
//!
//! These serialize to the `hierarchy.json` and `metadata.json` documents read
//! by the agent running inside the Pod.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::KubeNodeType;

/// A node in the discovery tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscoveryNode {
    pub name: String,
    pub node_type: String,
    /// Always serialized, `{}` when the source object has no labels
    pub labels: BTreeMap<String, String>,
    /// Always serialized, `[]` for leaves
    pub children: Vec<DiscoveryNode>,
}

impl DiscoveryNode {
    /// Create a leaf node with no children
    pub fn new(
        name: impl Into<String>,
        node_type: KubeNodeType,
        labels: BTreeMap<String, String>,
    ) -> Self {
        Self {
            name: name.into(),
            node_type: node_type.into(),
            labels,
            children: Vec::new(),
        }
    }

    /// Number of levels from this node down to its deepest leaf
    pub fn depth(&self) -> usize {
        1 + self.children.iter().map(|c| c.depth()).max().unwrap_or(0)
    }

    /// Follow the first child at every level, from this node to the leaf
    pub fn spine(&self) -> Vec<&DiscoveryNode> {
        let mut nodes = vec![self];
        let mut current = self;
        while let Some(child) = current.children.first() {
            nodes.push(child);
            current = child;
        }
        nodes
    }
}

/// Labels and annotations applied to the agent's own discovery node
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscoveryMetadata {
    pub labels: BTreeMap<String, String>,
    pub annotations: BTreeMap<String, String>,
}
