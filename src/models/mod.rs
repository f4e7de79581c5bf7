//! Discovery model layer
//!
//! Rust types for the discovery payload and the closed set of node types.

mod discovery;
mod node_type;

pub use discovery::{DiscoveryMetadata, DiscoveryNode};
pub use node_type::{EXPECTED_OWNER_KINDS, KubeNodeType};
