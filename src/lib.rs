//! Agent discovery library
//!
//! Reconstructs a Pod's ownership hierarchy, publishes it as a discovery
//! ConfigMap and links that ConfigMap back to its Pod once the Pod exists.
//! It can be used both as a binary and as a library for testing.

pub mod cli;
pub mod config;
pub mod controller;
pub mod discovery;
pub mod error;
pub mod kube;
pub mod models;

// Re-export commonly used types for convenience
pub use controller::{LinkOutcome, SkipReason, link_artifact};
pub use discovery::{build_hierarchy, publish_artifact, write_artifact};
pub use error::{DiscoveryError, Result};
pub use models::{DiscoveryMetadata, DiscoveryNode, KubeNodeType};
