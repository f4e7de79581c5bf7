//! Pod discovery functionality
//!
//! Reconstructs where a Pod sits in its ownership hierarchy and packages that,
//! together with the Pod's labels and annotations, into a ConfigMap the agent
//! inside the Pod can read at startup.

pub mod artifact;
pub mod hierarchy;
pub mod labels;
pub mod metadata;
pub mod owner;

pub use artifact::{artifact_name, artifact_name_for, publish_artifact, write_artifact};
pub use hierarchy::{build_hierarchy, pod_identifier, walk_owner_chain};
pub use labels::copy_labels;
pub use metadata::extract_pod_metadata;
pub use owner::{ResolvedOwner, resolve, select_owner};

/// Component tag of discovery ConfigMaps
pub const DISCOVERY_COMPONENT: &str = "cryostat-agent-discovery";
/// Name prefix of discovery ConfigMaps; the remainder is the Pod identifier
pub const DISCOVERY_NAME_PREFIX: &str = "cryostat-agent-discovery-";
/// Operator identity recorded in the managed-by label
pub const DISCOVERY_MANAGED_BY: &str = "cryostat-operator";

pub const MANAGED_BY_LABEL: &str = "app.kubernetes.io/managed-by";
pub const COMPONENT_LABEL: &str = "app.kubernetes.io/component";

/// Annotation holding the generate-name prefix a ConfigMap name was derived
/// from; absent when the Pod name was already assigned
pub const GENERATE_NAME_ANNOTATION: &str = "cryostat.io/discovery-generate-name";

/// ConfigMap data keys
pub const HIERARCHY_KEY: &str = "hierarchy.json";
pub const METADATA_KEY: &str = "metadata.json";
