//! Label and annotation copying

use std::collections::BTreeMap;

/// Copy a label or annotation map.
///
/// A missing map yields an empty one. Every key is kept, including
/// reserved-prefix keys such as `kubernetes.io/*`.
pub fn copy_labels(source: Option<&BTreeMap<String, String>>) -> BTreeMap<String, String> {
    source.cloned().unwrap_or_default()
}
