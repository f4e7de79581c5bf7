//! In-memory cluster used by the integration tests
//!
//! Objects are keyed by kind, namespace and name. Writes are counted so tests
//! can assert that an idempotent step really performed no writes.

#![allow(dead_code)]

use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use agent_discovery::error::{DiscoveryError, Result};
use agent_discovery::kube::ClusterStore;
use agent_discovery::models::KubeNodeType;
use async_trait::async_trait;
use k8s_openapi::api::core::v1::{ConfigMap, Pod};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::{ObjectMeta, OwnerReference};

type ObjectKey = (KubeNodeType, String, String);

#[derive(Default)]
pub struct FakeCluster {
    objects: Mutex<HashMap<ObjectKey, ObjectMeta>>,
    artifacts: Mutex<HashMap<(String, String), ConfigMap>>,
    next_version: AtomicUsize,
    pub writes: AtomicUsize,
    /// When set, the next owner write fails with a conflict
    pub conflict_next_write: Mutex<bool>,
}

impl FakeCluster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store an object; the namespace of a Namespace object is its own name
    pub fn insert(&self, kind: KubeNodeType, meta: ObjectMeta) {
        let name = meta.name.clone().unwrap_or_default();
        let namespace = if kind == KubeNodeType::Namespace {
            name.clone()
        } else {
            meta.namespace.clone().unwrap_or_default()
        };
        self.objects
            .lock()
            .unwrap()
            .insert((kind, namespace, name), meta);
    }

    pub fn remove(&self, kind: KubeNodeType, namespace: &str, name: &str) {
        self.objects
            .lock()
            .unwrap()
            .remove(&(kind, namespace.to_string(), name.to_string()));
    }

    pub fn insert_artifact(&self, mut artifact: ConfigMap) {
        let version = self.next_version.fetch_add(1, Ordering::SeqCst) + 1;
        artifact.metadata.resource_version = Some(version.to_string());
        let key = (
            artifact.metadata.namespace.clone().unwrap_or_default(),
            artifact.metadata.name.clone().unwrap_or_default(),
        );
        self.artifacts.lock().unwrap().insert(key, artifact);
    }

    pub fn artifact(&self, namespace: &str, name: &str) -> Option<ConfigMap> {
        self.artifacts
            .lock()
            .unwrap()
            .get(&(namespace.to_string(), name.to_string()))
            .cloned()
    }

    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ClusterStore for FakeCluster {
    async fn get_object(
        &self,
        kind: KubeNodeType,
        namespace: &str,
        name: &str,
    ) -> Result<Option<ObjectMeta>> {
        let key = if kind == KubeNodeType::Namespace {
            (kind, name.to_string(), name.to_string())
        } else {
            (kind, namespace.to_string(), name.to_string())
        };
        Ok(self.objects.lock().unwrap().get(&key).cloned())
    }

    async fn list_objects(&self, kind: KubeNodeType, namespace: &str) -> Result<Vec<ObjectMeta>> {
        let mut items: Vec<ObjectMeta> = self
            .objects
            .lock()
            .unwrap()
            .iter()
            .filter(|((k, ns, _), _)| *k == kind && ns == namespace)
            .map(|(_, meta)| meta.clone())
            .collect();
        items.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(items)
    }

    async fn get_artifact(&self, namespace: &str, name: &str) -> Result<Option<ConfigMap>> {
        Ok(self.artifact(namespace, name))
    }

    async fn create_artifact(&self, artifact: &ConfigMap) -> Result<ConfigMap> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.insert_artifact(artifact.clone());
        let namespace = artifact.metadata.namespace.clone().unwrap_or_default();
        let name = artifact.metadata.name.clone().unwrap_or_default();
        self.artifact(&namespace, &name)
            .ok_or_else(|| DiscoveryError::Validation("artifact vanished".to_string()))
    }

    async fn set_artifact_owner(
        &self,
        namespace: &str,
        name: &str,
        resource_version: Option<String>,
        owner: OwnerReference,
    ) -> Result<()> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        let conflict = {
            let mut flag = self.conflict_next_write.lock().unwrap();
            std::mem::take(&mut *flag)
        };

        let mut current = self.artifact(namespace, name).ok_or_else(|| {
            DiscoveryError::Validation(format!("no ConfigMap {namespace}/{name}"))
        })?;
        if conflict
            || (resource_version.is_some()
                && resource_version != current.metadata.resource_version)
        {
            return Err(DiscoveryError::Conflict {
                namespace: namespace.to_string(),
                name: name.to_string(),
            });
        }
        current.metadata.owner_references = Some(vec![owner]);
        self.insert_artifact(current);
        Ok(())
    }
}

pub fn labels(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

pub fn owner_ref(kind: &str, name: &str) -> OwnerReference {
    OwnerReference {
        api_version: "apps/v1".to_string(),
        kind: kind.to_string(),
        name: name.to_string(),
        uid: format!("uid-{name}"),
        controller: Some(true),
        block_owner_deletion: None,
    }
}

pub fn meta(
    name: &str,
    namespace: &str,
    labels: BTreeMap<String, String>,
    owners: Vec<OwnerReference>,
) -> ObjectMeta {
    ObjectMeta {
        name: Some(name.to_string()),
        namespace: Some(namespace.to_string()),
        uid: Some(format!("uid-{name}")),
        labels: (!labels.is_empty()).then_some(labels),
        owner_references: (!owners.is_empty()).then_some(owners),
        ..ObjectMeta::default()
    }
}

pub fn namespace(name: &str, labels: BTreeMap<String, String>) -> ObjectMeta {
    ObjectMeta {
        name: Some(name.to_string()),
        labels: (!labels.is_empty()).then_some(labels),
        ..ObjectMeta::default()
    }
}

/// `production` namespace with a Deployment → ReplicaSet → Pod chain
pub fn deployment_cluster() -> FakeCluster {
    let cluster = FakeCluster::new();
    cluster.insert(
        KubeNodeType::Namespace,
        namespace("production", labels(&[("env", "prod")])),
    );
    cluster.insert(
        KubeNodeType::Deployment,
        meta(
            "backend-api",
            "production",
            labels(&[("app", "backend-api")]),
            vec![],
        ),
    );
    cluster.insert(
        KubeNodeType::ReplicaSet,
        meta(
            "backend-api-7f8c9d",
            "production",
            labels(&[("app", "backend-api"), ("pod-template-hash", "7f8c9d")]),
            vec![owner_ref("Deployment", "backend-api")],
        ),
    );
    cluster
}

/// Pod owned by the `backend-api-7f8c9d` ReplicaSet
pub fn backend_pod(name: Option<&str>, uid: Option<&str>) -> Pod {
    Pod {
        metadata: ObjectMeta {
            name: name.map(String::from),
            generate_name: Some("backend-api-7f8c9d-".to_string()),
            namespace: Some("production".to_string()),
            uid: uid.map(String::from),
            labels: Some(labels(&[("app", "backend-api")])),
            annotations: Some(labels(&[("cryostat.io/port", "9977")])),
            owner_references: Some(vec![owner_ref("ReplicaSet", "backend-api-7f8c9d")]),
            ..ObjectMeta::default()
        },
        ..Pod::default()
    }
}
