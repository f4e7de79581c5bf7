//! Cluster read/write seam
//!
//! Everything the discovery core needs from the API server goes through
//! [`ClusterStore`]. Reads are never cached: every call reaches the API
//! server, so repeated hierarchy builds observe the current owner chain.

use async_trait::async_trait;
use k8s_openapi::api::core::v1::ConfigMap;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::{ObjectMeta, OwnerReference};
use kube::api::{ListParams, Patch, PatchParams, PostParams};
use kube::core::DynamicObject;
use kube::{Api, Client};
use serde_json::json;

use super::registry::{self, KindEntry};
use crate::error::{DiscoveryError, Result};
use crate::models::KubeNodeType;

/// Read/write access to the objects the discovery core works with
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ClusterStore: Send + Sync {
    /// Fetch the metadata of one object; `Ok(None)` when it does not exist.
    ///
    /// `namespace` is ignored for cluster-scoped kinds.
    async fn get_object(
        &self,
        kind: KubeNodeType,
        namespace: &str,
        name: &str,
    ) -> Result<Option<ObjectMeta>>;

    /// List the metadata of all objects of a kind in a namespace
    async fn list_objects(&self, kind: KubeNodeType, namespace: &str) -> Result<Vec<ObjectMeta>>;

    /// Fetch a discovery ConfigMap; `Ok(None)` when it does not exist
    async fn get_artifact(&self, namespace: &str, name: &str) -> Result<Option<ConfigMap>>;

    /// Persist a new discovery ConfigMap
    async fn create_artifact(&self, artifact: &ConfigMap) -> Result<ConfigMap>;

    /// Set the single owner reference of a discovery ConfigMap.
    ///
    /// When `resource_version` is given the write is conditional on it and a
    /// concurrent modification yields [`DiscoveryError::Conflict`].
    async fn set_artifact_owner(
        &self,
        namespace: &str,
        name: &str,
        resource_version: Option<String>,
        owner: OwnerReference,
    ) -> Result<()>;
}

/// [`ClusterStore`] backed by the Kubernetes API
#[derive(Clone)]
pub struct KubeStore {
    client: Client,
}

impl KubeStore {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    fn dynamic_api(&self, entry: &KindEntry, namespace: &str) -> Api<DynamicObject> {
        let api_resource = entry.api_resource();
        if entry.namespaced {
            Api::namespaced_with(self.client.clone(), namespace, &api_resource)
        } else {
            Api::all_with(self.client.clone(), &api_resource)
        }
    }

    fn config_maps(&self, namespace: &str) -> Api<ConfigMap> {
        Api::namespaced(self.client.clone(), namespace)
    }
}

#[async_trait]
impl ClusterStore for KubeStore {
    async fn get_object(
        &self,
        kind: KubeNodeType,
        namespace: &str,
        name: &str,
    ) -> Result<Option<ObjectMeta>> {
        let Some(entry) = registry::lookup(kind) else {
            return Ok(None);
        };
        let obj = self.dynamic_api(entry, namespace).get_opt(name).await?;
        Ok(obj.map(|o| o.metadata))
    }

    async fn list_objects(&self, kind: KubeNodeType, namespace: &str) -> Result<Vec<ObjectMeta>> {
        let Some(entry) = registry::lookup(kind) else {
            return Ok(Vec::new());
        };
        let list = self
            .dynamic_api(entry, namespace)
            .list(&ListParams::default())
            .await?;
        Ok(list.items.into_iter().map(|o| o.metadata).collect())
    }

    async fn get_artifact(&self, namespace: &str, name: &str) -> Result<Option<ConfigMap>> {
        Ok(self.config_maps(namespace).get_opt(name).await?)
    }

    async fn create_artifact(&self, artifact: &ConfigMap) -> Result<ConfigMap> {
        let namespace = artifact.metadata.namespace.as_deref().ok_or_else(|| {
            DiscoveryError::Validation("discovery ConfigMap has no namespace".to_string())
        })?;
        Ok(self
            .config_maps(namespace)
            .create(&PostParams::default(), artifact)
            .await?)
    }

    async fn set_artifact_owner(
        &self,
        namespace: &str,
        name: &str,
        resource_version: Option<String>,
        owner: OwnerReference,
    ) -> Result<()> {
        let mut metadata = json!({ "ownerReferences": [owner] });
        if let Some(rv) = resource_version {
            metadata["resourceVersion"] = json!(rv);
        }
        let patch = json!({ "metadata": metadata });

        match self
            .config_maps(namespace)
            .patch(name, &PatchParams::default(), &Patch::Merge(&patch))
            .await
        {
            Ok(_) => Ok(()),
            Err(kube::Error::Api(e)) if e.code == 409 => Err(DiscoveryError::Conflict {
                namespace: namespace.to_string(),
                name: name.to_string(),
            }),
            Err(e) => Err(e.into()),
        }
    }
}
