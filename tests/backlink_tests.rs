//! Backlink controller tests
//!
//! Drive `link_artifact` against an in-memory cluster to check how discovery
//! ConfigMaps get attached to their Pods, including the generate-name case
//! where the ConfigMap name and the real Pod name differ.

mod common;

use agent_discovery::controller::{LinkOutcome, SkipReason, link_artifact};
use agent_discovery::discovery::write_artifact;
use agent_discovery::models::KubeNodeType;
use common::{FakeCluster, backend_pod, deployment_cluster, labels, meta, owner_ref};
use k8s_openapi::api::core::v1::ConfigMap;

/// Publish an admission-time artifact and return its name
async fn admitted_artifact(cluster: &FakeCluster) -> String {
    let artifact = write_artifact(cluster, &backend_pod(None, None))
        .await
        .unwrap();
    let name = artifact.metadata.name.clone().unwrap();
    cluster.insert_artifact(artifact);
    name
}

fn add_pod(cluster: &FakeCluster, name: &str) {
    cluster.insert(
        KubeNodeType::Pod,
        meta(
            name,
            "production",
            labels(&[("app", "backend-api")]),
            vec![owner_ref("ReplicaSet", "backend-api-7f8c9d")],
        ),
    );
}

/// Pod created but not yet assigned a UID
fn add_pending_pod(cluster: &FakeCluster, name: &str) {
    let mut pending = meta(name, "production", labels(&[]), vec![]);
    pending.uid = None;
    cluster.insert(KubeNodeType::Pod, pending);
}

#[tokio::test]
async fn test_generate_name_artifact_links_to_scheduled_pod() {
    let cluster = deployment_cluster();
    let name = admitted_artifact(&cluster).await;
    // Both sort ahead of the real match
    add_pod(&cluster, "aaa-other-pod");
    add_pending_pod(&cluster, "backend-api-7f8c9d-00000");
    add_pod(&cluster, "backend-api-7f8c9d-q8w2z");

    let outcome = link_artifact(&cluster, "production", &name).await.unwrap();

    assert_eq!(
        outcome,
        LinkOutcome::Linked {
            pod: "backend-api-7f8c9d-q8w2z".to_string(),
            uid: "uid-backend-api-7f8c9d-q8w2z".to_string(),
        }
    );
    let owners = cluster
        .artifact("production", &name)
        .unwrap()
        .metadata
        .owner_references
        .unwrap();
    assert_eq!(owners.len(), 1);
    assert_eq!(owners[0].uid, "uid-backend-api-7f8c9d-q8w2z");
    assert_eq!(owners[0].controller, Some(true));
}

#[tokio::test]
async fn test_pod_not_yet_visible_requests_retry() {
    let cluster = deployment_cluster();
    let name = admitted_artifact(&cluster).await;

    let outcome = link_artifact(&cluster, "production", &name).await.unwrap();

    assert_eq!(outcome, LinkOutcome::Retry);
    assert_eq!(cluster.write_count(), 0);
}

#[tokio::test]
async fn test_second_pass_performs_no_writes() {
    let cluster = deployment_cluster();
    let name = admitted_artifact(&cluster).await;
    add_pod(&cluster, "backend-api-7f8c9d-q8w2z");

    link_artifact(&cluster, "production", &name).await.unwrap();
    assert_eq!(cluster.write_count(), 1);

    let outcome = link_artifact(&cluster, "production", &name).await.unwrap();
    assert_eq!(outcome, LinkOutcome::Skipped(SkipReason::AlreadyLinked));
    assert_eq!(cluster.write_count(), 1);
}

#[tokio::test]
async fn test_exact_name_artifact_links() {
    let cluster = deployment_cluster();
    add_pod(&cluster, "backend-api-7f8c9d-xk2lp");
    // Written before the UID was known
    let artifact = write_artifact(
        &cluster,
        &backend_pod(Some("backend-api-7f8c9d-xk2lp"), None),
    )
    .await
    .unwrap();
    let name = artifact.metadata.name.clone().unwrap();
    cluster.insert_artifact(artifact);

    let outcome = link_artifact(&cluster, "production", &name).await.unwrap();
    assert_eq!(
        outcome,
        LinkOutcome::Linked {
            pod: "backend-api-7f8c9d-xk2lp".to_string(),
            uid: "uid-backend-api-7f8c9d-xk2lp".to_string(),
        }
    );
}

#[tokio::test]
async fn test_conflicting_write_requests_retry() {
    let cluster = deployment_cluster();
    let name = admitted_artifact(&cluster).await;
    add_pod(&cluster, "backend-api-7f8c9d-q8w2z");
    *cluster.conflict_next_write.lock().unwrap() = true;

    let outcome = link_artifact(&cluster, "production", &name).await.unwrap();
    assert_eq!(outcome, LinkOutcome::Retry);

    // The next attempt goes through
    let outcome = link_artifact(&cluster, "production", &name).await.unwrap();
    assert!(matches!(outcome, LinkOutcome::Linked { .. }));
}

#[tokio::test]
async fn test_deleted_artifact_is_skipped() {
    let cluster = deployment_cluster();

    let outcome = link_artifact(&cluster, "production", "cryostat-agent-discovery-gone")
        .await
        .unwrap();
    assert_eq!(outcome, LinkOutcome::Skipped(SkipReason::ArtifactGone));
}

#[tokio::test]
async fn test_foreign_configmap_is_skipped() {
    let cluster = deployment_cluster();
    let mut cm = ConfigMap::default();
    cm.metadata.name = Some("cryostat-agent-discovery-manual".to_string());
    cm.metadata.namespace = Some("production".to_string());
    cm.metadata.labels = Some(labels(&[("app", "manual")]));
    cluster.insert_artifact(cm);

    let outcome = link_artifact(&cluster, "production", "cryostat-agent-discovery-manual")
        .await
        .unwrap();
    assert_eq!(outcome, LinkOutcome::Skipped(SkipReason::NotManaged));
    assert_eq!(cluster.write_count(), 0);
}

#[tokio::test]
async fn test_unprefixed_name_is_skipped() {
    let cluster = deployment_cluster();
    let mut artifact = write_artifact(
        &cluster,
        &backend_pod(Some("backend-api-7f8c9d-xk2lp"), None),
    )
    .await
    .unwrap();
    artifact.metadata.name = Some("agent-settings".to_string());
    cluster.insert_artifact(artifact);

    let outcome = link_artifact(&cluster, "production", "agent-settings")
        .await
        .unwrap();
    assert_eq!(outcome, LinkOutcome::Skipped(SkipReason::UnrecognizedName));
}

#[tokio::test]
async fn test_named_artifact_waits_for_its_own_pod() {
    let cluster = FakeCluster::new();
    cluster.insert(
        KubeNodeType::Namespace,
        common::namespace("data", labels(&[])),
    );
    let mut pod = backend_pod(Some("postgres-0"), None);
    pod.metadata.namespace = Some("data".to_string());
    pod.metadata.owner_references = None;
    let artifact = write_artifact(&cluster, &pod).await.unwrap();
    let name = artifact.metadata.name.clone().unwrap();
    cluster.insert_artifact(artifact);
    cluster.insert(
        KubeNodeType::Pod,
        meta("postgres-1", "data", labels(&[]), vec![]),
    );

    let outcome = link_artifact(&cluster, "data", &name).await.unwrap();
    assert_eq!(outcome, LinkOutcome::Retry);
    assert_eq!(cluster.write_count(), 0);

    cluster.insert(
        KubeNodeType::Pod,
        meta("postgres-0", "data", labels(&[]), vec![]),
    );
    let outcome = link_artifact(&cluster, "data", &name).await.unwrap();
    assert_eq!(
        outcome,
        LinkOutcome::Linked {
            pod: "postgres-0".to_string(),
            uid: "uid-postgres-0".to_string(),
        }
    );
}
