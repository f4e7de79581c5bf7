//! CLI command handlers

use std::path::Path;

use anyhow::{Context, Result};
use clap::Subcommand;
use k8s_openapi::api::core::v1::Pod;
use kube::{Api, Client};

use crate::config::{ConfigLoader, get_config_value, paths};
use crate::discovery::{build_hierarchy, extract_pod_metadata, publish_artifact, write_artifact};
use crate::kube::KubeStore;

/// Configuration management subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigSubcommand {
    /// Get configuration value, or the whole configuration
    Get {
        /// Configuration key (e.g., "namespace", "controller.workers")
        key: Option<String>,
    },
    /// Show configuration file path
    Path,
    /// Validate configuration
    Validate,
}

/// Handle configuration subcommands
pub fn handle_config_command(cmd: ConfigSubcommand, config_path: Option<&Path>) -> Result<()> {
    match cmd {
        ConfigSubcommand::Get { key } => {
            let config = ConfigLoader::load(config_path).context("Failed to load configuration")?;

            if let Some(key) = key {
                let value = get_config_value(&config, &key)?;
                println!("{}", value);
            } else {
                let yaml =
                    serde_yaml::to_string(&config).context("Failed to serialize configuration")?;
                print!("{}", yaml);
            }
        }
        ConfigSubcommand::Path => {
            let path = config_path
                .map(Path::to_path_buf)
                .unwrap_or_else(paths::root_config_path);
            println!("{}", path.display());
        }
        ConfigSubcommand::Validate => match ConfigLoader::validate(config_path) {
            Ok(()) => println!("Configuration is valid"),
            Err(e) => {
                eprintln!("Configuration validation failed: {:#}", e);
                std::process::exit(1);
            }
        },
    }

    Ok(())
}

async fn fetch_pod(client: Client, namespace: &str, name: &str) -> Result<Pod> {
    let pods: Api<Pod> = Api::namespaced(client, namespace);
    pods.get_opt(name)
        .await
        .with_context(|| format!("Failed to read Pod {}/{}", namespace, name))?
        .ok_or_else(|| anyhow::anyhow!("Pod {}/{} not found", namespace, name))
}

/// Print the hierarchy and metadata documents for an existing Pod
pub async fn handle_hierarchy(client: Client, namespace: &str, pod_name: &str) -> Result<()> {
    let pod = fetch_pod(client.clone(), namespace, pod_name).await?;
    let store = KubeStore::new(client);

    let hierarchy = build_hierarchy(&store, &pod)
        .await
        .with_context(|| format!("Failed to build hierarchy for Pod {}", pod_name))?;
    let metadata = extract_pod_metadata(&pod);

    println!("{}", serde_json::to_string_pretty(&hierarchy)?);
    println!("{}", serde_json::to_string_pretty(&metadata)?);
    Ok(())
}

/// Build the discovery ConfigMap for an existing Pod and create it, or print
/// it as YAML when `dry_run` is set
pub async fn handle_publish(
    client: Client,
    namespace: &str,
    pod_name: &str,
    dry_run: bool,
) -> Result<()> {
    let pod = fetch_pod(client.clone(), namespace, pod_name).await?;
    let store = KubeStore::new(client);

    if dry_run {
        let artifact = write_artifact(&store, &pod)
            .await
            .with_context(|| format!("Failed to build discovery ConfigMap for {}", pod_name))?;
        print!("{}", serde_yaml::to_string(&artifact)?);
        return Ok(());
    }

    let created = publish_artifact(&store, &pod)
        .await
        .with_context(|| format!("Failed to publish discovery ConfigMap for {}", pod_name))?;
    println!(
        "configmap/{} created",
        created.metadata.name.unwrap_or_default()
    );
    Ok(())
}
