//! agent-discovery - publishes Pod ownership hierarchies for in-Pod agents
//!
//! Runs the backlink controller that attaches discovery ConfigMaps to their
//! Pods, and offers one-shot commands to inspect and publish hierarchies.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use agent_discovery::cli::{self, ConfigSubcommand};
use agent_discovery::config::ConfigLoader;
use agent_discovery::{controller, kube};

/// Publishes Pod ownership hierarchies as discovery ConfigMaps
#[derive(Parser, Debug)]
#[command(name = "agent-discovery", version)]
#[command(about = "Publishes Pod ownership hierarchies as discovery ConfigMaps", long_about = None)]
struct Args {
    /// Enable debug logging
    #[arg(long, short = 'd', global = true)]
    debug: bool,

    /// Configuration file (defaults to <config dir>/config.yaml)
    #[arg(long, short = 'c', global = true, env = "AGENT_DISCOVERY_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

/// Main commands
#[derive(Subcommand, Debug)]
enum Command {
    /// Run the backlink controller until interrupted
    Run,
    /// Print the discovery hierarchy and metadata of an existing Pod
    Hierarchy {
        /// Pod name
        pod: String,
        /// Pod namespace
        #[arg(long, short = 'n', default_value = "default")]
        namespace: String,
    },
    /// Build and create the discovery ConfigMap of an existing Pod
    Publish {
        /// Pod name
        pod: String,
        /// Pod namespace
        #[arg(long, short = 'n', default_value = "default")]
        namespace: String,
        /// Print the ConfigMap instead of creating it
        #[arg(long)]
        dry_run: bool,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        subcommand: ConfigSubcommand,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Config commands run before logging so a broken file can still be inspected
    let command = match args.command {
        Command::Config { subcommand } => {
            return cli::handle_config_command(subcommand, args.config.as_deref());
        }
        command => command,
    };

    let config =
        ConfigLoader::load(args.config.as_deref()).context("Failed to load configuration")?;
    cli::init_logging(args.debug, &config.logger.level)?;
    tracing::debug!(?config, "Configuration loaded");

    let client = kube::create_client().await?;

    match command {
        Command::Run => controller::run(client, &config).await,
        Command::Hierarchy { pod, namespace } => {
            cli::handle_hierarchy(client, &namespace, &pod).await
        }
        Command::Publish {
            pod,
            namespace,
            dry_run,
        } => cli::handle_publish(client, &namespace, &pod, dry_run).await,
        Command::Config { .. } => Ok(()),
    }
}
