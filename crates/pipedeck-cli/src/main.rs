//! CLI binary for inspecting Pipedeck pipeline snapshots.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand, ValueEnum};
use pipedeck_graph::{load_snapshot, with_status, ModelConfig, PipelineGraphModel};
use pipedeck_types::{ConnectorKind, PipelineSummary};

#[derive(Parser)]
#[command(name = "pipedeck", version, about = "Inspect pipeline snapshots, statuses, and connector graphs")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Model configuration file (JSON)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the derived status of a pipeline snapshot
    Status {
        /// Path to the snapshot .json file
        snapshot: PathBuf,
    },

    /// Print the graph nodes of a pipeline snapshot
    Graph {
        /// Path to the snapshot .json file
        snapshot: PathBuf,

        /// Emit the nodes as JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// List pipelines from a pipeline list response with their status
    List {
        /// Path to a JSON array of pipelines
        pipelines: PathBuf,
    },

    /// Check whether a connector name would be accepted
    CheckName {
        /// Candidate name
        name: String,

        /// Snapshot holding the existing connectors
        #[arg(short, long)]
        snapshot: PathBuf,

        /// Treat the check as a rename of this connector id
        #[arg(long)]
        exclude: Option<String>,

        /// Kind of the new connector (ignored for renames)
        #[arg(long, value_enum, default_value = "stream")]
        kind: KindArg,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum KindArg {
    Source,
    Sink,
    Topic,
    Stream,
}

impl From<KindArg> for ConnectorKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Source => ConnectorKind::Source,
            KindArg::Sink => ConnectorKind::Sink,
            KindArg::Topic => ConnectorKind::Topic,
            KindArg::Stream => ConnectorKind::Stream,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup tracing
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let config = match &cli.config {
        Some(path) => ModelConfig::load(path)?,
        None => ModelConfig::default(),
    };

    match cli.command {
        Commands::Status { snapshot } => {
            cmd_status(&snapshot, config).await?;
        }
        Commands::Graph { snapshot, json } => {
            cmd_graph(&snapshot, config, json).await?;
        }
        Commands::List { pipelines } => {
            cmd_list(&pipelines)?;
        }
        Commands::CheckName {
            name,
            snapshot,
            exclude,
            kind,
        } => {
            cmd_check_name(&name, &snapshot, exclude.as_deref(), kind.into(), config).await?;
        }
    }

    Ok(())
}

async fn load_model(path: &Path, config: ModelConfig) -> anyhow::Result<PipelineGraphModel> {
    let snapshot = load_snapshot(path).await?;
    tracing::debug!(
        pipeline_id = %snapshot.pipeline_id,
        fetched_at = %snapshot.fetched_at,
        connectors = snapshot.connectors.len(),
        "Loaded snapshot"
    );
    Ok(snapshot.into_model(config))
}

async fn cmd_status(path: &Path, config: ModelConfig) -> anyhow::Result<()> {
    let model = load_model(path, config).await?;

    println!("Pipeline: {} ({})", model.pipeline_name(), model.pipeline_id());
    println!("Status: {}", model.status());
    println!("Connectors: {}", model.len());

    let failed: Vec<_> = model
        .objects()
        .iter()
        .filter(|c| c.state == pipedeck_types::ConnectorState::Failed)
        .map(|c| c.name.as_str())
        .collect();
    if !failed.is_empty() {
        println!("Failed: {}", failed.join(", "));
    }
    Ok(())
}

async fn cmd_graph(path: &Path, config: ModelConfig, json: bool) -> anyhow::Result<()> {
    let model = load_model(path, config).await?;
    let nodes = model.graph_nodes();

    if json {
        println!("{}", serde_json::to_string_pretty(&nodes)?);
        return Ok(());
    }

    println!("Pipeline: {} [{}]", model.pipeline_name(), model.status());
    for node in &nodes {
        let marker = if node.is_active { "*" } else { " " };
        let alert = if node.status_icon.is_none() {
            String::new()
        } else {
            format!(" {}", node.status_icon.as_class())
        };
        println!(
            "{} {} [{}] kind={} state={} icon={}{}",
            marker,
            node.id,
            node.name,
            node.kind,
            node.state,
            node.icon.as_class(),
            alert
        );
    }
    Ok(())
}

fn cmd_list(path: &Path) -> anyhow::Result<()> {
    let data = std::fs::read_to_string(path)?;
    let pipelines: Vec<PipelineSummary> = serde_json::from_str(&data)?;

    for entry in with_status(pipelines) {
        println!(
            "{:<24} {:<8} {} connector(s)",
            entry.pipeline.name,
            entry.status.to_string(),
            entry.pipeline.objects.len()
        );
    }
    Ok(())
}

async fn cmd_check_name(
    name: &str,
    path: &Path,
    exclude: Option<&str>,
    kind: ConnectorKind,
    config: ModelConfig,
) -> anyhow::Result<()> {
    let model = load_model(path, config).await?;
    let verdict = match exclude {
        Some(id) => model.check_rename(id, name),
        None => model.check_add(name, kind),
    };

    match verdict {
        Ok(()) => {
            println!("'{}' is available", name);
            Ok(())
        }
        Err(err) if err.is_validation() => {
            println!("{}", err);
            std::process::exit(1);
        }
        Err(err) => Err(err.into()),
    }
}
