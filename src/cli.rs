use clap::{Parser, Subcommand};
use std::path::PathBuf;
use anyhow::Result;
use tracing::info;

use crate::core::Engine;

#[derive(Parser)]
#[command(name = "chainaudit")]
#[command(about = "Audit call chains inferred from a source tree")]
#[command(version)]
pub struct Cli {
    /// Path to configuration file (YAML, or TOML by extension)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Directory for the rotating log file
    #[arg(long, global = true, default_value = "logs")]
    pub log_dir: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write a default configuration file
    Init {
        /// Target file (defaults to ./chainaudit.yaml)
        #[arg(short, long)]
        path: Option<PathBuf>,
    },

    /// Scan a project, build its dependency graph and audit every call chain
    Audit {
        /// Project directory to analyze
        #[arg(short, long)]
        dir: PathBuf,

        /// Output directory for the graph checkpoint and report
        #[arg(short, long, default_value = "./output")]
        output: PathBuf,

        /// Concurrent LLM calls per chunk (overrides pipeline.batch_size)
        #[arg(short, long)]
        batch_size: Option<usize>,

        /// Rebuild the dependency graph even if a checkpoint exists
        #[arg(long)]
        force: bool,
    },

    /// List the call chains of a saved dependency graph
    Paths {
        /// Graph checkpoint written by `audit`
        #[arg(short, long)]
        graph: PathBuf,
    },
}

impl Cli {
    pub async fn execute(self, engine: Engine) -> Result<()> {
        match self.command {
            Commands::Init { path } => {
                engine.init(path).await
            }
            Commands::Audit { dir, output, batch_size, force } => {
                let summary = engine.audit(&dir, &output, batch_size, force).await?;
                if summary.reused_checkpoint {
                    info!("Reused dependency graph {}", summary.graph_path.display());
                }
                let stats = &summary.graph_stats;
                info!(
                    "Graph: {} nodes, {} edges, {} sources, {} sinks",
                    stats.total_nodes, stats.total_edges, stats.sources, stats.sinks
                );
                info!(
                    "Audited {} call chains from {} files (project {}), see {}",
                    summary.paths_audited,
                    summary.files_scanned,
                    summary.project_hash,
                    summary.report_path.display()
                );
                Ok(())
            }
            Commands::Paths { graph } => {
                engine.list_paths(&graph).await.map(|_| ())
            }
        }
    }
}
