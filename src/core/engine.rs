// src/core/engine.rs
use std::path::{Path, PathBuf};
use anyhow::{anyhow, Context, Result};
use tracing::{info, warn, debug};

use crate::config::Config;
use super::{
    BatchPipeline, CodeGraph, CodeGraphStats, PathEnumerator, LlmClient,
    RelationExtractor, ChainAuditor, SourceFile, render_path, scan_project, project_hash
};

/// Line written after every chain audit in the report
pub const REPORT_DELIMITER: &str = "--------------------------------";

/// Outcome of one audit run
#[derive(Debug, Clone)]
pub struct AuditSummary {
    pub project_hash: String,
    pub graph_path: PathBuf,
    pub report_path: PathBuf,
    pub files_scanned: usize,
    pub reused_checkpoint: bool,
    pub graph_stats: CodeGraphStats,
    pub paths_audited: usize,
}

/// Main orchestration engine: scan, extract, enumerate, audit
pub struct Engine {
    config: Config,
    llm_client: Option<Box<dyn LlmClient>>,
}

impl Engine {
    /// Create a new engine instance from a configuration file
    pub async fn new(config_path: Option<&Path>) -> Result<Self> {
        let config = Config::load_or_create(config_path)?;

        debug!("Loaded configuration: {:?}", config.redacted());

        let llm_client = match super::llm::create_client(&config.llm) {
            Ok(client) => {
                info!("LLM client ready: {} ({})", client.provider_name(), client.model_name());
                Some(client)
            }
            Err(e) => {
                warn!("LLM client unavailable: {}", e);
                None
            }
        };

        Ok(Self { config, llm_client })
    }

    /// Engine with an explicitly supplied completion client
    pub fn with_client(config: Config, client: Box<dyn LlmClient>) -> Self {
        Self {
            config,
            llm_client: Some(client),
        }
    }

    /// Write a default configuration file
    pub async fn init(&self, path: Option<PathBuf>) -> Result<()> {
        let path = path.unwrap_or_else(|| PathBuf::from("chainaudit.yaml"));
        if path.exists() {
            warn!("{} already exists, leaving it untouched", path.display());
            return Ok(());
        }
        Config::default().save(&path)?;
        info!("Wrote default configuration to {}", path.display());
        Ok(())
    }

    /// Full run over a project directory
    pub async fn audit(
        &self,
        project_dir: &Path,
        output_dir: &Path,
        batch_size: Option<usize>,
        force: bool,
    ) -> Result<AuditSummary> {
        let client = self.llm_client.as_deref().ok_or_else(|| {
            anyhow!("No LLM client configured; set llm.api_key or {}", crate::config::API_KEY_ENV)
        })?;
        let pipeline = BatchPipeline::new(batch_size.unwrap_or(self.config.pipeline.batch_size))?;

        std::fs::create_dir_all(output_dir)
            .with_context(|| format!("Failed to create output directory {}", output_dir.display()))?;

        // Step 1: Scan the project, leaving our own output out of it
        info!("Scanning {}", project_dir.display());
        let root = scan_project(project_dir, &self.config.project, Some(output_dir));
        let hash = project_hash(&root);
        info!("Project structure:\n{}", root.render_tree());
        info!("Project hash: {}", hash);

        let graph_path = output_dir.join(format!("{}.graph.json", hash));
        let report_path = output_dir.join(format!("{}_audit.log", hash));

        // Step 2: Build or reuse the dependency graph
        let reused_checkpoint = graph_path.exists() && !force;
        let graph = if reused_checkpoint {
            info!("Dependency graph checkpoint found, skipping extraction: {}", graph_path.display());
            CodeGraph::load(&graph_path)
                .with_context(|| format!("Failed to load graph {}", graph_path.display()))?
        } else {
            let files = root.files_breadth_first();
            info!("Extracting relationships from {} files", files.len());
            let graph = self.extract_graph(client, &files, &pipeline).await?;
            graph.save(&graph_path)?;
            info!("Dependency graph written to {}", graph_path.display());
            graph
        };

        let graph_stats = graph.stats();

        // Step 3: Audit every call chain
        let paths_audited = self.audit_graph(client, &graph, &pipeline, &report_path).await?;
        info!("Audit complete, report written to {}", report_path.display());

        Ok(AuditSummary {
            project_hash: hash,
            graph_path,
            report_path,
            files_scanned: root.file_count(),
            reused_checkpoint,
            graph_stats,
            paths_audited,
        })
    }

    /// Extract relationships for every file and fold them into one graph
    pub async fn extract_graph(
        &self,
        client: &dyn LlmClient,
        files: &[&SourceFile],
        pipeline: &BatchPipeline,
    ) -> Result<CodeGraph> {
        let extractor = RelationExtractor::new(client, self.config.pipeline.line_range_policy)?;

        let per_file = pipeline
            .run(files, |file| extractor.extract(file))
            .await
            .context("Relationship extraction failed")?;

        let units: Vec<_> = per_file.into_iter().flatten().flatten().collect();
        info!("Collected {} relationships", units.len());

        Ok(CodeGraph::build_from_units(&units))
    }

    /// Audit all enumerated chains, rewriting the report after every chunk
    pub async fn audit_graph(
        &self,
        client: &dyn LlmClient,
        graph: &CodeGraph,
        pipeline: &BatchPipeline,
        report_path: &Path,
    ) -> Result<usize> {
        let paths = PathEnumerator::new(self.config.pipeline.cover_unreached_nodes).enumerate(graph);
        let rendered = paths
            .iter()
            .map(|path| render_path(graph, path))
            .collect::<crate::error::Result<Vec<_>>>()?;
        info!("Auditing {} call chains", rendered.len());

        let auditor = ChainAuditor::new(client);
        let mut report = String::new();
        std::fs::write(report_path, &report)?;

        pipeline
            .run_with(
                &rendered,
                |chain| auditor.audit(chain),
                |_, replies| {
                    for reply in replies {
                        report.push_str(reply);
                        report.push('\n');
                        report.push_str(REPORT_DELIMITER);
                        report.push('\n');
                    }
                    std::fs::write(report_path, &report)?;
                    Ok(())
                },
            )
            .await
            .context("Chain audit failed")?;

        Ok(rendered.len())
    }

    /// Log the chains of a persisted graph without calling the service
    pub async fn list_paths(&self, graph_path: &Path) -> Result<usize> {
        let graph = CodeGraph::load(graph_path)
            .with_context(|| format!("Failed to load graph {}", graph_path.display()))?;
        let paths = PathEnumerator::new(self.config.pipeline.cover_unreached_nodes).enumerate(&graph);

        for (i, path) in paths.iter().enumerate() {
            info!("[{}] {}", i + 1, path.join(" -> "));
        }
        info!("{} call chains", paths.len());
        Ok(paths.len())
    }
}
