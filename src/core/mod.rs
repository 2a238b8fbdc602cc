// src/core/mod.rs
mod engine;
mod batch_pipeline;
mod scanner;
mod llm;

// Dependency graph and call-chain enumeration
mod call_graph;

pub use batch_pipeline::BatchPipeline;
pub use scanner::{SourceFile, scan_project, project_hash};
pub use llm::{LlmClient, RelationExtractor, ChainAuditor};

pub use call_graph::{CodeGraph, CodeGraphStats, PathEnumerator, render_path};

// Export the main engine
pub use engine::Engine;
