// src/core/call_graph/path_renderer.rs
use crate::error::{AuditError, Result};
use super::CodeGraph;

/// Render a call chain into the text submitted for auditing.
///
/// Each node becomes one `<step_N>` section holding its file, the calling and
/// called unit names, the calling unit's source excerpt, and its summary.
pub fn render_path(graph: &CodeGraph, path: &[String]) -> Result<String> {
    let mut steps = Vec::with_capacity(path.len());

    for (index, key) in path.iter().enumerate() {
        let node = graph
            .node(key)
            .ok_or_else(|| AuditError::MissingNode(key.clone()))?;

        let step = format!(
            "<step_{index}>\n\
             file path: {}\n\
             file name: {}\n\
             calling unit: {}\n\
             called unit: {}\n\
             source code:\n{}\n\
             summary: {}\n\
             </step_{index}>",
            node.path.display(),
            node.name,
            node.source_name,
            node.target_name,
            node.source_code,
            node.desc,
        );
        steps.push(step);
    }

    Ok(steps.join("\n"))
}
