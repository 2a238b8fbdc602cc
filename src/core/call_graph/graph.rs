// src/core/call_graph/graph.rs
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use indexmap::{IndexMap, IndexSet};
use serde::{Serialize, Deserialize};

use crate::error::Result;
use super::CodeUnit;

/// Graph key for a unit: `<file_name>|<unit_name>`
pub fn node_key(file_name: &str, unit_name: &str) -> String {
    format!("{}|{}", file_name, unit_name)
}

/// Node in the call graph representing one code unit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphNode {
    pub source_code: String,
    pub desc: String,
    pub start_code_line: usize,
    pub end_code_line: usize,
    /// File name
    pub name: String,
    /// File path
    pub path: PathBuf,
    /// Raw names carried from the unit that introduced the node
    pub source_name: String,
    pub target_name: String,
    /// False while the node is only known as somebody's callee
    pub defined_as_source: bool,
}

impl GraphNode {
    fn from_unit(unit: &CodeUnit, defined_as_source: bool) -> Self {
        Self {
            source_code: unit.source_code.clone(),
            desc: unit.source_desc.clone(),
            start_code_line: unit.start_code_line,
            end_code_line: unit.end_code_line,
            name: unit.name.clone(),
            path: unit.path.clone(),
            source_name: unit.source_name.clone(),
            target_name: unit.target_name.clone(),
            defined_as_source,
        }
    }
}

/// Directed caller -> callee edge
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CallEdge {
    pub caller: String,
    pub callee: String,
}

/// Directed graph of code units. Nodes and edges keep insertion order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CodeGraph {
    nodes: IndexMap<String, GraphNode>,
    edges: IndexSet<CallEdge>,
    /// Adjacency list for efficient traversal
    #[serde(skip)]
    adjacency_list: HashMap<String, Vec<String>>,
    #[serde(skip)]
    in_degrees: HashMap<String, usize>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeGraphStats {
    pub total_nodes: usize,
    pub total_edges: usize,
    /// Nodes nobody calls
    pub sources: usize,
    /// Nodes that call nothing
    pub sinks: usize,
}

impl CodeGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold code units into one graph
    pub fn build_from_units(units: &[CodeUnit]) -> Self {
        let mut graph = Self::new();
        for unit in units {
            graph.add_unit(unit);
        }
        graph
    }

    /// Add the unit's caller and callee nodes and the edge between them
    pub fn add_unit(&mut self, unit: &CodeUnit) {
        let source_key = node_key(&unit.name, &unit.source_name);
        let target_key = node_key(&unit.name, &unit.target_name);

        match self.nodes.get_mut(&source_key) {
            Some(existing) if !existing.defined_as_source => {
                *existing = GraphNode::from_unit(unit, true);
            }
            Some(_) => {}
            None => {
                self.nodes.insert(source_key.clone(), GraphNode::from_unit(unit, true));
            }
        }

        self.insert_node(target_key.clone(), GraphNode::from_unit(unit, false));
        self.add_edge(source_key, target_key);
    }

    /// Insert a node unless the key exists; returns false for an existing key
    pub fn insert_node(&mut self, key: String, node: GraphNode) -> bool {
        if self.nodes.contains_key(&key) {
            return false;
        }
        self.nodes.insert(key, node);
        true
    }

    /// Returns false when the edge was already present
    pub fn add_edge(&mut self, caller: String, callee: String) -> bool {
        let edge = CallEdge { caller, callee };
        if self.edges.contains(&edge) {
            return false;
        }

        self.adjacency_list
            .entry(edge.caller.clone())
            .or_default()
            .push(edge.callee.clone());
        *self.in_degrees.entry(edge.callee.clone()).or_default() += 1;
        self.edges.insert(edge);
        true
    }

    pub fn node(&self, key: &str) -> Option<&GraphNode> {
        self.nodes.get(key)
    }

    /// Node keys in insertion order
    pub fn node_keys(&self) -> impl Iterator<Item = &str> {
        self.nodes.keys().map(String::as_str)
    }

    /// Callees in edge insertion order
    pub fn callees(&self, key: &str) -> &[String] {
        self.adjacency_list.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn in_degree(&self, key: &str) -> usize {
        self.in_degrees.get(key).copied().unwrap_or(0)
    }

    pub fn out_degree(&self, key: &str) -> usize {
        self.callees(key).len()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn stats(&self) -> CodeGraphStats {
        CodeGraphStats {
            total_nodes: self.node_count(),
            total_edges: self.edge_count(),
            sources: self.node_keys().filter(|k| self.in_degree(k) == 0).count(),
            sinks: self.node_keys().filter(|k| self.out_degree(k) == 0).count(),
        }
    }

    /// Persist nodes and edges as JSON
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Load a persisted graph and rebuild its adjacency indexes
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let mut graph: CodeGraph = serde_json::from_str(&content)?;
        graph.build_adjacency_lists();
        Ok(graph)
    }

    fn build_adjacency_lists(&mut self) {
        self.adjacency_list.clear();
        self.in_degrees.clear();

        for edge in &self.edges {
            self.adjacency_list
                .entry(edge.caller.clone())
                .or_default()
                .push(edge.callee.clone());
            *self.in_degrees.entry(edge.callee.clone()).or_default() += 1;
        }
    }
}
