// src/core/call_graph/path_enumerator.rs
use std::collections::HashSet;
use tracing::debug;

use super::CodeGraph;

/// Ordered, cycle-free sequence of node keys
pub type CallPath = Vec<String>;

/// Enumerates maximal call chains from caller-less nodes to callee-less nodes.
///
/// Start nodes are visited in node insertion order and callees in edge
/// insertion order, so the output is deterministic for a given graph.
pub struct PathEnumerator {
    /// Emit a singleton path for nodes no chain reaches
    cover_unreached: bool,
}

impl PathEnumerator {
    pub fn new(cover_unreached: bool) -> Self {
        Self { cover_unreached }
    }

    pub fn enumerate(&self, graph: &CodeGraph) -> Vec<CallPath> {
        let mut paths = Vec::new();

        for start in graph.node_keys().filter(|key| graph.in_degree(key) == 0) {
            if graph.out_degree(start) > 0 {
                Self::walk_from(graph, start, &mut paths);
            } else {
                paths.push(vec![start.to_string()]);
            }
        }

        if self.cover_unreached {
            let covered: HashSet<&str> = paths.iter().flatten().map(String::as_str).collect();
            let unreached: Vec<CallPath> = graph
                .node_keys()
                .filter(|key| !covered.contains(key))
                .map(|key| vec![key.to_string()])
                .collect();

            if !unreached.is_empty() {
                debug!("Adding {} singleton paths for unreached nodes", unreached.len());
            }
            paths.extend(unreached);
        }

        paths
    }

    /// Depth-first walk with an explicit stack; a node never repeats within one path
    fn walk_from(graph: &CodeGraph, start: &str, paths: &mut Vec<CallPath>) {
        let mut path: Vec<&str> = vec![start];
        let mut on_path: HashSet<&str> = HashSet::from([start]);
        // Next callee index to try, one per path entry
        let mut cursors: Vec<usize> = vec![0];

        loop {
            let (Some(&current), Some(cursor)) = (path.last(), cursors.last_mut()) else {
                break;
            };

            let callees = graph.callees(current);
            if callees.is_empty() {
                paths.push(path.iter().map(|key| key.to_string()).collect());
            } else if *cursor < callees.len() {
                let next = callees[*cursor].as_str();
                *cursor += 1;
                if on_path.insert(next) {
                    path.push(next);
                    cursors.push(0);
                }
                continue;
            }

            // Sink reached or callees exhausted
            if let Some(done) = path.pop() {
                on_path.remove(done);
            }
            cursors.pop();
        }
    }
}

impl Default for PathEnumerator {
    fn default() -> Self {
        Self::new(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::super::graph::GraphNode;

    fn bare_node(key: &str) -> GraphNode {
        let (file, name) = key.split_once('|').unwrap_or(("", key));
        GraphNode {
            source_code: String::new(),
            desc: String::new(),
            start_code_line: 1,
            end_code_line: 1,
            name: file.to_string(),
            path: format!("/p/{}", file).into(),
            source_name: name.to_string(),
            target_name: String::new(),
            defined_as_source: true,
        }
    }

    fn graph(nodes: &[&str], edges: &[(&str, &str)]) -> CodeGraph {
        let mut graph = CodeGraph::new();
        for key in nodes {
            graph.insert_node(key.to_string(), bare_node(key));
        }
        for (from, to) in edges {
            graph.add_edge(from.to_string(), to.to_string());
        }
        graph
    }

    fn keys(paths: &[CallPath]) -> Vec<Vec<&str>> {
        paths.iter().map(|p| p.iter().map(String::as_str).collect()).collect()
    }

    #[test]
    fn test_chain_and_isolated_node() {
        let g = graph(&["f|A", "f|B", "f|C", "g|D"], &[("f|A", "f|B"), ("f|B", "f|C")]);

        let paths = PathEnumerator::default().enumerate(&g);
        assert_eq!(keys(&paths), vec![vec!["f|A", "f|B", "f|C"], vec!["g|D"]]);
    }

    #[test]
    fn test_branches_in_insertion_order() {
        let g = graph(
            &["f|A", "f|B", "f|C", "f|D"],
            &[("f|A", "f|C"), ("f|A", "f|B"), ("f|B", "f|D")],
        );

        let paths = PathEnumerator::default().enumerate(&g);
        assert_eq!(keys(&paths), vec![vec!["f|A", "f|C"], vec!["f|A", "f|B", "f|D"]]);
    }

    #[test]
    fn test_cycle_terminates_with_distinct_nodes() {
        // S -> A -> B -> A (cycle), B -> T
        let g = graph(
            &["f|S", "f|A", "f|B", "f|T"],
            &[("f|S", "f|A"), ("f|A", "f|B"), ("f|B", "f|A"), ("f|B", "f|T")],
        );

        let paths = PathEnumerator::default().enumerate(&g);
        assert_eq!(keys(&paths), vec![vec!["f|S", "f|A", "f|B", "f|T"]]);
        for path in &paths {
            let unique: HashSet<&String> = path.iter().collect();
            assert_eq!(unique.len(), path.len());
        }
    }

    #[test]
    fn test_cycle_without_exit_emits_nothing_for_it() {
        let g = graph(&["f|S", "f|A", "f|B"], &[("f|S", "f|A"), ("f|A", "f|B"), ("f|B", "f|A")]);

        assert!(PathEnumerator::default().enumerate(&g).is_empty());
    }

    #[test]
    fn test_cycle_only_nodes_need_coverage_pass() {
        // X <-> Y with no caller-less ancestor, plus an unrelated isolated node
        let g = graph(&["f|X", "f|Y", "g|D"], &[("f|X", "f|Y"), ("f|Y", "f|X")]);

        let plain = PathEnumerator::new(false).enumerate(&g);
        assert_eq!(keys(&plain), vec![vec!["g|D"]]);

        let covered = PathEnumerator::new(true).enumerate(&g);
        assert_eq!(keys(&covered), vec![vec!["g|D"], vec!["f|X"], vec!["f|Y"]]);
    }

    #[test]
    fn test_every_source_starts_a_path() {
        let g = graph(
            &["f|A", "f|B", "f|C", "f|D", "g|E"],
            &[("f|A", "f|C"), ("f|B", "f|C"), ("f|C", "f|D")],
        );

        let paths = PathEnumerator::default().enumerate(&g);
        for key in g.node_keys().filter(|k| g.in_degree(k) == 0) {
            assert!(paths.iter().any(|p| p[0] == key), "{key} starts no path");
        }
        assert!(paths.contains(&vec!["g|E".to_string()]));
    }

    #[test]
    fn test_diamond_yields_both_routes() {
        let g = graph(
            &["f|A", "f|B", "f|C", "f|D"],
            &[("f|A", "f|B"), ("f|A", "f|C"), ("f|B", "f|D"), ("f|C", "f|D")],
        );

        let paths = PathEnumerator::default().enumerate(&g);
        assert_eq!(
            keys(&paths),
            vec![vec!["f|A", "f|B", "f|D"], vec!["f|A", "f|C", "f|D"]]
        );
    }

    #[test]
    fn test_deep_chain_does_not_overflow() {
        let names: Vec<String> = (0..50_000).map(|i| format!("f|n{}", i)).collect();
        let refs: Vec<&str> = names.iter().map(String::as_str).collect();
        let edges: Vec<(&str, &str)> = refs.windows(2).map(|w| (w[0], w[1])).collect();
        let g = graph(&refs, &edges);

        let paths = PathEnumerator::default().enumerate(&g);
        assert_eq!(paths.len(), 1);
        assert_eq!(paths[0].len(), 50_000);
    }
}
