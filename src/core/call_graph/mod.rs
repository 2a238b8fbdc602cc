// src/core/call_graph/mod.rs
//! Call graph construction and call-chain enumeration
//!
//! Relationship replies are parsed into [`CodeUnit`]s, folded into a
//! [`CodeGraph`], and walked into caller-to-sink chains that are rendered
//! for auditing.

mod code_unit;
mod graph;
mod path_enumerator;
mod path_renderer;

pub use code_unit::{CodeUnit, CodeUnitParser, number_lines};
pub use graph::{CodeGraph, CodeGraphStats};
pub use path_enumerator::PathEnumerator;
pub use path_renderer::render_path;
