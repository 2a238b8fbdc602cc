//! LLM integration for relationship extraction and chain auditing
//!
//! The completion service is reached only through the [`LlmClient`] trait,
//! which is handed explicitly to the agents that need it.

mod agents;
mod client;
mod prompts;

#[cfg(test)]
pub(crate) mod fake;

pub use agents::{RelationExtractor, ChainAuditor};
pub use client::{LlmClient, create_client};
pub use prompts::{RELATION_EXTRACTION_PROMPT, CHAIN_AUDIT_PROMPT};
