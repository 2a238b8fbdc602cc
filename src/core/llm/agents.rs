use tracing::debug;

use crate::config::LineRangePolicy;
use crate::error::Result;
use super::super::call_graph::{CodeUnit, CodeUnitParser};
use super::super::scanner::SourceFile;
use super::{LlmClient, RELATION_EXTRACTION_PROMPT, CHAIN_AUDIT_PROMPT};

/// Asks the service which code units of a file call which
pub struct RelationExtractor<'a> {
    client: &'a dyn LlmClient,
    parser: CodeUnitParser,
}

impl<'a> RelationExtractor<'a> {
    pub fn new(client: &'a dyn LlmClient, line_range_policy: LineRangePolicy) -> Result<Self> {
        Ok(Self {
            client,
            parser: CodeUnitParser::new(line_range_policy)?,
        })
    }

    /// `None` when the service reports nothing worth graphing for the file
    pub async fn extract(&self, file: &SourceFile) -> Result<Option<Vec<CodeUnit>>> {
        let response = self.client.complete(RELATION_EXTRACTION_PROMPT, &file.source_code).await?;
        let units = self.parser.parse(&file.source_code, &file.path, &file.name, &response)?;

        debug!(
            "{}: {} relationships",
            file.path.display(),
            units.as_ref().map_or(0, Vec::len)
        );
        Ok(units)
    }
}

/// Asks the service for an audit of one rendered call chain
pub struct ChainAuditor<'a> {
    client: &'a dyn LlmClient,
}

impl<'a> ChainAuditor<'a> {
    pub fn new(client: &'a dyn LlmClient) -> Self {
        Self { client }
    }

    /// The reply is returned verbatim
    pub async fn audit(&self, rendered_chain: &str) -> Result<String> {
        self.client.complete(CHAIN_AUDIT_PROMPT, rendered_chain).await
    }
}
