// src/core/call_graph/code_unit.rs
use std::path::{Path, PathBuf};
use regex::Regex;
use serde::{Serialize, Deserialize};
use tracing::warn;

use crate::config::LineRangePolicy;
use crate::error::{AuditError, Result};

/// Reply text meaning "this file calls nothing worth graphing"
pub const NO_DATA_SENTINEL: &str = "NO_DATA_FOUND";

/// Tag delimiting the record block in an extraction reply
pub const OUTPUT_UNIT_TAG: &str = "<OUTPUT_UNIT>";

/// Field separator inside a record
pub const FIELD_SEPARATOR: &str = "<SEP>";

/// One caller -> callee relationship asserted for a single file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeUnit {
    /// File path
    pub path: PathBuf,
    /// File name
    pub name: String,
    /// Calling unit, local to the file
    pub source_name: String,
    /// Called unit, local to the file (may be empty)
    pub target_name: String,
    /// Summary of what the calling unit does
    pub source_desc: String,
    /// 1-based inclusive line range of the calling unit
    pub start_code_line: usize,
    pub end_code_line: usize,
    /// Numbered source lines covered by the range
    pub source_code: String,
}

/// Parses the delimited record block produced by the relationship extraction call
pub struct CodeUnitParser {
    block_pattern: Regex,
    line_range_policy: LineRangePolicy,
}

impl CodeUnitParser {
    pub fn new(line_range_policy: LineRangePolicy) -> Result<Self> {
        // The closing tag is accepted with or without a slash
        let block_pattern = Regex::new(r"(?s)<OUTPUT_UNIT>(.*?)</?OUTPUT_UNIT>")
            .map_err(|e| AuditError::Config(format!("Invalid block pattern: {}", e)))?;

        Ok(Self {
            block_pattern,
            line_range_policy,
        })
    }

    /// Turn an extraction reply into code units.
    ///
    /// `numbered_source` is the line-numbered text that was sent to the service.
    /// Returns `Ok(None)` for the no-data sentinel or an empty block.
    pub fn parse(
        &self,
        numbered_source: &str,
        path: &Path,
        name: &str,
        response: &str,
    ) -> Result<Option<Vec<CodeUnit>>> {
        if response.replace('\n', "").contains(NO_DATA_SENTINEL) {
            return Ok(None);
        }

        let captures = self.block_pattern.captures(response).ok_or_else(|| {
            AuditError::MalformedResponse {
                tag: OUTPUT_UNIT_TAG.to_string(),
                response: response.to_string(),
            }
        })?;

        let content = captures.get(1).map_or("", |m| m.as_str()).trim();
        if content.is_empty() {
            return Ok(None);
        }

        let source_lines: Vec<&str> = numbered_source.lines().collect();
        let mut units = Vec::new();

        // Every line is a record, blank ones included
        for line in content.lines() {
            units.push(self.parse_record(line.trim(), &source_lines, path, name)?);
        }

        Ok(Some(units))
    }

    fn parse_record(
        &self,
        line: &str,
        source_lines: &[&str],
        path: &Path,
        name: &str,
    ) -> Result<CodeUnit> {
        let fields: Vec<&str> = line.split(FIELD_SEPARATOR).collect();
        if fields.len() != 4 {
            return Err(AuditError::MalformedRecord {
                line: line.to_string(),
                fields: fields.len(),
            });
        }

        let (start, end) = parse_line_range(fields[3], line)?;
        let (start_code_line, end_code_line, source_code) =
            match excerpt_lines(source_lines, start, end) {
                Some(code) => (start, end, code),
                None => self.recover_range(source_lines, start, end, path)?,
            };

        Ok(CodeUnit {
            path: path.to_path_buf(),
            name: name.to_string(),
            source_name: fields[0].trim().to_string(),
            target_name: fields[1].trim().to_string(),
            source_desc: fields[2].trim().to_string(),
            start_code_line,
            end_code_line,
            source_code,
        })
    }

    fn recover_range(
        &self,
        source_lines: &[&str],
        start: usize,
        end: usize,
        path: &Path,
    ) -> Result<(usize, usize, String)> {
        match self.line_range_policy {
            LineRangePolicy::Strict => Err(AuditError::InvalidLineRange {
                start,
                end,
                total: source_lines.len(),
            }),
            LineRangePolicy::Lenient => {
                warn!(
                    "Invalid line range {}-{} in {} ({} lines), narrowing to line {}",
                    start,
                    end,
                    path.display(),
                    source_lines.len(),
                    start.max(1)
                );
                let line = start.max(1);
                let code = excerpt_lines(source_lines, line, line).unwrap_or_default();
                Ok((line, line, code))
            }
        }
    }
}

/// Split `"<start>-<end>"` into two integers
fn parse_line_range(range: &str, line: &str) -> Result<(usize, usize)> {
    let malformed = || AuditError::MalformedLineRange {
        range: range.trim().to_string(),
        line: line.to_string(),
    };

    let bounds: Vec<&str> = range.trim().split('-').collect();
    if bounds.len() != 2 {
        return Err(malformed());
    }

    let start = bounds[0].trim().parse::<usize>().map_err(|_| malformed())?;
    let end = bounds[1].trim().parse::<usize>().map_err(|_| malformed())?;
    Ok((start, end))
}

/// Lines `start..=end` (1-based), or `None` when the range is out of bounds or inverted
pub fn excerpt_lines(lines: &[&str], start: usize, end: usize) -> Option<String> {
    if start < 1 || end > lines.len() || start > end {
        return None;
    }
    Some(lines[start - 1..end].join("\n"))
}

/// Prefix every line with its right-aligned 1-based number: `" 9: text"`
pub fn number_lines(text: &str) -> String {
    let lines: Vec<&str> = text.lines().collect();
    let width = lines.len().to_string().len();

    lines
        .iter()
        .enumerate()
        .map(|(i, line)| format!("{:>width$}: {}", i + 1, line, width = width))
        .collect::<Vec<_>>()
        .join("\n")
}
