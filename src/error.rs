use thiserror::Error;

/// Main error type for chainaudit operations
#[derive(Error, Debug)]
pub enum AuditError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("LLM error: {0}")]
    Llm(String),

    /// The extraction reply carried neither the sentinel nor a delimited block
    #[error("Malformed response: no {tag} block found or block is not closed")]
    MalformedResponse { tag: String, response: String },

    #[error("Malformed record '{line}': expected 4 <SEP> fields, found {fields}")]
    MalformedRecord { line: String, fields: usize },

    #[error("Malformed line range '{range}' in record '{line}'")]
    MalformedLineRange { range: String, line: String },

    #[error("Invalid line range {start}-{end} for a source of {total} lines")]
    InvalidLineRange { start: usize, end: usize, total: usize },

    #[error("Graph node not found: {0}")]
    MissingNode(String),
}

pub type Result<T> = std::result::Result<T, AuditError>;
