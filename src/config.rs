use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

use crate::error::{AuditError, Result};

/// Environment variable consulted when no api key is configured
pub const API_KEY_ENV: &str = "OPENAI_API_KEY";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// LLM provider (only OpenAI-compatible chat completion endpoints for now)
    pub provider: String,

    /// Base URL of the chat completion API, without the `/chat/completions` suffix
    pub base_url: String,

    /// API key; falls back to `OPENAI_API_KEY`
    #[serde(default)]
    pub api_key: Option<String>,

    /// Model name (e.g., "gpt-4o-mini")
    pub model: String,

    /// Maximum tokens for LLM responses
    pub max_tokens: u32,

    /// Temperature for LLM responses (0.0 to 1.0)
    #[serde(default)]
    pub temperature: Option<f32>,
}

impl LlmConfig {
    /// Configured key, or the one from the environment
    pub fn resolve_api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .filter(|key| !key.trim().is_empty())
            .or_else(|| std::env::var(API_KEY_ENV).ok())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectConfig {
    /// Source file extensions to analyze (with leading dot)
    pub source_file_ext: Vec<String>,

    /// Configuration file extensions to analyze (with leading dot)
    pub config_file_ext: Vec<String>,

    /// Path components that exclude a directory or file
    pub exclude_dir: Vec<String>,

    /// Files larger than this are skipped
    pub max_file_size_mb: f64,
}

/// What to do when the service reports a line range the file cannot satisfy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LineRangePolicy {
    /// Log and narrow the range to the single starting line
    #[default]
    Lenient,
    /// Fail the extraction like any other malformed record
    Strict,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Number of LLM calls in flight per chunk
    pub batch_size: usize,

    #[serde(default)]
    pub line_range_policy: LineRangePolicy,

    /// Emit a singleton path for every node no regular path reaches
    #[serde(default)]
    pub cover_unreached_nodes: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// LLM integration settings
    pub llm: LlmConfig,

    /// Project scanning configuration
    pub project: ProjectConfig,

    /// Batch pipeline and graph settings
    pub pipeline: PipelineConfig,
}

impl Default for Config {
    fn default() -> Self {
        let strings = |items: &[&str]| items.iter().map(|s| s.to_string()).collect::<Vec<_>>();

        Self {
            llm: LlmConfig {
                provider: "openai".to_string(),
                base_url: "https://api.openai.com/v1".to_string(),
                api_key: None,
                model: "gpt-4o-mini".to_string(),
                max_tokens: 4096,
                temperature: None,
            },
            project: ProjectConfig {
                source_file_ext: strings(&[
                    ".py", ".go", ".js", ".java", ".cpp", ".php", ".aspx", ".asp", ".c", ".cs",
                ]),
                config_file_ext: strings(&[
                    ".yaml", ".xml", ".json", ".conf", ".ini", ".toml", ".config", ".settings",
                ]),
                exclude_dir: strings(&[
                    "node_modules", "dist", "build", "out", "venv", ".venv", "env", "target",
                    "vendor", "bower_components", ".git", ".svn", ".hg", ".idea", ".vscode",
                    ".metadata", "nbproject", "test", "tests", "spec", "specs", "tmp", "temp",
                    "cache", "logs", "docker", "containers", "k8s", "kube", ".circleci",
                    ".github", ".travis", "docs", "doc", ".secrets", ".env",
                ]),
                max_file_size_mb: 1.0,
            },
            pipeline: PipelineConfig {
                batch_size: 10,
                line_range_policy: LineRangePolicy::Lenient,
                cover_unreached_nodes: false,
            },
        }
    }
}

fn is_toml(path: &Path) -> bool {
    path.extension().map_or(false, |ext| ext == "toml")
}

impl Config {
    /// Load configuration from file (YAML, or TOML by extension)
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let config: Config = if is_toml(path) {
            toml::from_str(&content).map_err(|e| AuditError::Config(e.to_string()))?
        } else {
            serde_yaml::from_str(&content).map_err(|e| AuditError::Config(e.to_string()))?
        };
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let content = if is_toml(path) {
            toml::to_string_pretty(self).map_err(|e| AuditError::Config(e.to_string()))?
        } else {
            serde_yaml::to_string(self).map_err(|e| AuditError::Config(e.to_string()))?
        };
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Load configuration, creating a default file at an explicit path that does not exist yet
    pub fn load_or_create<P: AsRef<Path>>(path: Option<P>) -> Result<Self> {
        match path {
            Some(p) => {
                let p = p.as_ref();
                if !p.exists() {
                    info!("Configuration file not found, creating default: {}", p.display());
                    Self::default().save(p)?;
                }
                Self::load(p)
            }
            None => {
                // Try common config file locations
                let candidates = ["chainaudit.yaml", "chainaudit.yml", "chainaudit.toml"];

                for candidate in &candidates {
                    if Path::new(candidate).exists() {
                        return Self::load(candidate);
                    }
                }

                Ok(Self::default())
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.pipeline.batch_size == 0 {
            return Err(AuditError::Config("pipeline.batch_size must be at least 1".to_string()));
        }
        if self.llm.model.trim().is_empty() {
            return Err(AuditError::Config("llm.model must not be empty".to_string()));
        }
        Ok(())
    }

    /// Copy suitable for logging, with the api key masked
    pub fn redacted(&self) -> Self {
        let mut copy = self.clone();
        if copy.llm.api_key.is_some() {
            copy.llm.api_key = Some("***".to_string());
        }
        copy
    }
}
