use async_trait::async_trait;
use serde_json::json;
use tracing::debug;

use crate::config::LlmConfig;
use crate::error::{AuditError, Result};

/// Text completion capability shared by the extraction and audit agents
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Send a system instruction plus a user body, returning the completion text
    async fn complete(&self, system: &str, user: &str) -> Result<String>;

    /// Get the provider name (e.g., "OpenAI-compatible")
    fn provider_name(&self) -> &str;

    /// Get the model name being used
    fn model_name(&self) -> &str;
}

/// Factory function to create the appropriate client based on config
pub fn create_client(config: &LlmConfig) -> Result<Box<dyn LlmClient>> {
    match config.provider.as_str() {
        "openai" => Ok(Box::new(OpenAiClient::new(config)?)),
        _ => Err(AuditError::Config(
            format!("Unsupported LLM provider: {}", config.provider)
        )),
    }
}

/// Client for any OpenAI-compatible chat completion endpoint
pub struct OpenAiClient {
    config: LlmConfig,
    api_key: String,
    client: reqwest::Client,
}

impl OpenAiClient {
    pub fn new(config: &LlmConfig) -> Result<Self> {
        let api_key = config.resolve_api_key().ok_or_else(|| {
            AuditError::Config(format!(
                "API key required: set llm.api_key or {}",
                crate::config::API_KEY_ENV
            ))
        })?;

        Ok(Self {
            config: config.clone(),
            api_key,
            client: reqwest::Client::new(),
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.config.base_url.trim_end_matches('/'))
    }

    fn build_payload(&self, system: &str, user: &str) -> serde_json::Value {
        let mut payload = json!({
            "model": self.config.model,
            "messages": [
                { "role": "system", "content": system },
                { "role": "user", "content": user }
            ],
            "max_tokens": self.config.max_tokens,
        });
        if let Some(temperature) = self.config.temperature {
            payload["temperature"] = json!(temperature);
        }
        payload
    }
}

#[async_trait]
impl LlmClient for OpenAiClient {
    async fn complete(&self, system: &str, user: &str) -> Result<String> {
        let payload = self.build_payload(system, user);

        debug!("POST {} ({} chars of user content)", self.endpoint(), user.len());
        let response = self
            .client
            .post(self.endpoint())
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&payload)
            .send()
            .await
            .map_err(|e| AuditError::Llm(format!("Chat completion request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(AuditError::Llm(format!("API error {}: {}", status, error_text)));
        }

        let response_data: serde_json::Value = response
            .json()
            .await
            .map_err(|e| AuditError::Llm(format!("Failed to parse completion response: {}", e)))?;

        extract_content(&response_data)
    }

    fn provider_name(&self) -> &str {
        "OpenAI-compatible"
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }
}

/// First choice's message content
fn extract_content(response: &serde_json::Value) -> Result<String> {
    response["choices"][0]["message"]["content"]
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| AuditError::Llm("No response content in completion choices".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    fn config_with_key() -> LlmConfig {
        let mut config = Config::default().llm;
        config.api_key = Some("sk-test".to_string());
        config.base_url = "http://localhost:9999/v1/".to_string();
        config
    }

    #[test]
    fn test_unknown_provider_rejected() {
        let mut config = config_with_key();
        config.provider = "carrier-pigeon".to_string();
        assert!(matches!(create_client(&config), Err(AuditError::Config(_))));
    }

    #[test]
    fn test_payload_and_endpoint() {
        let mut config = config_with_key();
        config.temperature = Some(0.2);
        let client = OpenAiClient::new(&config).unwrap();

        assert_eq!(client.endpoint(), "http://localhost:9999/v1/chat/completions");
        let payload = client.build_payload("sys", "usr");
        assert_eq!(payload["messages"][0]["role"], "system");
        assert_eq!(payload["messages"][1]["content"], "usr");
        assert_eq!(payload["max_tokens"], 4096);
        assert!(payload["temperature"].is_number());
        assert_eq!(client.model_name(), "gpt-4o-mini");
    }

    #[test]
    fn test_extract_content() {
        let ok = json!({"choices": [{"message": {"content": "hello"}}]});
        assert_eq!(extract_content(&ok).unwrap(), "hello");

        let empty = json!({"choices": []});
        assert!(matches!(extract_content(&empty), Err(AuditError::Llm(_))));
    }
}
