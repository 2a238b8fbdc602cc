//! Scripted client for tests

use std::sync::Mutex;
use async_trait::async_trait;

use crate::error::{AuditError, Result};
use super::LlmClient;

/// Replies with the first scripted answer whose trigger occurs in the user text
pub struct ScriptedClient {
    rules: Vec<(String, Result<String>)>,
    fallback: Option<String>,
    log: Mutex<Vec<(String, String)>>,
}

impl ScriptedClient {
    pub fn new() -> Self {
        Self {
            rules: Vec::new(),
            fallback: None,
            log: Mutex::new(Vec::new()),
        }
    }

    pub fn reply_when(mut self, trigger: &str, reply: &str) -> Self {
        self.rules.push((trigger.to_string(), Ok(reply.to_string())));
        self
    }

    pub fn fail_when(mut self, trigger: &str, message: &str) -> Self {
        self.rules.push((trigger.to_string(), Err(AuditError::Llm(message.to_string()))));
        self
    }

    pub fn otherwise(mut self, reply: &str) -> Self {
        self.fallback = Some(reply.to_string());
        self
    }

    pub fn calls(&self) -> usize {
        self.log.lock().unwrap().len()
    }

    pub fn last_system(&self) -> Option<String> {
        self.log.lock().unwrap().last().map(|(system, _)| system.clone())
    }
}

#[async_trait]
impl LlmClient for ScriptedClient {
    async fn complete(&self, system: &str, user: &str) -> Result<String> {
        self.log.lock().unwrap().push((system.to_string(), user.to_string()));
        tokio::task::yield_now().await;

        for (trigger, reply) in &self.rules {
            if user.contains(trigger.as_str()) {
                return match reply {
                    Ok(text) => Ok(text.clone()),
                    Err(e) => Err(AuditError::Llm(e.to_string())),
                };
            }
        }

        self.fallback
            .clone()
            .ok_or_else(|| AuditError::Llm(format!("no scripted reply for: {}", user)))
    }

    fn provider_name(&self) -> &str {
        "scripted"
    }

    fn model_name(&self) -> &str {
        "scripted"
    }
}
