//! LLM oracle interface (§6.4): a `chat(prompt, system, response_format?)`
//! operation used at exactly three call sites (probability, strategy
//! selection, report rendering). Two implementations ship: an HTTP-backed
//! oracle speaking an OpenAI-compatible chat-completions shape, and a
//! `NullOracle` that always fails over, used when disabled or unconfigured.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::OracleConfig;
use crate::error::{Error, Result};

#[derive(Debug, Clone)]
pub struct ChatResponse {
    pub content: String,
    pub usage: Usage,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
}

#[async_trait]
pub trait Oracle: Send + Sync {
    async fn chat(
        &self,
        prompt: &str,
        system: &str,
        response_format: Option<&str>,
    ) -> Result<ChatResponse>;
}

/// Always fails over; used when the oracle is disabled or unconfigured.
pub struct NullOracle;

#[async_trait]
impl Oracle for NullOracle {
    async fn chat(
        &self,
        _prompt: &str,
        _system: &str,
        _response_format: Option<&str>,
    ) -> Result<ChatResponse> {
        Err(Error::Oracle("oracle disabled".to_string()))
    }
}

pub struct HttpOracle {
    client: reqwest::Client,
    config: OracleConfig,
    api_key: String,
}

impl HttpOracle {
    pub fn from_config(config: &OracleConfig) -> Result<Self> {
        let api_key = std::env::var(&config.api_key_env)
            .map_err(|_| Error::Oracle(format!("missing env var {}", config.api_key_env)))?;
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| Error::Oracle(e.to_string()))?;
        Ok(Self {
            client,
            config: config.clone(),
            api_key,
        })
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat<'a>>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct ResponseFormat<'a> {
    #[serde(rename = "type")]
    kind: &'a str,
}

#[derive(Deserialize)]
struct ChatApiResponse {
    choices: Vec<ChatChoice>,
    #[serde(default)]
    usage: Option<ChatUsage>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    content: String,
}

#[derive(Deserialize)]
struct ChatUsage {
    #[serde(default)]
    prompt_tokens: u32,
    #[serde(default)]
    completion_tokens: u32,
}

#[async_trait]
impl Oracle for HttpOracle {
    async fn chat(
        &self,
        prompt: &str,
        system: &str,
        response_format: Option<&str>,
    ) -> Result<ChatResponse> {
        let body = ChatRequest {
            model: &self.config.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
            response_format: response_format.map(|kind| ResponseFormat { kind }),
        };

        let mut attempt = 0;
        loop {
            attempt += 1;
            let result = self
                .client
                .post(&self.config.base_url)
                .bearer_auth(&self.api_key)
                .json(&body)
                .send()
                .await;

            match result {
                Ok(response) => {
                    let parsed: ChatApiResponse = response
                        .json()
                        .await
                        .map_err(|e| Error::Oracle(e.to_string()))?;
                    let content = parsed
                        .choices
                        .into_iter()
                        .next()
                        .map(|c| c.message.content)
                        .ok_or_else(|| Error::Oracle("empty choices".to_string()))?;
                    let usage = parsed
                        .usage
                        .map(|u| Usage {
                            prompt_tokens: u.prompt_tokens,
                            completion_tokens: u.completion_tokens,
                        })
                        .unwrap_or_default();
                    tracing::debug!(
                        prompt_tokens = usage.prompt_tokens,
                        completion_tokens = usage.completion_tokens,
                        "oracle call completed"
                    );
                    return Ok(ChatResponse { content, usage });
                }
                Err(e) if attempt <= self.config.max_retries => {
                    tracing::warn!(attempt, error = %e, "oracle call failed, retrying");
                    continue;
                }
                Err(e) => return Err(Error::Oracle(e.to_string())),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn null_oracle_always_fails_over() {
        let result = NullOracle.chat("prompt", "system", None).await;
        assert!(result.is_err());
    }
}
