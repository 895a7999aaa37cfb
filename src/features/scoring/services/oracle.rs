//! Scoring oracle: rates how useful a purchase is on a 0-10 scale.

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::core::config::ScoringConfig;
use crate::core::error::{AppError, Result};
use crate::features::scoring::models::ScoreReply;
use crate::shared::llm::{parse_with_fallback, LlmResponse};
use crate::shared::prompts::{render_scoring_request_prompt, render_scoring_system_prompt};

/// What the oracle sees of a request
#[derive(Debug, Clone)]
pub struct ScoringInput {
    pub title: String,
    pub description: String,
    pub reason: String,
    pub amount: Decimal,
    pub company_context: Option<String>,
}

#[async_trait]
pub trait ScoringOracle: Send + Sync {
    /// Raw score as returned by the model; callers clamp it
    async fn score(&self, input: &ScoringInput) -> Result<f64>;
}

/// Oracle used when no scoring API is configured; every call fails
pub struct UnconfiguredOracle;

#[async_trait]
impl ScoringOracle for UnconfiguredOracle {
    async fn score(&self, _input: &ScoringInput) -> Result<f64> {
        Err(AppError::ExternalServiceError(
            "Scoring API is not configured".to_string(),
        ))
    }
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: String,
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatReplyMessage,
}

#[derive(Debug, Deserialize)]
struct ChatReplyMessage {
    content: Option<String>,
}

/// Oracle backed by an OpenAI-compatible chat completions endpoint
pub struct ChatCompletionOracle {
    client: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
    model: String,
}

impl ChatCompletionOracle {
    pub fn new(api_url: &str, config: &ScoringConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint: format!("{}/chat/completions", api_url.trim_end_matches('/')),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
        })
    }
}

#[async_trait]
impl ScoringOracle for ChatCompletionOracle {
    async fn score(&self, input: &ScoringInput) -> Result<f64> {
        let render_err = |e: crate::shared::prompts::TemplateError| AppError::Internal(e.to_string());

        let system = render_scoring_system_prompt(
            input.company_context.as_deref(),
            &ScoreReply::json_schema_string(),
        )
        .map_err(render_err)?;
        let user = render_scoring_request_prompt(
            &input.title,
            &input.description,
            &input.reason,
            input.amount,
        )
        .map_err(render_err)?;

        let body = ChatCompletionRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: user,
                },
            ],
            temperature: 0.0,
        };

        let mut request = self.client.post(&self.endpoint).json(&body);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await.map_err(|e| {
            AppError::ExternalServiceError(format!("Scoring request failed: {}", e))
        })?;

        if !response.status().is_success() {
            return Err(AppError::ExternalServiceError(format!(
                "Scoring API returned status {}",
                response.status()
            )));
        }

        let completion: ChatCompletionResponse = response.json().await.map_err(|e| {
            AppError::ExternalServiceError(format!("Failed to decode scoring response: {}", e))
        })?;

        parse_score(&completion)
    }
}

/// Pull the score out of the first choice of a completion
fn parse_score(completion: &ChatCompletionResponse) -> Result<f64> {
    let content = completion
        .choices
        .first()
        .and_then(|c| c.message.content.as_deref())
        .ok_or_else(|| AppError::ExternalServiceError("Scoring reply was empty".to_string()))?;

    let reply: ScoreReply = parse_with_fallback(content);
    if !reply.is_success() {
        return Err(AppError::ExternalServiceError(format!(
            "Unusable scoring reply: {}",
            reply.llm_error_message.unwrap_or_default()
        )));
    }

    Ok(reply.score)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn completion(content: Option<&str>) -> ChatCompletionResponse {
        ChatCompletionResponse {
            choices: vec![ChatChoice {
                message: ChatReplyMessage {
                    content: content.map(str::to_string),
                },
            }],
        }
    }

    #[test]
    fn test_parses_fenced_reply() {
        let reply = "```json\n{\"score\": 8.5, \"rationale\": \"Replaces a broken tool\"}\n```";
        assert_eq!(parse_score(&completion(Some(reply))).unwrap(), 8.5);
    }

    #[test]
    fn test_unparsable_reply_is_an_error() {
        let result = parse_score(&completion(Some("Honestly, pretty useful.")));
        assert!(matches!(result, Err(AppError::ExternalServiceError(_))));
    }

    #[test]
    fn test_empty_completion_is_an_error() {
        assert!(parse_score(&completion(None)).is_err());
        assert!(parse_score(&ChatCompletionResponse { choices: vec![] }).is_err());
    }

    #[test]
    fn test_completion_wire_format() {
        let raw = r#"{"id":"x","choices":[{"index":0,"message":{"role":"assistant","content":"{\"score\": 3}"}}]}"#;
        let parsed: ChatCompletionResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(parse_score(&parsed).unwrap(), 3.0);
    }

    #[tokio::test]
    async fn test_unconfigured_oracle_always_fails() {
        let input = ScoringInput {
            title: "Chair".to_string(),
            description: String::new(),
            reason: "Back pain".to_string(),
            amount: Decimal::from(900),
            company_context: None,
        };
        assert!(UnconfiguredOracle.score(&input).await.is_err());
    }
}
