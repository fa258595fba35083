use super::LLMClient;
use crate::domain::error::{AppError, Result};
use crate::domain::llm_config::LLMConfig;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

#[derive(Serialize)]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    #[serde(rename = "generationConfig", skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Serialize)]
struct GeminiContent {
    parts: Vec<GeminiPart>,
}

#[derive(Serialize)]
struct GeminiPart {
    text: String,
}

#[derive(Serialize)]
struct GenerationConfig {
    #[serde(rename = "candidateCount")]
    candidate_count: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(rename = "maxOutputTokens", skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<u32>,
}

#[derive(Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
    #[serde(rename = "promptFeedback")]
    prompt_feedback: Option<GeminiPromptFeedback>,
}

#[derive(Deserialize)]
struct GeminiCandidate {
    content: Option<GeminiCandidateContent>,
    #[serde(rename = "finishReason")]
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct GeminiCandidateContent {
    #[serde(default)]
    parts: Vec<GeminiCandidatePart>,
}

#[derive(Deserialize)]
struct GeminiCandidatePart {
    text: Option<String>,
}

#[derive(Deserialize)]
struct GeminiPromptFeedback {
    #[serde(rename = "blockReason")]
    block_reason: Option<String>,
}

/// Google Gemini `generateContent` client. One completion per call.
pub struct GeminiClient {
    client: reqwest::Client,
    config: LLMConfig,
}

impl GeminiClient {
    pub fn new(config: LLMConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self { client, config }
    }

    pub fn model(&self) -> &str {
        self.config.model.trim()
    }

    fn api_key(&self) -> Result<&str> {
        self.config
            .api_key
            .as_deref()
            .ok_or_else(|| AppError::LLMError("Missing API key for Google provider".to_string()))
    }

    fn endpoint(&self) -> String {
        let base_url = self.config.base_url.trim_end_matches('/');
        format!("{}/{}:generateContent", base_url, self.model())
    }

    fn request_body(&self, prompt: &str) -> GeminiRequest {
        GeminiRequest {
            contents: vec![GeminiContent {
                parts: vec![GeminiPart {
                    text: prompt.to_string(),
                }],
            }],
            generation_config: Some(GenerationConfig {
                candidate_count: 1,
                temperature: self.config.temperature,
                max_output_tokens: self.config.max_tokens,
            }),
        }
    }
}

/// Text of the first candidate, parts concatenated.
fn extract_text(response: GeminiResponse) -> Result<String> {
    if let Some(reason) = response
        .prompt_feedback
        .and_then(|feedback| feedback.block_reason)
    {
        return Err(AppError::LLMError(format!("Prompt was blocked: {}", reason)));
    }

    let candidate = response
        .candidates
        .into_iter()
        .next()
        .ok_or_else(|| AppError::LLMError("Response contained no candidates".to_string()))?;

    let text: String = candidate
        .content
        .map(|content| {
            content
                .parts
                .into_iter()
                .filter_map(|part| part.text)
                .collect()
        })
        .unwrap_or_default();

    if text.is_empty() {
        let reason = candidate
            .finish_reason
            .unwrap_or_else(|| "UNKNOWN".to_string());
        return Err(AppError::LLMError(format!(
            "Response has no text (finish reason: {})",
            reason
        )));
    }

    Ok(text)
}

#[async_trait]
impl LLMClient for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<String> {
        let api_key = self.api_key()?;
        let url = self.endpoint();

        debug!(model = %self.model(), prompt_len = prompt.len(), "Calling Gemini");

        let response = self
            .client
            .post(&url)
            .query(&[("key", api_key)])
            .header("Content-Type", "application/json")
            .json(&self.request_body(prompt))
            .send()
            .await
            .map_err(|e| AppError::LLMError(format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(AppError::LLMError(format!(
                "API error ({}): {}",
                status, text
            )));
        }

        let json: GeminiResponse = response
            .json()
            .await
            .map_err(|e| AppError::LLMError(format!("Failed to parse JSON: {}", e)))?;

        extract_text(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(body: &str) -> GeminiResponse {
        serde_json::from_str(body).unwrap()
    }

    #[test]
    fn test_endpoint_uses_model_and_trims_slash() {
        let config = LLMConfig {
            base_url: "https://example.test/v1beta/models/".to_string(),
            model: " gemini-2.5-flash ".to_string(),
            ..LLMConfig::default()
        };
        let client = GeminiClient::new(config);
        assert_eq!(
            client.endpoint(),
            "https://example.test/v1beta/models/gemini-2.5-flash:generateContent"
        );
    }

    #[test]
    fn test_request_body_shape() {
        let client = GeminiClient::new(LLMConfig::default());
        let body = serde_json::to_value(client.request_body("hello")).unwrap();
        assert_eq!(body["contents"][0]["parts"][0]["text"], "hello");
        assert_eq!(body["generationConfig"]["candidateCount"], 1);
        assert!(body["generationConfig"].get("temperature").is_none());
    }

    #[test]
    fn test_extract_text_joins_parts() {
        let response = parse(
            r#"{"candidates":[{"content":{"parts":[{"text":"1. Sentiment: "},{"text":"Positive"}]},"finishReason":"STOP"}]}"#,
        );
        assert_eq!(extract_text(response).unwrap(), "1. Sentiment: Positive");
    }

    #[test]
    fn test_extract_text_blocked_prompt() {
        let response = parse(r#"{"promptFeedback":{"blockReason":"SAFETY"}}"#);
        let err = extract_text(response).unwrap_err();
        assert_eq!(err, AppError::LLMError("Prompt was blocked: SAFETY".to_string()));
    }

    #[test]
    fn test_extract_text_empty_candidate() {
        let response = parse(r#"{"candidates":[{"finishReason":"MAX_TOKENS"}]}"#);
        let err = extract_text(response).unwrap_err();
        assert!(err.to_string().contains("MAX_TOKENS"));
    }

    #[tokio::test]
    async fn test_missing_key_fails_without_request() {
        let client = GeminiClient::new(LLMConfig::default());
        let err = client.generate("prompt").await.unwrap_err();
        assert_eq!(
            err,
            AppError::LLMError("Missing API key for Google provider".to_string())
        );
    }
}
