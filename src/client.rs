use serde::Deserialize;
use serde_json::json;

use crate::config::AiConfig;
use crate::error::{AnalysisError, Result};

/// Hosted text and image generation. One request per call, no retry.
#[allow(async_fn_in_trait)]
pub trait CompletionService {
    async fn complete(&self, system_prompt: &str, user_message: &str) -> Result<String>;

    /// Returns a URL for the generated image.
    async fn generate_image(&self, prompt: &str) -> Result<String>;
}

pub struct OpenAiClient {
    config: AiConfig,
    http: reqwest::Client,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Deserialize)]
struct ChatMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct ImageResponse {
    data: Vec<ImageData>,
}

#[derive(Deserialize)]
struct ImageData {
    url: Option<String>,
}

impl OpenAiClient {
    pub fn new(config: AiConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .build()
            .map_err(|err| AnalysisError::Configuration(format!("failed to build HTTP client: {err}")))?;
        Ok(Self { config, http })
    }

    async fn post(&self, path: &str, body: serde_json::Value) -> Result<String> {
        let url = format!("{}{}", self.config.base_url, path);
        tracing::debug!(%url, "calling AI service");

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|err| AnalysisError::UpstreamService(format!("request failed: {err}")))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|err| AnalysisError::UpstreamService(format!("failed to read response: {err}")))?;

        if !status.is_success() {
            return Err(AnalysisError::UpstreamService(format!(
                "HTTP {status}: {}",
                upstream_message(&text)
            )));
        }
        Ok(text)
    }
}

/// Pulls `error.message` out of an error body, falling back to the raw body.
fn upstream_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|value| {
            value
                .pointer("/error/message")
                .and_then(|message| message.as_str())
                .map(str::to_string)
        })
        .unwrap_or_else(|| body.trim().to_string())
}

impl CompletionService for OpenAiClient {
    async fn complete(&self, system_prompt: &str, user_message: &str) -> Result<String> {
        let body = json!({
            "model": self.config.model,
            "temperature": self.config.temperature,
            "messages": [
                {"role": "system", "content": system_prompt},
                {"role": "user", "content": user_message},
            ],
        });
        let text = self.post("/v1/chat/completions", body).await?;

        let parsed: ChatResponse = serde_json::from_str(&text)
            .map_err(|err| AnalysisError::shape(format!("unexpected completion payload: {err}"), &text))?;
        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| AnalysisError::shape("the AI service returned an empty response", &text))
    }

    async fn generate_image(&self, prompt: &str) -> Result<String> {
        let body = json!({
            "model": self.config.image_model,
            "prompt": prompt,
            "n": 1,
            "size": "1024x1024",
        });
        let text = self.post("/v1/images/generations", body).await?;

        let parsed: ImageResponse = serde_json::from_str(&text)
            .map_err(|err| AnalysisError::shape(format!("unexpected image payload: {err}"), &text))?;
        parsed
            .data
            .into_iter()
            .next()
            .and_then(|image| image.url)
            .ok_or_else(|| AnalysisError::shape("the image service returned no image", &text))
    }
}
