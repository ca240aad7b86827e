use crate::error::{AnalysisError, Result};

pub const API_KEY_VAR: &str = "OPENAI_API_KEY";
const BASE_URL_VAR: &str = "OPENAI_BASE_URL";
const MODEL_VAR: &str = "PARETO_MODEL";
const TEMPERATURE_VAR: &str = "PARETO_TEMPERATURE";
const IMAGE_MODEL_VAR: &str = "PARETO_IMAGE_MODEL";

/// Settings for the hosted completion service, read once at startup.
#[derive(Debug, Clone, PartialEq)]
pub struct AiConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub temperature: f32,
    pub image_model: String,
}

impl AiConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let value = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let api_key = value(API_KEY_VAR).ok_or_else(|| {
            AnalysisError::Configuration(format!("{API_KEY_VAR} must be set to call the AI service"))
        })?;

        let temperature = match value(TEMPERATURE_VAR) {
            Some(raw) => raw.trim().parse::<f32>().ok().filter(|t| (0.0..=2.0).contains(t)).ok_or_else(|| {
                AnalysisError::Configuration(format!(
                    "{TEMPERATURE_VAR} must be a number between 0 and 2, got '{raw}'"
                ))
            })?,
            None => 0.25,
        };

        Ok(Self {
            api_key,
            base_url: value(BASE_URL_VAR)
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or_else(|| "https://api.openai.com".to_string()),
            model: value(MODEL_VAR).unwrap_or_else(|| "gpt-4o".to_string()),
            temperature,
            image_model: value(IMAGE_MODEL_VAR).unwrap_or_else(|| "dall-e-3".to_string()),
        })
    }
}
