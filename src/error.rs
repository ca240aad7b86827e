use thiserror::Error;

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("{0}")]
    InputValidation(String),

    #[error("Please enter at least one problem with a count greater than 0.")]
    EmptyResult,

    #[error("AI service error: {0}")]
    UpstreamService(String),

    #[error("could not read the AI response: {reason}")]
    ResponseShape { reason: String, raw: String },

    #[error("configuration error: {0}")]
    Configuration(String),
}

impl AnalysisError {
    pub fn shape(reason: impl Into<String>, raw: impl Into<String>) -> Self {
        Self::ResponseShape {
            reason: reason.into(),
            raw: raw.into(),
        }
    }

    /// Input problems stop the run with a warning rather than an error.
    pub fn is_input_warning(&self) -> bool {
        matches!(self, Self::InputValidation(_) | Self::EmptyResult)
    }

    pub fn raw_response(&self) -> Option<&str> {
        match self {
            Self::ResponseShape { raw, .. } => Some(raw),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, AnalysisError>;
