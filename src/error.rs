//! Error types for the FinSight dashboard

use thiserror::Error;

/// Result type alias for dashboard operations
pub type Result<T> = std::result::Result<T, FinsightError>;

#[derive(Error, Debug)]
pub enum FinsightError {

    // =============================
    // Pipeline Errors
    // =============================

    #[error("Extraction error: {0}")]
    Extraction(String),

    #[error("Extraction error: failed to parse PDF")]
    PdfParse(#[source] lopdf::Error),

    #[error("LLM error: {0}")]
    Llm(String),

    #[error("LLM error: request to the LLM API failed")]
    LlmRequest(#[source] reqwest::Error),

    #[error("Schema validation error: {0}")]
    Schema(String),

    #[error("Schema validation error: LLM response does not match the analysis schema")]
    InvalidResponse(#[source] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Upload error: {0}")]
    Upload(String),

    // =============================
    // External Library Conversions
    // =============================

    #[error("HTTP client error: {0}")]
    HttpError(#[from] reqwest::Error),
}

impl FinsightError {
    /// True for failures caused by the request itself rather than the pipeline
    pub fn is_client_error(&self) -> bool {
        matches!(self, FinsightError::Upload(_))
    }

    /// Render the error and every `source()` beneath it, outermost first.
    pub fn trace(&self) -> Vec<String> {
        let mut lines = vec![self.to_string()];
        let mut source = std::error::Error::source(self);
        while let Some(err) = source {
            lines.push(format!("caused by: {}", err));
            source = err.source();
        }
        lines
    }
}
