//! Analyzer trait and implementations
//!
//! The analyzer turns extracted report text into a validated
//! `FinancialAnalysis` by delegating to a language model.

use async_trait::async_trait;
use tracing::{info, warn};

use crate::config::LlmConfig;
use crate::llm::LlmClient;
use crate::models::FinancialAnalysis;
use crate::Result;

/// Characters of report text sent to the model. Anything beyond is dropped.
pub const MAX_REPORT_CHARS: usize = 12_000;

const SCHEMA_NAME: &str = "FinancialAnalysis";

/// Trait for structured report analysis
#[async_trait]
pub trait Analyzer: Send + Sync {
    async fn analyze(&self, text: &str) -> Result<FinancialAnalysis>;
}

/// LLM-backed analyzer
pub struct LlmAnalyzer {
    client: LlmClient,
}

impl LlmAnalyzer {
    pub fn new(config: &LlmConfig) -> Result<Self> {
        Ok(Self {
            client: LlmClient::new(config)?,
        })
    }
}

#[async_trait]
impl Analyzer for LlmAnalyzer {
    async fn analyze(&self, text: &str) -> Result<FinancialAnalysis> {
        let excerpt = truncate_chars(text, MAX_REPORT_CHARS);
        if excerpt.len() < text.len() {
            warn!(
                total_chars = text.chars().count(),
                kept_chars = MAX_REPORT_CHARS,
                "Report text truncated before analysis"
            );
        }

        let prompt = build_prompt(excerpt);

        let content = self
            .client
            .complete_structured(&prompt, SCHEMA_NAME, FinancialAnalysis::json_schema())
            .await?;

        let analysis = FinancialAnalysis::from_llm_json(&content).map_err(|e| {
            warn!(raw = %content, "LLM response failed validation: {}", e);
            e
        })?;

        info!(
            model = self.client.model(),
            risks = analysis.risks.len(),
            "Analysis validated"
        );

        Ok(analysis)
    }
}

/// Analyzer that always returns the same result.
/// Keeps the dashboard usable without LLM access.
pub struct StaticAnalyzer {
    analysis: FinancialAnalysis,
}

impl StaticAnalyzer {
    pub fn new(analysis: FinancialAnalysis) -> Self {
        Self { analysis }
    }
}

#[async_trait]
impl Analyzer for StaticAnalyzer {
    async fn analyze(&self, _text: &str) -> Result<FinancialAnalysis> {
        Ok(self.analysis.clone())
    }
}

/// Longest prefix of `text` holding at most `max_chars` characters.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Fixed instruction template around the report excerpt
pub fn build_prompt(report_text: &str) -> String {
    format!(
        r#"You are a financial analyst.

Analyze the following 10-K report excerpt and:

1. Extract key financial metrics:
   - Revenue
   - Net Income
   - Operating Income
   - Total Assets
   - Total Liabilities
   - Cash Flow
   - EPS
   - Total Debt

2. Provide a short executive summary (max 200 words).

3. Identify main business risks mentioned.

Report values in plain US dollars (EPS per share). Use null for any metric
that is not stated in the excerpt.

Report:
{}
"#,
        report_text
    )
}
