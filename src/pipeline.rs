//! Upload pipeline - EXTRACT → ANALYZE
//!
//! One linear pass per uploaded document. Nothing is kept between runs.

use std::sync::Arc;
use std::time::Instant;

use tracing::info;
use uuid::Uuid;

use crate::analyzer::Analyzer;
use crate::error::FinsightError;
use crate::extractor::{self, DocumentParser};
use crate::models::FinancialAnalysis;
use crate::Result;

/// Everything the presentation layer needs for one upload
#[derive(Debug, Clone)]
pub struct AnalysisReport {
    pub run_id: Uuid,
    pub text: String,
    pub analysis: FinancialAnalysis,
}

pub struct Pipeline {
    parser: Arc<dyn DocumentParser>,
    analyzer: Box<dyn Analyzer>,
}

impl Pipeline {
    pub fn new(parser: Box<dyn DocumentParser>, analyzer: Box<dyn Analyzer>) -> Self {
        Self {
            parser: Arc::from(parser),
            analyzer,
        }
    }

    /// Extract the document text and analyze it. Any failure aborts the run.
    pub async fn run(&self, bytes: Vec<u8>) -> Result<AnalysisReport> {
        let run_id = Uuid::new_v4();
        let start_time = Instant::now();

        info!(run_id = %run_id, bytes = bytes.len(), "Pipeline: document received");

        // PDF parsing is CPU-bound; keep it off the async workers.
        let parser = Arc::clone(&self.parser);
        let text = tokio::task::spawn_blocking(move || {
            extractor::extract_text(parser.as_ref(), &bytes)
        })
        .await
        .map_err(|e| FinsightError::Extraction(format!("Extraction task failed: {}", e)))??;

        let analysis = self.analyzer.analyze(&text).await?;

        info!(
            run_id = %run_id,
            elapsed_ms = start_time.elapsed().as_millis() as u64,
            "Pipeline: analysis complete"
        );

        Ok(AnalysisReport {
            run_id,
            text,
            analysis,
        })
    }
}
