//! FinSight dashboard
//!
//! Upload a 10-K style PDF report and get back:
//! - Key financial metrics (structured)
//! - An executive summary
//! - The main risk factors
//! - Capital structure and profitability charts
//!
//! PIPELINE (one pass per upload):
//! UPLOAD → EXTRACT → ANALYZE → RENDER

pub mod analyzer;
pub mod api;
pub mod config;
pub mod error;
pub mod extractor;
pub mod llm;
pub mod models;
pub mod pipeline;
pub mod presentation;

pub use error::Result;

// Re-export common types
pub use models::*;
pub use analyzer::{Analyzer, LlmAnalyzer, StaticAnalyzer};
pub use pipeline::{AnalysisReport, Pipeline};
