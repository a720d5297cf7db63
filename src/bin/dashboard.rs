use finsight::{
    api::start_server,
    config::Config,
    extractor::LopdfParser,
    LlmAnalyzer, Pipeline,
};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables
    dotenv::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env()?;

    if config.llm.api_key.trim().is_empty() {
        warn!("OPENAI_API_KEY not set; every analysis will fail until it is configured");
    }

    info!("FinSight AI - Financial Report Dashboard");
    info!(port = config.port, model = %config.llm.model, "Configuration loaded");

    let analyzer = LlmAnalyzer::new(&config.llm)?;
    let pipeline = Arc::new(Pipeline::new(Box::new(LopdfParser), Box::new(analyzer)));

    start_server(pipeline, config.port, config.max_upload_bytes).await?;

    Ok(())
}
