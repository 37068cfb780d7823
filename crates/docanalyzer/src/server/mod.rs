//! HTTP front route: text analysis proxy and PDF text extraction.

pub mod handlers;
pub mod router;

use std::sync::Arc;

use crate::analysis::{AnalysisClient, OllamaClient};
use crate::config::Config;
use crate::extractor::ExtractorRegistry;
use crate::sanitize;

pub use router::create_router;

#[derive(Clone)]
pub struct AppState {
    pub client: Arc<dyn AnalysisClient>,
    pub extractors: Arc<ExtractorRegistry>,
    /// Inference endpoint, named in "unavailable" responses.
    pub endpoint: String,
}

impl AppState {
    pub fn new(
        client: Arc<dyn AnalysisClient>,
        extractors: Arc<ExtractorRegistry>,
        endpoint: &str,
    ) -> Self {
        Self {
            client,
            extractors,
            endpoint: sanitize::redact_url(endpoint),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        let client = OllamaClient::new(&config.inference);
        let endpoint = client.endpoint().to_string();
        Self::new(
            Arc::new(client),
            Arc::new(ExtractorRegistry::new()),
            &endpoint,
        )
    }
}

/// Binds `config.server.bind` and serves until the process is stopped.
pub async fn serve(config: &Config) -> std::io::Result<()> {
    let state = AppState::from_config(config);
    let listener = tokio::net::TcpListener::bind(&config.server.bind).await?;

    tracing::info!(
        address = %listener.local_addr()?,
        endpoint = %state.endpoint,
        model = %config.inference.model,
        "Server listening"
    );

    axum::serve(listener, create_router(state)).await
}
