use std::sync::Arc;

use tracing::{info, warn};

use crate::application::{ReviewAnalyzer, ReviewPipeline};
use crate::infrastructure::config::{AppConfig, CredentialResolver, API_KEY_NAME};
use crate::infrastructure::csv::CsvLoader;
use crate::infrastructure::llm_clients::GeminiClient;
use crate::interfaces::state::AppState;

/// Resolves the API key once and wires loader, client and analyzer.
pub fn build_state(config: AppConfig) -> AppState {
    build_state_with(config, &CredentialResolver::new())
}

pub fn build_state_with(mut config: AppConfig, resolver: &CredentialResolver) -> AppState {
    match resolver.resolve() {
        Some(credential) => {
            info!(source = %credential.source, "Loaded API key from {}", credential.source);
            config.llm = config.llm.with_api_key(Some(credential.api_key));
        }
        None => {
            warn!(
                "No {} found; every review will record a missing-key error",
                API_KEY_NAME
            );
            config.llm = config.llm.with_api_key(None);
        }
    }

    info!(
        model = %config.llm.model,
        delay_ms = config.analysis.request_delay_ms,
        max_rows = ?config.analysis.max_rows,
        "Review analyzer configured"
    );

    let client = GeminiClient::new(config.llm.clone());
    let analyzer = ReviewAnalyzer::new(Arc::new(client), config.analysis.request_delay());
    let loader = CsvLoader::new().with_max_rows(config.analysis.max_rows);

    AppState::new(config, ReviewPipeline::new(loader, analyzer))
}
