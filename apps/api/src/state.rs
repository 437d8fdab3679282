use std::sync::Arc;

use crate::config::Config;
use crate::llm_client::ResumeGenerator;
use crate::render::DocumentRenderer;
use crate::storage::DocumentStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Pluggable generator. Default: GeminiClient.
    pub generator: Arc<dyn ResumeGenerator>,
    /// Where rendered PDFs live. The renderer writes through the same store.
    pub store: Arc<dyn DocumentStore>,
    pub renderer: DocumentRenderer,
}
