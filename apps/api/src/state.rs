use std::sync::Arc;

use crate::config::Config;
use crate::llm_client::CompletionProvider;
use crate::storage::FileStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<FileStore>,
    /// Structured-output provider. `LlmClient` in production, a scripted
    /// responder in tests.
    pub provider: Arc<dyn CompletionProvider>,
    pub config: Config,
}
