use std::sync::Arc;

use crate::config::Config;
use crate::db::DocumentStore;
use crate::results::ResultStore;
use crate::scoring::scorer::JobScorer;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<dyn DocumentStore>,
    /// Per-submission scored results. File-backed by default, Redis when configured.
    pub results: Arc<dyn ResultStore>,
    /// Pluggable scorer. Default: KeywordJobScorer.
    pub scorer: Arc<dyn JobScorer>,
    pub config: Config,
}
