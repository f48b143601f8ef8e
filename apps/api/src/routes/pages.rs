//! Static HTML pages for the browser front end.

use std::io::ErrorKind;

use axum::{extract::State, response::Html};

use crate::errors::AppError;
use crate::state::AppState;

async fn render_page(state: &AppState, template: &str) -> Result<Html<String>, AppError> {
    let path = state.config.templates_dir.join(template);
    match tokio::fs::read_to_string(&path).await {
        Ok(html) => Ok(Html(html)),
        Err(e) if e.kind() == ErrorKind::NotFound => {
            Err(AppError::NotFound(format!("Page template {template} not found")))
        }
        Err(e) => Err(AppError::Internal(anyhow::anyhow!(
            "failed to read {}: {e}",
            path.display()
        ))),
    }
}

/// GET / and GET /index
pub async fn handle_landing(State(state): State<AppState>) -> Result<Html<String>, AppError> {
    render_page(&state, "index.html").await
}

/// GET /survey
pub async fn handle_survey(State(state): State<AppState>) -> Result<Html<String>, AppError> {
    render_page(&state, "mysearch.html").await
}

/// GET /result
pub async fn handle_result(State(state): State<AppState>) -> Result<Html<String>, AppError> {
    render_page(&state, "results.html").await
}

/// GET /trends
pub async fn handle_trends(State(state): State<AppState>) -> Result<Html<String>, AppError> {
    render_page(&state, "trends.html").await
}

/// GET /about
pub async fn handle_about(State(state): State<AppState>) -> Result<Html<String>, AppError> {
    render_page(&state, "about.html").await
}

/// GET /data
pub async fn handle_data_search(State(state): State<AppState>) -> Result<Html<String>, AppError> {
    render_page(&state, "dataSearch.html").await
}
