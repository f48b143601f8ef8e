//! Storage for scored results, keyed per submission.
//!
//! Every submission gets its own slot so concurrent users never read each
//! other's results. A "latest" slot is kept for clients that call the chart
//! routes without a submission id.

pub mod file_store;
pub mod redis_store;

use async_trait::async_trait;
use serde::Deserialize;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::scoring::ScoredTitle;

pub use file_store::FileResultStore;
pub use redis_store::RedisResultStore;

#[async_trait]
pub trait ResultStore: Send + Sync {
    /// Stores `results` under `id` and makes them the latest result.
    async fn put(&self, id: Uuid, results: &[ScoredTitle]) -> Result<(), AppError>;

    async fn get(&self, id: Uuid) -> Result<Option<Vec<ScoredTitle>>, AppError>;

    /// The most recently stored result, if any.
    async fn latest(&self) -> Result<Option<Vec<ScoredTitle>>, AppError>;
}

/// `?submission=<uuid>` selector accepted by the result-reading routes.
#[derive(Debug, Default, Deserialize)]
pub struct SubmissionQuery {
    pub submission: Option<String>,
}

impl SubmissionQuery {
    /// The requested submission id; a blank value means "latest".
    pub fn id(&self) -> Result<Option<Uuid>, AppError> {
        match self.submission.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(raw) => Uuid::parse_str(raw).map(Some).map_err(|_| {
                AppError::Validation(format!("'{raw}' is not a valid submission id"))
            }),
        }
    }
}

/// Loads the result for `submission`, or the latest one when no id is given.
pub async fn load_results(
    store: &dyn ResultStore,
    submission: Option<Uuid>,
) -> Result<Vec<ScoredTitle>, AppError> {
    match submission {
        Some(id) => store
            .get(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("No results for submission {id}"))),
        None => store
            .latest()
            .await?
            .ok_or_else(|| AppError::NotFound("No results have been submitted yet".to_string())),
    }
}

fn decode(bytes: &[u8]) -> Result<Vec<ScoredTitle>, AppError> {
    serde_json::from_slice(bytes)
        .map_err(|e| AppError::ResultStore(format!("stored result is not valid JSON: {e}")))
}

fn encode(results: &[ScoredTitle]) -> Result<Vec<u8>, AppError> {
    serde_json::to_vec(results).map_err(|e| AppError::ResultStore(e.to_string()))
}
