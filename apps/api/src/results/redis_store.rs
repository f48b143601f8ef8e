use async_trait::async_trait;
use redis::Client as RedisClient;
use tracing::info;
use uuid::Uuid;

use super::{decode, encode, ResultStore};
use crate::errors::AppError;
use crate::models::scoring::ScoredTitle;

const KEY_PREFIX: &str = "jobfit:result";

/// Keeps each result under `jobfit:result:<id>` with a TTL, plus a copy under
/// `jobfit:result:latest`.
pub struct RedisResultStore {
    client: RedisClient,
    ttl_secs: u64,
}

impl RedisResultStore {
    pub fn new(client: RedisClient, ttl_secs: u64) -> Self {
        Self { client, ttl_secs }
    }

    async fn read(&self, key: &str) -> Result<Option<Vec<ScoredTitle>>, AppError> {
        let mut con = self.client.get_multiplexed_async_connection().await?;
        let stored: Option<Vec<u8>> = redis::cmd("GET").arg(key).query_async(&mut con).await?;
        stored.as_deref().map(decode).transpose()
    }
}

fn result_key(id: Uuid) -> String {
    format!("{KEY_PREFIX}:{id}")
}

fn latest_key() -> String {
    format!("{KEY_PREFIX}:latest")
}

#[async_trait]
impl ResultStore for RedisResultStore {
    async fn put(&self, id: Uuid, results: &[ScoredTitle]) -> Result<(), AppError> {
        let bytes = encode(results)?;
        let mut con = self.client.get_multiplexed_async_connection().await?;

        redis::pipe()
            .atomic()
            .cmd("SET")
            .arg(result_key(id))
            .arg(&bytes)
            .arg("EX")
            .arg(self.ttl_secs)
            .ignore()
            .cmd("SET")
            .arg(latest_key())
            .arg(&bytes)
            .arg("EX")
            .arg(self.ttl_secs)
            .ignore()
            .query_async::<_, ()>(&mut con)
            .await?;

        info!("Stored {} scored titles for submission {id} in Redis", results.len());
        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Option<Vec<ScoredTitle>>, AppError> {
        self.read(&result_key(id)).await
    }

    async fn latest(&self) -> Result<Option<Vec<ScoredTitle>>, AppError> {
        self.read(&latest_key()).await
    }
}
