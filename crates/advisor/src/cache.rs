//! Persisted recommendation cache.
//!
//! LLM answers are expensive; identical analysis requests (same platform,
//! prompt schema revision, resource type, date range and resource) are
//! served from a SQLite table keyed by a SHA-256 digest of those
//! parameters. The payload column stores the stamped recommendation as
//! JSON.

use chrono::{NaiveDate, Utc};
use sha2::{Digest, Sha256};
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::{Row, SqlitePool};
use thiserror::Error;

use crate::analysis::schema::ResourceRecommendation;

/// Errors from cache operations.
#[derive(Error, Debug)]
pub enum CacheError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Cached payload is not valid JSON: {0}")]
    Payload(#[from] serde_json::Error),
}

/// The parameters that identify one cached analysis answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheKey {
    pub platform: String,
    pub schema_version: String,
    pub resource_type: String,
    pub resource_id: String,
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
}

impl CacheKey {
    /// Lowercase hex SHA-256 digest of the key parameters.
    ///
    /// Fields are joined with a separator that cannot appear in dates and
    /// is not expected in identifiers, so distinct parameter tuples cannot
    /// collapse into the same preimage.
    pub fn digest(&self) -> String {
        let period_start = self.period_start.to_string();
        let period_end = self.period_end.to_string();

        let mut hasher = Sha256::new();
        for part in [
            self.platform.as_str(),
            self.schema_version.as_str(),
            self.resource_type.as_str(),
            period_start.as_str(),
            period_end.as_str(),
            self.resource_id.as_str(),
        ] {
            hasher.update(part.as_bytes());
            hasher.update(b"|");
        }
        hex::encode(hasher.finalize())
    }
}

/// SQLite-backed store of prior LLM answers.
#[derive(Debug, Clone)]
pub struct RecommendationCache {
    pool: SqlitePool,
}

impl RecommendationCache {
    /// Wrap an existing pool. Call [`RecommendationCache::init`] before use.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// In-memory cache, for tests and ephemeral deployments.
    pub async fn in_memory() -> Result<Self, CacheError> {
        // One connection, or each pooled connection would see its own
        // private in-memory database.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await?;
        let cache = Self::new(pool);
        cache.init().await?;
        Ok(cache)
    }

    /// Create the cache table if it does not exist yet.
    pub async fn init(&self) -> Result<(), CacheError> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS recommendation_cache (\
                 cache_key TEXT PRIMARY KEY,\
                 platform TEXT NOT NULL,\
                 schema_version TEXT NOT NULL,\
                 resource_type TEXT NOT NULL,\
                 resource_id TEXT NOT NULL,\
                 period_start TEXT NOT NULL,\
                 period_end TEXT NOT NULL,\
                 payload TEXT NOT NULL,\
                 created_at TEXT NOT NULL,\
                 updated_at TEXT NOT NULL\
             )",
        )
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Fetch the cached recommendation for `key`, if any.
    pub async fn get(&self, key: &CacheKey) -> Result<Option<ResourceRecommendation>, CacheError> {
        let row = sqlx::query("SELECT payload FROM recommendation_cache WHERE cache_key = ?")
            .bind(key.digest())
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => {
                let payload: String = row.try_get("payload")?;
                Ok(Some(serde_json::from_str(&payload)?))
            }
            None => Ok(None),
        }
    }

    /// Insert or refresh the cached recommendation for `key`.
    pub async fn put(
        &self,
        key: &CacheKey,
        recommendation: &ResourceRecommendation,
    ) -> Result<(), CacheError> {
        let payload = serde_json::to_string(recommendation)?;
        let now = Utc::now().to_rfc3339();

        sqlx::query(
            "INSERT INTO recommendation_cache \
                 (cache_key, platform, schema_version, resource_type, resource_id, \
                  period_start, period_end, payload, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?) \
             ON CONFLICT(cache_key) DO UPDATE SET \
                 payload = excluded.payload, \
                 updated_at = excluded.updated_at",
        )
        .bind(key.digest())
        .bind(&key.platform)
        .bind(&key.schema_version)
        .bind(&key.resource_type)
        .bind(&key.resource_id)
        .bind(key.period_start.to_string())
        .bind(key.period_end.to_string())
        .bind(payload)
        .bind(&now)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
