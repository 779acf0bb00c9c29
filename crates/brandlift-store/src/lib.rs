//! Brandlift Store
//!
//! Persistence for shareable analysis results and submitted leads.
//! Redis is the production backend; an in-memory backend serves local
//! development and tests.

pub mod client;
pub mod memory;
pub mod redis_store;
pub mod rows;

pub use client::{init_pool, redact_url, RedisPool, StoreError, StoreResult};
pub use memory::MemoryStore;
pub use redis_store::RedisStore;
pub use rows::{LeadRow, ResultRow, ResultStore};

use std::sync::Arc;

/// Open the store for the given Redis URL, or an in-memory store when no URL
/// is configured.
pub async fn open_store(redis_url: Option<&str>) -> StoreResult<Arc<dyn ResultStore>> {
    match redis_url {
        Some(url) => {
            let pool = init_pool(url).await?;
            Ok(Arc::new(RedisStore::new(pool)))
        }
        None => {
            tracing::warn!("No Redis URL configured, results are kept in memory only");
            Ok(Arc::new(MemoryStore::new()))
        }
    }
}
