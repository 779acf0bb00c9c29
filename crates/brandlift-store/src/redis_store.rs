//! Redis-backed result store.
//!
//! Key layout:
//! - `brandlift:result:{id}`: result JSON, set with an expiry
//! - `brandlift:lead:{id}`: hash with the lead JSON under `data`
//! - `brandlift:leads`: sorted set of lead ids scored by submission time

use async_trait::async_trait;
use redis::AsyncCommands;
use std::time::Duration;
use tracing::debug;

use crate::client::{RedisPool, StoreResult};
use crate::rows::{LeadRow, ResultRow, ResultStore};

const KEY_PREFIX: &str = "brandlift";

fn result_key(id: &str) -> String {
    format!("{}:result:{}", KEY_PREFIX, id)
}

fn lead_key(id: &str) -> String {
    format!("{}:lead:{}", KEY_PREFIX, id)
}

fn leads_index_key() -> String {
    format!("{}:leads", KEY_PREFIX)
}

/// Seconds to pass to `SET EX`. Redis rejects a zero expiry.
fn ttl_seconds(ttl: Duration) -> u64 {
    ttl.as_secs().max(1)
}

fn lead_score(created_at: &str) -> i64 {
    chrono::DateTime::parse_from_rfc3339(created_at)
        .map(|d| d.timestamp())
        .unwrap_or_else(|_| chrono::Utc::now().timestamp())
}

/// Result store backed by a Redis connection manager.
#[derive(Clone)]
pub struct RedisStore {
    pool: RedisPool,
}

impl RedisStore {
    pub fn new(pool: RedisPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ResultStore for RedisStore {
    fn backend(&self) -> &'static str {
        "redis"
    }

    async fn save_result(&self, row: &ResultRow, ttl: Duration) -> StoreResult<()> {
        let mut conn = self.pool.clone();
        let key = result_key(&row.id);
        conn.set_ex::<_, _, ()>(&key, serde_json::to_string(row)?, ttl_seconds(ttl))
            .await?;
        debug!(key = %key, ttl_secs = ttl_seconds(ttl), "Saved result");
        Ok(())
    }

    async fn get_result(&self, id: &str) -> StoreResult<Option<ResultRow>> {
        let mut conn = self.pool.clone();
        let json: Option<String> = conn.get(result_key(id)).await?;
        match json {
            Some(j) => Ok(Some(serde_json::from_str(&j)?)),
            None => Ok(None),
        }
    }

    async fn record_lead(&self, row: &LeadRow) -> StoreResult<()> {
        let mut conn = self.pool.clone();
        let key = lead_key(&row.id);
        conn.hset::<_, _, _, ()>(&key, "data", serde_json::to_string(row)?)
            .await?;
        conn.zadd::<_, _, _, ()>(leads_index_key(), &row.id, lead_score(&row.created_at))
            .await?;
        Ok(())
    }

    async fn list_leads(&self, limit: usize) -> StoreResult<Vec<LeadRow>> {
        if limit == 0 {
            return Ok(Vec::new());
        }
        let mut conn = self.pool.clone();
        let stop = isize::try_from(limit).unwrap_or(isize::MAX) - 1;
        let ids: Vec<String> = conn.zrevrange(leads_index_key(), 0, stop).await?;
        let mut leads = Vec::new();
        for id in ids {
            let mut c = self.pool.clone();
            let json: Option<String> = c.hget(lead_key(&id), "data").await?;
            if let Some(j) = json {
                if let Ok(row) = serde_json::from_str::<LeadRow>(&j) {
                    leads.push(row);
                }
            }
        }
        Ok(leads)
    }

    async fn ping(&self) -> StoreResult<()> {
        let mut conn = self.pool.clone();
        let _: String = redis::cmd("PING").query_async(&mut conn).await?;
        Ok(())
    }
}
