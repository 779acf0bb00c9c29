//! In-memory result store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::RwLock;

use crate::client::StoreResult;
use crate::rows::{LeadRow, ResultRow, ResultStore};

struct Entry {
    row: ResultRow,
    expires_at: DateTime<Utc>,
}

/// Process-local store. Expired results read as missing and are pruned on
/// the next write.
#[derive(Default)]
pub struct MemoryStore {
    results: RwLock<HashMap<String, Entry>>,
    leads: RwLock<Vec<LeadRow>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ResultStore for MemoryStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn save_result(&self, row: &ResultRow, ttl: Duration) -> StoreResult<()> {
        let now = Utc::now();
        let expires_at = chrono::Duration::from_std(ttl)
            .ok()
            .and_then(|d| now.checked_add_signed(d))
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        let mut results = self.results.write().await;
        results.retain(|_, e| e.expires_at > now);
        results.insert(
            row.id.clone(),
            Entry {
                row: row.clone(),
                expires_at,
            },
        );
        Ok(())
    }

    async fn get_result(&self, id: &str) -> StoreResult<Option<ResultRow>> {
        let results = self.results.read().await;
        Ok(results
            .get(id)
            .filter(|e| e.expires_at > Utc::now())
            .map(|e| e.row.clone()))
    }

    async fn record_lead(&self, row: &LeadRow) -> StoreResult<()> {
        self.leads.write().await.push(row.clone());
        Ok(())
    }

    async fn list_leads(&self, limit: usize) -> StoreResult<Vec<LeadRow>> {
        let leads = self.leads.read().await;
        Ok(leads.iter().rev().take(limit).cloned().collect())
    }

    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }
}
