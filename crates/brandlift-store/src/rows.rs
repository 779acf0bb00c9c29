//! Stored row types and the store abstraction.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::client::StoreResult;

/// A persisted analysis result, addressable by its share id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultRow {
    pub id: String,
    pub business_name: String,
    pub tier: String,
    /// The full analysis, serialized as JSON.
    pub data: String,
    pub created_at: String,
}

/// A submitted lead, pointing at the result it produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeadRow {
    pub id: String,
    pub result_id: String,
    pub email: String,
    pub business_name: String,
    pub tier: String,
    pub created_at: String,
}

/// Backend for results and leads.
#[async_trait]
pub trait ResultStore: Send + Sync {
    /// Short backend name for health reporting.
    fn backend(&self) -> &'static str;

    /// Persist a result; it expires after `ttl`.
    async fn save_result(&self, row: &ResultRow, ttl: Duration) -> StoreResult<()>;

    /// Load a result. Unknown and expired ids yield `None`.
    async fn get_result(&self, id: &str) -> StoreResult<Option<ResultRow>>;

    /// Record a lead in the submission index.
    async fn record_lead(&self, row: &LeadRow) -> StoreResult<()>;

    /// Most recent leads first.
    async fn list_leads(&self, limit: usize) -> StoreResult<Vec<LeadRow>>;

    /// Check connectivity.
    async fn ping(&self) -> StoreResult<()>;
}
