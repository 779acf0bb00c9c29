//! Health check.

use axum::{extract::State, Json};
use serde::Serialize;
use tracing::warn;

use crate::state::AppState;

/// Store reachability.
#[derive(Debug, Serialize)]
pub struct StoreHealth {
    pub backend: &'static str,
    pub ok: bool,
}

/// Service status and which integrations are live.
#[derive(Debug, Serialize)]
pub struct HealthReport {
    pub status: &'static str,
    pub version: &'static str,
    pub store: StoreHealth,
    pub llm: bool,
    pub images: Vec<&'static str>,
    pub email: bool,
    pub webhooks: usize,
}

/// GET /health
pub async fn health(State(state): State<AppState>) -> Json<HealthReport> {
    let store = state.pipeline.store();
    let ok = match store.ping().await {
        Ok(()) => true,
        Err(e) => {
            warn!(backend = store.backend(), error = %e, "Store ping failed");
            false
        }
    };

    Json(HealthReport {
        status: if ok { "ok" } else { "degraded" },
        version: env!("CARGO_PKG_VERSION"),
        store: StoreHealth {
            backend: store.backend(),
            ok,
        },
        llm: state.pipeline.analyzer().has_llm(),
        images: state.images.backend_names(),
        email: state.pipeline.email_enabled(),
        webhooks: state.config.webhooks.urls.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{get, router};
    use axum::http::StatusCode;

    #[tokio::test]
    async fn test_health_reports_integrations() {
        let (status, body) = get(router(), "/health").await;
        assert_eq!(status, StatusCode::OK);
        let report: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(report["status"], "ok");
        assert_eq!(report["store"]["backend"], "memory");
        assert_eq!(report["llm"], false);
        assert_eq!(report["images"], serde_json::json!([]));
    }
}
