//! Stored results: JSON for the browser and the shareable HTML page.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    Json,
};
use brandlift_core::{BrandliftError, SharedResult};
use serde::Serialize;
use tera::{Context, Tera};
use tracing::error;

use super::ApiError;
use crate::state::AppState;

const RESULT_HTML: &str = include_str!("../../../../assets/web/result.html");

const NOT_FOUND_HTML: &str = "<!DOCTYPE html><html><head><title>Result not found</title></head>\
<body><h1>Result not found</h1><p>This analysis has expired or never existed.</p></body></html>";

/// GET /api/results/{id}
pub async fn get_result(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SharedResult>, ApiError> {
    let result = state.pipeline.get_result(&id).await?;
    Ok(Json(result))
}

#[derive(Serialize)]
struct AllocationView {
    stage: &'static str,
    percent: u8,
    amount: u32,
    channels: Vec<String>,
}

#[derive(Serialize)]
struct AngleView<'a> {
    stage: &'static str,
    headline: &'a str,
    subheadline: &'a str,
    value_proposition: &'a str,
    call_to_action: &'a str,
}

/// Template context for the share page.
#[derive(Serialize)]
struct SharePage<'a> {
    business_name: &'a str,
    industry: &'a str,
    website: Option<&'a str>,
    tier_label: &'static str,
    tier_description: &'static str,
    points: u8,
    max_points: u8,
    percent: u8,
    summary: &'a str,
    monthly_budget: u32,
    allocations: Vec<AllocationView>,
    ad_angles: Vec<AngleView<'a>>,
    recommendations: &'a [String],
    created_at: &'a str,
}

impl<'a> SharePage<'a> {
    fn new(result: &'a SharedResult) -> Self {
        let analysis = &result.analysis;
        Self {
            business_name: &result.business_name,
            industry: &result.industry,
            website: result.website.as_deref(),
            tier_label: analysis.tier.label(),
            tier_description: analysis.tier.description(),
            points: analysis.score.points,
            max_points: analysis.score.max_points,
            percent: analysis.score.percent(),
            summary: &analysis.summary,
            monthly_budget: analysis.budget.monthly_budget,
            allocations: analysis
                .budget
                .allocations
                .iter()
                .map(|a| AllocationView {
                    stage: a.stage.label(),
                    percent: a.percent,
                    amount: a.amount,
                    channels: a.channels.clone(),
                })
                .collect(),
            ad_angles: analysis
                .ad_angles
                .iter()
                .map(|a| AngleView {
                    stage: a.funnel_stage.label(),
                    headline: &a.headline,
                    subheadline: &a.subheadline,
                    value_proposition: &a.value_proposition,
                    call_to_action: &a.call_to_action,
                })
                .collect(),
            recommendations: &analysis.recommendations,
            created_at: &result.created_at,
        }
    }
}

fn render_share_page(result: &SharedResult) -> Result<String, tera::Error> {
    let context = Context::from_serialize(SharePage::new(result))?;
    Tera::one_off(RESULT_HTML, &context, true)
}

/// GET /r/{id} - Shareable result page.
pub async fn share_page(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    let result = match state.pipeline.get_result(&id).await {
        Ok(r) => r,
        Err(BrandliftError::ResultNotFound(_)) => {
            return (StatusCode::NOT_FOUND, Html(NOT_FOUND_HTML)).into_response()
        }
        Err(e) => return ApiError(e).into_response(),
    };

    match render_share_page(&result) {
        Ok(html) => Html(html).into_response(),
        Err(e) => {
            error!(result_id = %id, error = %e, "Failed to render share page");
            (StatusCode::INTERNAL_SERVER_ERROR, "Failed to render result").into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{get, post_json, router, sample_draft};
    use axum::http::StatusCode;
    use serde_json::json;

    #[tokio::test]
    async fn test_share_page_renders_escaped_result() {
        let app = router();
        let mut draft = sample_draft();
        draft["business_name"] = json!("Acme <Bakery>");
        let (_, body) = post_json(app.clone(), "/api/analyze", &draft).await;
        let id = body["result_id"].as_str().unwrap();

        let (status, html) = get(app, &format!("/r/{}", id)).await;
        assert_eq!(status, StatusCode::OK);
        let html = String::from_utf8(html).unwrap();
        assert!(html.contains("Acme &lt;Bakery&gt;"));
        assert!(html.contains("Developing"));
        assert!(html.contains("$3500/month"));
        assert!(!html.contains("dana@acmebakery.com"));
    }

    #[tokio::test]
    async fn test_missing_result() {
        let (status, _) = get(router(), "/api/results/0000").await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, html) = get(router(), "/r/0000").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(String::from_utf8(html).unwrap().contains("Result not found"));
    }
}
