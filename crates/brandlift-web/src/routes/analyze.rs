//! Submission and instant scoring.

use axum::{extract::State, http::StatusCode, Json};
use brandlift_core::budget::{recommend_budget, BudgetRecommendation};
use brandlift_core::profile::{BrandSignals, MonthlyBudget, PrimaryGoal, ProfileDraft};
use brandlift_core::scoring::{calculate_brand_tier, BrandScore};
use brandlift_core::{BrandliftError, Submission};
use serde::{Deserialize, Serialize};

use super::{ApiError, ApiJson};
use crate::state::AppState;

/// POST /api/analyze - Validate, analyze and store a submission.
pub async fn analyze(
    State(state): State<AppState>,
    ApiJson(draft): ApiJson<ProfileDraft>,
) -> Result<(StatusCode, Json<Submission>), ApiError> {
    let profile = draft.into_profile().map_err(BrandliftError::from)?;
    let submission = state.pipeline.submit(profile).await?;
    Ok((StatusCode::CREATED, Json(submission)))
}

#[derive(Debug, Deserialize)]
pub struct ScoreRequest {
    pub signals: BrandSignals,
    pub monthly_budget: Option<MonthlyBudget>,
    pub primary_goal: Option<PrimaryGoal>,
}

#[derive(Debug, Serialize)]
pub struct ScoreResponse {
    #[serde(flatten)]
    pub score: BrandScore,
    pub percent: u8,
    pub label: &'static str,
    pub description: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub budget: Option<BudgetRecommendation>,
}

/// POST /api/score - Tier preview from the brand signals alone.
pub async fn score(ApiJson(req): ApiJson<ScoreRequest>) -> Json<ScoreResponse> {
    let score = calculate_brand_tier(&req.signals);
    let budget = match (req.monthly_budget, req.primary_goal) {
        (Some(budget), Some(goal)) => Some(recommend_budget(budget.amount(), score.tier, goal)),
        _ => None,
    };
    Json(ScoreResponse {
        percent: score.percent(),
        label: score.tier.label(),
        description: score.tier.description(),
        score,
        budget,
    })
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{get, post_json, router, sample_draft, send, state_with};
    use crate::create_router;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use brandlift_core::images::ImageService;
    use serde_json::json;

    #[tokio::test]
    async fn test_analyze_creates_shareable_result() {
        let app = router();
        let (status, body) = post_json(app.clone(), "/api/analyze", &sample_draft()).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["analysis"]["tier"], "developing");
        assert_eq!(body["analysis"]["source"], "fallback");

        let id = body["result_id"].as_str().unwrap();
        assert_eq!(body["share_url"], format!("https://lift.test/r/{}", id));

        let (status, _) = get(app, &format!("/api/results/{}", id)).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_analyze_rejects_incomplete_profile() {
        let mut draft = sample_draft();
        draft["contact"]["email"] = json!("dana-at-acme");
        draft["signals"]["reviews"] = serde_json::Value::Null;

        let (status, body) = post_json(router(), "/api/analyze", &draft).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"], "validation_failed");
        let fields: Vec<&str> = body["errors"]
            .as_array()
            .unwrap()
            .iter()
            .map(|e| e["field"].as_str().unwrap())
            .collect();
        assert_eq!(fields, vec!["signals.reviews", "contact.email"]);
    }

    #[tokio::test]
    async fn test_undecodable_body_gets_json_error() {
        let mut draft = sample_draft();
        draft["monthly_budget"] = json!("lots");

        let request = Request::post("/api/analyze")
            .header("content-type", "application/json")
            .body(Body::from(draft.to_string()))
            .unwrap();
        let (status, body) = send(router(), request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert!(body["error"].as_str().unwrap().contains("monthly_budget"));

        let (status, body) = post_json(router(), "/api/score", &json!({"signals": 3})).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn test_submission_does_not_expose_webhook_urls() {
        let hook = "http://127.0.0.1:9/hooks/catch/123/SECRETTOKEN".to_string();
        let app = create_router(state_with(ImageService::default(), vec![hook]));

        let (status, body) = post_json(app, "/api/analyze", &sample_draft()).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["webhooks"][0]["ok"], false);
        assert!(body["webhooks"][0].get("url").is_none());
        assert!(!body.to_string().contains("SECRETTOKEN"));
    }

    #[tokio::test]
    async fn test_score_preview() {
        let req = json!({
            "signals": sample_draft()["signals"],
            "monthly_budget": "from_2k_to_5k",
            "primary_goal": "lead_generation"
        });
        let (status, body) = post_json(router(), "/api/score", &req).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["points"], 11);
        assert_eq!(body["tier"], "developing");
        assert_eq!(body["budget"]["monthly_budget"], 3500);

        let (_, body) = post_json(router(), "/api/score", &json!({"signals": sample_draft()["signals"]})).await;
        assert!(body.get("budget").is_none());
    }
}
