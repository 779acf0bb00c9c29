//! Form schema and per-step validation.

use axum::{extract::Path, Json};
use brandlift_core::profile::{form_schema, FieldError, FormStep, FormStepSchema, ProfileDraft};
use brandlift_core::BrandliftError;
use serde::Serialize;

use super::{ApiError, ApiJson};

/// Outcome of validating one step.
#[derive(Debug, Serialize)]
pub struct StepValidation {
    pub step: FormStep,
    pub valid: bool,
    pub errors: Vec<FieldError>,
}

/// GET /api/form
pub async fn get_form() -> Json<Vec<FormStepSchema>> {
    Json(form_schema())
}

/// POST /api/validate/{step}
pub async fn validate_step(
    Path(step): Path<String>,
    ApiJson(draft): ApiJson<ProfileDraft>,
) -> Result<Json<StepValidation>, ApiError> {
    let step: FormStep = step.parse().map_err(BrandliftError::invalid_request)?;
    let errors = draft.validate_step(step).errors;
    Ok(Json(StepValidation {
        step,
        valid: errors.is_empty(),
        errors,
    }))
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{get, post_json, router, sample_draft};
    use axum::http::StatusCode;
    use serde_json::json;

    #[tokio::test]
    async fn test_form_lists_all_steps() {
        let (status, body) = get(router(), "/api/form").await;
        assert_eq!(status, StatusCode::OK);
        let steps: serde_json::Value = serde_json::from_slice(&body).unwrap();
        let names: Vec<&str> = steps
            .as_array()
            .unwrap()
            .iter()
            .map(|s| s["step"].as_str().unwrap())
            .collect();
        assert_eq!(names, vec!["business", "brand", "goals", "contact"]);
    }

    #[tokio::test]
    async fn test_validate_step_reports_only_that_step() {
        let draft = json!({ "business_name": "Acme Bakery" });
        let (status, body) = post_json(router(), "/api/validate/business", &draft).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["valid"], false);
        let fields: Vec<&str> = body["errors"]
            .as_array()
            .unwrap()
            .iter()
            .map(|e| e["field"].as_str().unwrap())
            .collect();
        assert_eq!(fields, vec!["industry"]);

        let (_, body) = post_json(router(), "/api/validate/brand", &sample_draft()).await;
        assert_eq!(body["valid"], true);
    }

    #[tokio::test]
    async fn test_unknown_step() {
        let (status, _) = post_json(router(), "/api/validate/payment", &json!({})).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
