//! Ad-creative generation for a stored result.

use axum::{extract::State, Json};
use brandlift_core::images::{creative_prompt, GeneratedImage, ImageRequest, ImageSize};
use brandlift_core::BrandliftError;
use serde::{Deserialize, Serialize};

use super::{ApiError, ApiJson};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct GenerateImageRequest {
    pub result_id: String,
    #[serde(default)]
    pub angle_index: usize,
    #[serde(default)]
    pub size: ImageSize,
    pub backend: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct GenerateImageResponse {
    pub result_id: String,
    pub angle_index: usize,
    pub image: GeneratedImage,
}

/// POST /api/images - Generate a creative for one of a result's ad angles.
pub async fn generate_image(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<GenerateImageRequest>,
) -> Result<Json<GenerateImageResponse>, ApiError> {
    if !state.images.is_enabled() {
        return Err(BrandliftError::ImagesUnavailable("no image backend configured".to_string()).into());
    }

    let result = state.pipeline.get_result(&req.result_id).await?;
    let angle = result.analysis.ad_angles.get(req.angle_index).ok_or_else(|| {
        BrandliftError::invalid_request(format!(
            "angle_index {} out of range, result has {} ad angles",
            req.angle_index,
            result.analysis.ad_angles.len()
        ))
    })?;

    let request = ImageRequest {
        prompt: creative_prompt(&result.brief(), angle),
        size: req.size,
    };
    let image = state.images.generate(req.backend.as_deref(), &request).await?;

    Ok(Json(GenerateImageResponse {
        result_id: req.result_id,
        angle_index: req.angle_index,
        image,
    }))
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{post_json, router, sample_draft, state_with_images};
    use crate::create_router;
    use async_trait::async_trait;
    use axum::http::StatusCode;
    use brandlift_core::images::{GeneratedImage, ImageBackend, ImageRequest, ImageService};
    use serde_json::json;
    use std::sync::Arc;

    struct Fixed;

    #[async_trait]
    impl ImageBackend for Fixed {
        fn name(&self) -> &'static str {
            "openai"
        }

        async fn generate(&self, request: &ImageRequest) -> anyhow::Result<GeneratedImage> {
            Ok(GeneratedImage {
                backend: "openai".to_string(),
                prompt: request.prompt.clone(),
                url: Some("https://img.test/creative.png".to_string()),
                b64_png: None,
                job_id: None,
                revised_prompt: None,
            })
        }
    }

    fn app_with_images() -> axum::Router {
        create_router(state_with_images(ImageService::new(
            vec![Arc::new(Fixed)],
            None,
        )))
    }

    #[tokio::test]
    async fn test_generate_for_angle() {
        let app = app_with_images();
        let (_, submission) = post_json(app.clone(), "/api/analyze", &sample_draft()).await;
        let req = json!({
            "result_id": submission["result_id"],
            "angle_index": 1,
            "size": "landscape"
        });

        let (status, body) = post_json(app, "/api/images", &req).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["angle_index"], 1);
        assert_eq!(body["image"]["url"], "https://img.test/creative.png");
        assert!(body["image"]["prompt"].as_str().unwrap().contains("Acme Bakery"));
    }

    #[tokio::test]
    async fn test_error_statuses() {
        let (status, _) = post_json(router(), "/api/images", &json!({"result_id": "x"})).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);

        let app = app_with_images();
        let (status, _) = post_json(app.clone(), "/api/images", &json!({"result_id": "x"})).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (_, submission) = post_json(app.clone(), "/api/analyze", &sample_draft()).await;
        let req = json!({"result_id": submission["result_id"], "angle_index": 99});
        let (status, _) = post_json(app.clone(), "/api/images", &req).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let req = json!({"result_id": submission["result_id"], "backend": "replicate"});
        let (status, _) = post_json(app, "/api/images", &req).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    }
}
