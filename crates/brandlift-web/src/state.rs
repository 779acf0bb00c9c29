//! Application state.

use brandlift_core::images::ImageService;
use brandlift_core::{Config, LeadPipeline};
use brandlift_store::ResultStore;
use std::sync::Arc;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub pipeline: LeadPipeline,
    pub images: ImageService,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(pipeline: LeadPipeline, images: ImageService, config: Arc<Config>) -> Self {
        Self {
            pipeline,
            images,
            config,
        }
    }

    /// Wire every configured integration around `store`.
    pub fn from_config(config: Config, store: Arc<dyn ResultStore>) -> Self {
        let pipeline = LeadPipeline::from_config(&config, store);
        let images = ImageService::from_config(&config.images);
        Self::new(pipeline, images, Arc::new(config))
    }
}
