//! Brandlift Core Library
//!
//! Domain models and business logic for the brand lift assessment service:
//! profile validation, brand maturity scoring, budget allocation, LLM and
//! rule-based analysis, and the integrations a submission fans out to.

pub mod analysis;
pub mod budget;
pub mod config;
pub mod email;
pub mod error;
pub mod images;
pub mod llm;
pub mod pipeline;
pub mod profile;
pub mod scoring;
pub mod webhook;

pub use config::Config;
pub use error::{BrandliftError, BrandliftResult};
pub use pipeline::{LeadPipeline, SharedResult, Submission};
