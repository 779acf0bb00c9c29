//! Brandlift Web Server
//!
//! Axum-based HTTP API for the assessment form, analyses, shareable result
//! pages and ad-creative generation.

pub mod routes;
pub mod state;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

pub use state::AppState;

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_routes = Router::new()
        // Form
        .route("/form", get(routes::form::get_form))
        .route("/validate/{step}", post(routes::form::validate_step))
        // Analysis
        .route("/analyze", post(routes::analyze::analyze))
        .route("/score", post(routes::analyze::score))
        // Results
        .route("/results/{id}", get(routes::results::get_result))
        // Creatives
        .route("/images", post(routes::images::generate_image))
        .with_state(state.clone());

    Router::new()
        .route("/health", get(routes::health::health))
        .nest("/api", api_routes)
        .route("/r/{id}", get(routes::results::share_page))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Run the web server.
pub async fn run_server(state: AppState, host: &str, port: u16) -> anyhow::Result<()> {
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(format!("{}:{}", host, port)).await?;
    tracing::info!("Web server listening on http://{}:{}", host, port);

    axum::serve(listener, app).await?;
    Ok(())
}
