// src/datasets/routes.rs
//! Dataset routes

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers;

/// Creates and returns the dataset router
///
/// # Routes
/// - `POST /api/datasets` - Upload a CSV dataset
/// - `DELETE /api/datasets` - Drop the current dataset
/// - `GET /api/datasets/overview` - Shape and column classification
/// - `GET /api/datasets/preview` - Bounded row preview
/// - `GET /api/datasets/correlation` - Correlation matrix
/// - `GET /api/datasets/missing` - Missing-value distribution
/// - `GET /api/datasets/columns/:name/summary` - Continuous column statistics
/// - `GET /api/datasets/columns/:name/counts` - Categorical value counts
/// - `GET /api/datasets/relation` - Feature-relation chart data
pub fn datasets_routes() -> Router {
    Router::new()
        .route(
            "/api/datasets",
            post(handlers::upload_dataset).delete(handlers::delete_dataset),
        )
        .route("/api/datasets/overview", get(handlers::get_overview))
        .route("/api/datasets/preview", get(handlers::get_preview))
        .route("/api/datasets/correlation", get(handlers::get_correlation))
        .route("/api/datasets/missing", get(handlers::get_missing))
        .route(
            "/api/datasets/columns/:name/summary",
            get(handlers::get_column_summary),
        )
        .route(
            "/api/datasets/columns/:name/counts",
            get(handlers::get_column_counts),
        )
        .route("/api/datasets/relation", get(handlers::get_relation))
}
