pub mod health;

use axum::{
    routing::{delete, get, post},
    Router,
};

use crate::analysis::handlers as analysis_handlers;
use crate::documents;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Document management
        .route(
            "/api/v1/jds",
            get(documents::handle_list_jds).post(documents::handle_upload_jds),
        )
        .route("/api/v1/jds/:id", delete(documents::handle_delete_jd))
        .route(
            "/api/v1/resumes",
            get(documents::handle_list_resumes).post(documents::handle_upload_resumes),
        )
        .route(
            "/api/v1/resumes/:id",
            delete(documents::handle_delete_resume),
        )
        // Analysis pipeline
        .route("/api/v1/analysis", post(analysis_handlers::handle_run_analysis))
        .route(
            "/api/v1/results/:id",
            get(analysis_handlers::handle_get_result),
        )
        .route(
            "/api/v1/results/:id/top",
            get(analysis_handlers::handle_top_candidates),
        )
        .with_state(state)
}
