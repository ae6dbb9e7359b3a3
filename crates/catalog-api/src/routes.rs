//! Router assembly

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, TraceLayer},
};

use crate::handlers::{categories, health, products};
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_check))
        .route(
            "/api/categories",
            get(categories::list).post(categories::create),
        )
        .route(
            "/api/categories/{slug}",
            get(categories::retrieve)
                .put(categories::update)
                .patch(categories::update)
                .delete(categories::destroy),
        )
        .route("/api/products", get(products::list).post(products::create))
        .route(
            "/api/products/{slug}",
            get(products::retrieve)
                .put(products::update)
                .patch(products::update)
                .delete(products::destroy),
        )
        .route("/api/products/{slug}/image", post(products::upload_image))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http().make_span_with(DefaultMakeSpan::new()))
        .with_state(state)
}
