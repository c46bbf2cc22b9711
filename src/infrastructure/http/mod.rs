//! HTTP REST API routes

mod dice_routes;
mod encounter_table_routes;
pub mod error;
pub mod extractors;
mod public_table_routes;

use axum::{
    routing::{delete, get, patch, post},
    Router,
};
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::infrastructure::state::AppState;

/// Create all API routes
pub fn create_routes() -> Router<Arc<AppState>> {
    Router::new()
        // Encounter table routes
        .route(
            "/api/encounter-tables/preview",
            post(encounter_table_routes::preview_table),
        )
        .route(
            "/api/encounter-tables/name-suggestion",
            get(encounter_table_routes::suggest_name),
        )
        .route(
            "/api/encounter-tables",
            get(encounter_table_routes::list_tables),
        )
        .route(
            "/api/encounter-tables",
            post(encounter_table_routes::create_table),
        )
        .route(
            "/api/encounter-tables/{id}",
            get(encounter_table_routes::get_table),
        )
        .route(
            "/api/encounter-tables/{id}",
            patch(encounter_table_routes::update_table),
        )
        .route(
            "/api/encounter-tables/{id}",
            delete(encounter_table_routes::delete_table),
        )
        .route(
            "/api/encounter-tables/{id}/generate",
            post(encounter_table_routes::regenerate_entries),
        )
        .route(
            "/api/encounter-tables/{id}/roll",
            get(encounter_table_routes::roll_table),
        )
        .route(
            "/api/encounter-tables/{id}/share",
            patch(encounter_table_routes::share_table),
        )
        // Public table routes
        .route(
            "/api/encounter-tables/public/{slug}",
            get(public_table_routes::get_public_table),
        )
        .route(
            "/api/encounter-tables/public/{slug}/copy",
            post(public_table_routes::copy_public_table),
        )
        // Dice routes
        .route("/api/dice/roll", post(dice_routes::roll_dice))
}

/// The full application router with health check and middleware
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .merge(create_routes())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_check() -> &'static str {
    "OK"
}
