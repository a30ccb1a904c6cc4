use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::handler;
use crate::state::AppState;

/// Build the axum router with all Strata endpoints.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handler::health_handler))
        .route("/info", get(handler::info_handler))
        .route("/manifests/site", get(handler::site_manifest_handler))
        .route("/bundles/:type_id", get(handler::bundle_handler))
        .route(
            "/orgs/:org_id/manifests/site",
            get(handler::org_manifest_handler),
        )
        .route(
            "/orgs/:org_id/bundles/:type_id",
            get(handler::org_bundle_handler),
        )
        .route(
            "/orgs/:org_id/entities",
            post(handler::create_entity_handler),
        )
        .route(
            "/orgs/:org_id/entities/:entity_id",
            get(handler::get_entity_handler)
                .patch(handler::update_entity_handler)
                .delete(handler::delete_entity_handler),
        )
        .route(
            "/entities/:entity_id/transition",
            post(handler::transition_handler),
        )
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
