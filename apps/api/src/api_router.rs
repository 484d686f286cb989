use axum::Router;
use axum::middleware::from_fn;
use axum::routing::{get, patch};
use nimbus_core::AppError;
use tower_http::trace::TraceLayer;

use crate::state::AppState;
use crate::{handlers, middleware};

mod cors;

pub fn build_router(
    app_state: AppState,
    cors_allowed_origin: Option<&str>,
) -> Result<Router, AppError> {
    let protected_routes = Router::new()
        .route(
            "/v3/deployments",
            get(handlers::deployments::list_deployments_handler),
        )
        .route(
            "/v3/deployments/{deployment_guid}",
            get(handlers::deployments::get_deployment_handler),
        )
        .route(
            "/v3/spaces",
            get(handlers::spaces::list_spaces_handler).post(handlers::spaces::create_space_handler),
        )
        .route(
            "/v3/spaces/{space_guid}",
            patch(handlers::spaces::update_space_handler)
                .delete(handlers::spaces::delete_space_handler),
        )
        .route(
            "/v3/apps",
            get(handlers::apps::list_apps_handler).post(handlers::apps::create_app_handler),
        )
        .route(
            "/v3/audit_events",
            get(handlers::events::list_audit_events_handler),
        )
        .route_layer(from_fn(middleware::require_auth));

    let router = Router::new()
        .route("/healthz", get(handlers::health::health_handler))
        .merge(protected_routes)
        .layer(TraceLayer::new_for_http());

    let router = match cors_allowed_origin {
        Some(origin) => router.layer(cors::build_cors_layer(origin)?),
        None => router,
    };

    Ok(router.with_state(app_state))
}
