use axum::{
    Router,
    routing::{get, post, put},
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api_doc::ApiDoc;
use crate::handlers;
use crate::state::AppState;

// Route path constants - single source of truth for all API paths

pub const ROOT: &str = "/";
pub const HEALTH: &str = "/health";
pub const BUS_DETAILS: &str = "/busdetails";
pub const BUS_DETAILS_CREATE: &str = "/busdetails/";
pub const BUS_DETAILS_BY_VEHICLE: &str = "/busdetails/vehicle_id/{vehicle_id}";
pub const BUS_DETAILS_BY_VEHICLE_DATE: &str = "/busdetails/vehicle_id/{vehicle_id}/{date_field}";
pub const DOCS: &str = "/docs";
pub const OPENAPI_JSON: &str = "/api-docs/openapi.json";

/// Assemble the full application router
///
/// Every origin, method and header is allowed cross-origin, credentials
/// included; the caller's origin is mirrored back.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route(ROOT, get(handlers::root_handler))
        .route(HEALTH, get(handlers::health_handler))
        .route(BUS_DETAILS, get(handlers::list_handler))
        .route(BUS_DETAILS_CREATE, post(handlers::create_handler))
        .route(
            BUS_DETAILS_BY_VEHICLE,
            get(handlers::lookup_handler)
                .delete(handlers::delete_handler)
                .put(handlers::update_without_date_handler),
        )
        .route(
            BUS_DETAILS_BY_VEHICLE_DATE,
            put(handlers::update_handler),
        )
        .merge(SwaggerUi::new(DOCS).url(OPENAPI_JSON, ApiDoc::openapi()))
        .layer(CorsLayer::very_permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use crate::handlers::test_support::setup_test_app;
    use axum::{body::Body, http::Request, http::StatusCode};
    use tower::ServiceExt;

    #[tokio::test]
    async fn test_cors_allows_any_origin_with_credentials() {
        let (app, _) = setup_test_app();

        let response = app
            .oneshot(
                Request::builder()
                    .method("OPTIONS")
                    .uri("/busdetails")
                    .header("origin", "https://dashboard.example.com")
                    .header("access-control-request-method", "DELETE")
                    .header("access-control-request-headers", "x-custom-header")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let headers = response.headers();
        assert_eq!(
            headers["access-control-allow-origin"],
            "https://dashboard.example.com"
        );
        assert_eq!(headers["access-control-allow-credentials"], "true");
    }

    #[tokio::test]
    async fn test_unknown_route() {
        let (app, _) = setup_test_app();

        let response = app
            .oneshot(Request::builder().uri("/nope").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
