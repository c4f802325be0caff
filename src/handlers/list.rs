use crate::error::{ApiError, ErrorResponse};
use crate::models::BusDetailsEntry;
use crate::routes;
use crate::state::AppState;
use crate::store::Filter;
use axum::{Json, extract::State};

/// GET /busdetails handler - List bus details
///
/// Returns the first page of an unfiltered scan, at most `FETCH_LIMIT`
/// records. This is not a guaranteed full listing.
#[utoipa::path(
    get,
    path = routes::BUS_DETAILS,
    responses(
        (status = 200, description = "First page of bus details", body = Vec<BusDetailsEntry>),
        (status = 500, description = "Database error", body = ErrorResponse)
    ),
    tag = "busdetails"
)]
pub async fn list_handler(
    State(state): State<AppState>,
) -> Result<Json<Vec<BusDetailsEntry>>, ApiError> {
    let page = state
        .store
        .fetch(&Filter::all(), state.config.fetch_limit, None)
        .await?;

    tracing::info!(
        "Listed {} records (more available: {})",
        page.items.len(),
        page.last.is_some()
    );

    Ok(Json(page.items))
}

#[cfg(test)]
mod tests {
    use crate::handlers::test_support::{
        FailingStore, bus_details_body, send, setup_app, setup_app_with_store, setup_test_app,
    };
    use crate::store::MemoryStore;
    use axum::http::StatusCode;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_list_endpoint_empty() {
        let (app, _) = setup_test_app();

        let (status, body) = send(&app, "GET", "/busdetails", None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, serde_json::json!([]));
    }

    #[tokio::test]
    async fn test_list_endpoint_with_data() {
        let (app, _) = setup_test_app();

        for (vehicle_id, date) in [(1, "01-01-2023"), (2, "01-01-2023"), (1, "02-01-2023")] {
            let (status, _) = send(
                &app,
                "POST",
                "/busdetails/",
                Some(bus_details_body(vehicle_id, date)),
            )
            .await;
            assert_eq!(status, StatusCode::OK);
        }

        let (status, body) = send(&app, "GET", "/busdetails", None).await;

        assert_eq!(status, StatusCode::OK);
        let items = body.as_array().unwrap();
        assert_eq!(items.len(), 3);
        for item in items {
            assert!(!item["key"].as_str().unwrap().is_empty());
            assert_eq!(item["trip"], "A1");
        }
    }

    #[tokio::test]
    async fn test_list_endpoint_returns_first_page_only() {
        let app = setup_app(Arc::new(MemoryStore::new()), 2);

        for day in 1..=3 {
            let date = format!("{:02}-03-2023", day);
            let (status, _) =
                send(&app, "POST", "/busdetails/", Some(bus_details_body(4, &date))).await;
            assert_eq!(status, StatusCode::OK);
        }

        let (status, body) = send(&app, "GET", "/busdetails", None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_list_endpoint_store_failure() {
        let app = setup_app_with_store(Arc::new(FailingStore));

        let (status, body) = send(&app, "GET", "/busdetails", None).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body["detail"].as_str().unwrap().contains("Database error"));
    }
}
