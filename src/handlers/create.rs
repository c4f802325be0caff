use crate::error::{ApiError, ErrorResponse};
use crate::models::{BusDetails, BusDetailsEntry};
use crate::routes;
use crate::state::AppState;
use crate::store::Filter;
use crate::validation::is_valid_date;
use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
};

/// POST /busdetails/ handler - Record a new bus trip
///
/// The date is checked before the store is touched. A second record for
/// the same vehicle and date is refused; the check and the insert are not
/// atomic, so concurrent creates for one pair can both succeed.
#[utoipa::path(
    post,
    path = routes::BUS_DETAILS_CREATE,
    request_body = BusDetails,
    responses(
        (status = 200, description = "Record created", body = BusDetailsEntry),
        (status = 400, description = "Invalid date or malformed JSON", body = ErrorResponse),
        (status = 409, description = "Record for this vehicle and date already exists", body = ErrorResponse),
        (status = 422, description = "Body does not match the record shape", body = ErrorResponse),
        (status = 500, description = "Database error", body = ErrorResponse)
    ),
    tag = "busdetails"
)]
pub async fn create_handler(
    State(state): State<AppState>,
    body: Result<Json<BusDetails>, JsonRejection>,
) -> Result<(StatusCode, Json<BusDetailsEntry>), ApiError> {
    let Json(details) = body?;
    if !is_valid_date(&details.date_field) {
        tracing::info!("Rejected invalid date: {}", details.date_field);
        return Err(ApiError::InvalidDate(details.date_field));
    }

    let filter = Filter::vehicle(details.vehicle_id).on_date(Some(details.date_field.as_str()));
    let existing = state.store.fetch(&filter, 1, None).await?;
    if !existing.items.is_empty() {
        tracing::info!(
            "Duplicate record for vehicle_id={} date_field={}",
            details.vehicle_id,
            details.date_field
        );
        return Err(ApiError::Conflict {
            vehicle_id: details.vehicle_id,
            date_field: details.date_field,
        });
    }

    let key = state.store.put(&details).await?;

    tracing::info!(
        "Created record {} for vehicle_id={} date_field={}",
        key,
        details.vehicle_id,
        details.date_field
    );
    Ok((StatusCode::OK, Json(BusDetailsEntry { key, details })))
}

#[cfg(test)]
mod tests {
    use crate::handlers::test_support::{
        FailingStore, bus_details_body, send, setup_app_with_store, setup_test_app,
    };
    use axum::http::StatusCode;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_create_returns_record_with_key() {
        let (app, store) = setup_test_app();
        let submitted = serde_json::json!({
            "vehicle_id": 12,
            "date_field": "15-06-2023",
            "trip": "A1",
            "front_door_entry": 5,
            "front_door_exit": 4,
            "back_door_entry": 2,
            "back_door_exit": 1,
            "trip_count": 1,
            "distress_count": 0
        });

        let (status, body) = send(&app, "POST", "/busdetails/", Some(submitted.clone())).await;

        assert_eq!(status, StatusCode::OK);
        assert!(!body["key"].as_str().unwrap().is_empty());
        for (field, value) in submitted.as_object().unwrap() {
            assert_eq!(&body[field], value);
        }
        assert_eq!(store.len().await, 1);

        // Same vehicle and date again
        let (status, body) = send(&app, "POST", "/busdetails/", Some(submitted)).await;

        assert_eq!(status, StatusCode::CONFLICT);
        assert!(
            body["detail"]
                .as_str()
                .unwrap()
                .contains("Bus with same vehicle_id and date field exist")
        );
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_create_same_vehicle_other_date() {
        let (app, store) = setup_test_app();

        let (first, _) = send(&app, "POST", "/busdetails/", Some(bus_details_body(12, "15-06-2023"))).await;
        let (second, _) = send(&app, "POST", "/busdetails/", Some(bus_details_body(12, "16-06-2023"))).await;
        let (third, _) = send(&app, "POST", "/busdetails/", Some(bus_details_body(13, "15-06-2023"))).await;

        assert_eq!(first, StatusCode::OK);
        assert_eq!(second, StatusCode::OK);
        assert_eq!(third, StatusCode::OK);
        assert_eq!(store.len().await, 3);
    }

    #[tokio::test]
    async fn test_create_accepts_boundary_dates() {
        let (app, _) = setup_test_app();

        for date in ["01-01-2000", "31-12-2099", "31-02-2023"] {
            let (status, _) =
                send(&app, "POST", "/busdetails/", Some(bus_details_body(1, date))).await;
            assert_eq!(status, StatusCode::OK, "{} should be accepted", date);
        }
    }

    #[tokio::test]
    async fn test_create_invalid_date_writes_nothing() {
        let (app, store) = setup_test_app();

        for date in ["2023-01-01", "32-01-2023", "01-13-2023", "15-06-1999"] {
            let (status, body) =
                send(&app, "POST", "/busdetails/", Some(bus_details_body(12, date))).await;

            assert_eq!(status, StatusCode::BAD_REQUEST, "{} should be rejected", date);
            assert!(body["detail"].as_str().unwrap().contains("Invalid Date"));
        }
        assert_eq!(store.len().await, 0);
    }

    #[tokio::test]
    async fn test_create_invalid_date_skips_store() {
        // Validation happens before any store call, so a dead store is never reached
        let app = setup_app_with_store(Arc::new(FailingStore));

        let (status, _) =
            send(&app, "POST", "/busdetails/", Some(bus_details_body(12, "2023-01-01"))).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_create_missing_field() {
        let (app, store) = setup_test_app();

        let (status, body) = send(
            &app,
            "POST",
            "/busdetails/",
            Some(serde_json::json!({"vehicle_id": 12, "date_field": "15-06-2023"})),
        )
        .await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body["detail"].as_str().unwrap().contains("trip"));
        assert_eq!(store.len().await, 0);
    }

    #[tokio::test]
    async fn test_create_wrong_type() {
        let (app, _) = setup_test_app();
        let mut body = bus_details_body(12, "15-06-2023");
        body["trip_count"] = serde_json::json!("many");

        let (status, body) = send(&app, "POST", "/busdetails/", Some(body)).await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body["detail"].is_string());
    }

    #[tokio::test]
    async fn test_create_store_failure() {
        let app = setup_app_with_store(Arc::new(FailingStore));

        let (status, _) =
            send(&app, "POST", "/busdetails/", Some(bus_details_body(12, "15-06-2023"))).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    }
}
