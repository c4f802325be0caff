use crate::error::{ApiError, ErrorResponse};
use crate::models::{DateQuery, DeleteResponse};
use crate::routes;
use crate::state::AppState;
use crate::store::Filter;
use axum::{
    Json,
    extract::{Path, Query, State, rejection::PathRejection},
};

/// DELETE /busdetails/vehicle_id/{vehicle_id} handler - Remove a vehicle's records
///
/// Deletes every record in the first page of matches, one key at a time.
#[utoipa::path(
    delete,
    path = routes::BUS_DETAILS_BY_VEHICLE,
    params(
        ("vehicle_id" = i64, Path, description = "Vehicle identifier"),
        DateQuery
    ),
    responses(
        (status = 200, description = "Matching records deleted", body = DeleteResponse),
        (status = 400, description = "vehicle_id is not an integer", body = ErrorResponse),
        (status = 404, description = "No record matches", body = ErrorResponse),
        (status = 500, description = "Database error", body = ErrorResponse)
    ),
    tag = "busdetails"
)]
pub async fn delete_handler(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
    Query(query): Query<DateQuery>,
) -> Result<Json<DeleteResponse>, ApiError> {
    let Path(vehicle_id) = path?;
    let filter = Filter::vehicle(vehicle_id).on_date(query.date_field.as_deref());
    let page = state
        .store
        .fetch(&filter, state.config.fetch_limit, None)
        .await?;

    if page.items.is_empty() {
        tracing::info!(
            "Nothing to delete for vehicle_id={} date_field={:?}",
            vehicle_id,
            query.date_field
        );
        return Err(ApiError::NotFound {
            vehicle_id,
            date_field: query.date_field,
        });
    }

    for entry in &page.items {
        state.store.delete(&entry.key).await?;
    }

    tracing::info!(
        "Deleted {} records for vehicle_id={} date_field={:?}",
        page.items.len(),
        vehicle_id,
        query.date_field
    );
    Ok(Json(DeleteResponse {
        task: "Deleted Successfully".to_string(),
    }))
}
