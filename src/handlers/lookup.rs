use crate::error::{ApiError, ErrorResponse};
use crate::models::{BusDetailsEntry, DateQuery};
use crate::routes;
use crate::state::AppState;
use crate::store::Filter;
use axum::{
    Json,
    extract::{Path, Query, State, rejection::PathRejection},
};

/// GET /busdetails/vehicle_id/{vehicle_id} handler - Look up a vehicle's records
///
/// Matches on `vehicle_id`, and on `date_field` too when the query parameter
/// is given. An empty list is a successful answer.
#[utoipa::path(
    get,
    path = routes::BUS_DETAILS_BY_VEHICLE,
    params(
        ("vehicle_id" = i64, Path, description = "Vehicle identifier"),
        DateQuery
    ),
    responses(
        (status = 200, description = "Matching records, possibly none", body = Vec<BusDetailsEntry>),
        (status = 400, description = "vehicle_id is not an integer", body = ErrorResponse),
        (status = 500, description = "Database error", body = ErrorResponse)
    ),
    tag = "busdetails"
)]
pub async fn lookup_handler(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
    Query(query): Query<DateQuery>,
) -> Result<Json<Vec<BusDetailsEntry>>, ApiError> {
    let Path(vehicle_id) = path?;
    let filter = Filter::vehicle(vehicle_id).on_date(query.date_field.as_deref());
    let page = state
        .store
        .fetch(&filter, state.config.fetch_limit, None)
        .await?;

    tracing::info!(
        "Found {} records for vehicle_id={} date_field={:?}",
        page.items.len(),
        vehicle_id,
        query.date_field
    );

    Ok(Json(page.items))
}
