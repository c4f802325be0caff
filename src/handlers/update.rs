use crate::error::{ApiError, ErrorResponse};
use crate::models::{BusDetailsEntry, BusDetailsPatch};
use crate::routes;
use crate::state::AppState;
use crate::store::Filter;
use axum::{
    Json,
    extract::{
        Path, State,
        rejection::{JsonRejection, PathRejection},
    },
};

/// PUT /busdetails/vehicle_id/{vehicle_id}/{date_field} handler - Merge-update a record
///
/// Only the first matching record is updated. Fields missing from the body
/// keep their stored values. The date is not format-checked here.
#[utoipa::path(
    put,
    path = routes::BUS_DETAILS_BY_VEHICLE_DATE,
    params(
        ("vehicle_id" = i64, Path, description = "Vehicle identifier"),
        ("date_field" = String, Path, description = "Record date, DD-MM-YYYY")
    ),
    request_body = BusDetailsPatch,
    responses(
        (status = 200, description = "Record after the update", body = BusDetailsEntry),
        (status = 404, description = "No record matches", body = ErrorResponse),
        (status = 422, description = "Body does not match the patch shape", body = ErrorResponse),
        (status = 500, description = "Database error", body = ErrorResponse)
    ),
    tag = "busdetails"
)]
pub async fn update_handler(
    State(state): State<AppState>,
    path: Result<Path<(i64, String)>, PathRejection>,
    body: Result<Json<BusDetailsPatch>, JsonRejection>,
) -> Result<Json<BusDetailsEntry>, ApiError> {
    let Path((vehicle_id, date_field)) = path?;
    let Json(patch) = body?;
    apply_update(&state, vehicle_id, Some(date_field), &patch).await
}

/// PUT /busdetails/vehicle_id/{vehicle_id} handler - Merge-update without a date
///
/// Selects records whose date is absent. Every record created through the
/// API has one, so this answers 404.
#[utoipa::path(
    put,
    path = routes::BUS_DETAILS_BY_VEHICLE,
    params(
        ("vehicle_id" = i64, Path, description = "Vehicle identifier")
    ),
    request_body = BusDetailsPatch,
    responses(
        (status = 200, description = "Record after the update", body = BusDetailsEntry),
        (status = 404, description = "No record matches", body = ErrorResponse),
        (status = 422, description = "Body does not match the patch shape", body = ErrorResponse),
        (status = 500, description = "Database error", body = ErrorResponse)
    ),
    tag = "busdetails"
)]
pub async fn update_without_date_handler(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
    body: Result<Json<BusDetailsPatch>, JsonRejection>,
) -> Result<Json<BusDetailsEntry>, ApiError> {
    let Path(vehicle_id) = path?;
    let Json(patch) = body?;
    apply_update(&state, vehicle_id, None, &patch).await
}

async fn apply_update(
    state: &AppState,
    vehicle_id: i64,
    date_field: Option<String>,
    patch: &BusDetailsPatch,
) -> Result<Json<BusDetailsEntry>, ApiError> {
    let filter = match &date_field {
        Some(date) => Filter::vehicle(vehicle_id).on_date(Some(date.as_str())),
        None => Filter::vehicle(vehicle_id).without_date(),
    };
    let not_found = || ApiError::NotFound {
        vehicle_id,
        date_field: date_field.clone(),
    };

    let page = state.store.fetch(&filter, 1, None).await?;
    let Some(target) = page.items.into_iter().next() else {
        tracing::info!(
            "Nothing to update for vehicle_id={} date_field={:?}",
            vehicle_id,
            date_field
        );
        return Err(not_found());
    };

    state.store.update(&target.key, patch).await?;

    // The record can disappear between the update and this read
    let Some(updated) = state.store.get(&target.key).await? else {
        return Err(not_found());
    };

    tracing::info!("Updated record {} for vehicle_id={}", updated.key, vehicle_id);
    Ok(Json(updated))
}
