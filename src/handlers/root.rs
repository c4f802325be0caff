use crate::models::GreetingResponse;
use crate::routes;
use axum::Json;

/// GET / handler - Greeting
#[utoipa::path(
    get,
    path = routes::ROOT,
    responses(
        (status = 200, description = "Greeting", body = GreetingResponse)
    ),
    tag = "health"
)]
pub async fn root_handler() -> Json<GreetingResponse> {
    Json(GreetingResponse {
        greetings: "Welcome to the Bus Tracking API!".to_string(),
    })
}
