use utoipa::OpenApi;

use crate::error::{ErrorResponse, HealthResponse, UnhealthyResponse};
use crate::handlers;
use crate::models::{BusDetails, BusDetailsEntry, BusDetailsPatch, DeleteResponse, GreetingResponse};

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Bus Tracking API",
        version = "1.0.0",
        description = "CRUD over bus-trip passenger counts, keyed by vehicle and date"
    ),
    paths(
        handlers::root::root_handler,
        handlers::health::health_handler,
        handlers::list::list_handler,
        handlers::lookup::lookup_handler,
        handlers::create::create_handler,
        handlers::delete::delete_handler,
        handlers::update::update_handler,
        handlers::update::update_without_date_handler
    ),
    components(
        schemas(
            BusDetails,
            BusDetailsEntry,
            BusDetailsPatch,
            DeleteResponse,
            GreetingResponse,
            ErrorResponse,
            HealthResponse,
            UnhealthyResponse
        )
    ),
    tags(
        (name = "health", description = "Greeting and health check"),
        (name = "busdetails", description = "Bus trip record operations")
    )
)]
pub struct ApiDoc;
