use axum::{
    extract::{Path, State},
    response::IntoResponse,
    routing::{delete, get, post},
    Json, Router,
};
use uuid::Uuid;

use crate::errors::ApiError;
use crate::handlers::common::{
    created_response, map_service_error, no_content_response, success_response, validate_input,
};
use crate::services::customers::CreateCustomerInput;
use crate::AppState;

pub fn customer_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(create_customer))
        .route("/", get(list_customers))
        .route("/:id", get(get_customer))
        .route("/:id", delete(delete_customer))
}

#[utoipa::path(
    post,
    path = "/api/v1/customers",
    request_body = CreateCustomerInput,
    responses(
        (status = 201, description = "Customer created", body = crate::entities::CustomerModel),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse),
        (status = 409, description = "Email already registered", body = crate::errors::ErrorResponse)
    ),
    tag = "customers"
)]
pub async fn create_customer(
    State(state): State<AppState>,
    Json(input): Json<CreateCustomerInput>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&input)?;
    let customer = state
        .services
        .customers
        .create_customer(input)
        .await
        .map_err(map_service_error)?;
    Ok(created_response(customer))
}

#[utoipa::path(
    get,
    path = "/api/v1/customers",
    responses(
        (status = 200, description = "Customers listed", body = [crate::entities::CustomerModel])
    ),
    tag = "customers"
)]
pub async fn list_customers(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let customers = state
        .services
        .customers
        .list_customers()
        .await
        .map_err(map_service_error)?;
    Ok(success_response(customers))
}

#[utoipa::path(
    get,
    path = "/api/v1/customers/{id}",
    params(("id" = Uuid, Path, description = "Customer id")),
    responses(
        (status = 200, description = "Customer found", body = crate::entities::CustomerModel),
        (status = 404, description = "Customer not found", body = crate::errors::ErrorResponse)
    ),
    tag = "customers"
)]
pub async fn get_customer(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let customer = state
        .services
        .customers
        .get_customer(id)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(customer))
}

#[utoipa::path(
    delete,
    path = "/api/v1/customers/{id}",
    params(("id" = Uuid, Path, description = "Customer id")),
    responses(
        (status = 204, description = "Customer deleted"),
        (status = 404, description = "Customer not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "Customer still has orders", body = crate::errors::ErrorResponse)
    ),
    tag = "customers"
)]
pub async fn delete_customer(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .services
        .customers
        .delete_customer(id)
        .await
        .map_err(map_service_error)?;
    Ok(no_content_response())
}
