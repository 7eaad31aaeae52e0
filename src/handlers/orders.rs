use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    routing::get,
    Router,
};
use uuid::Uuid;

use crate::errors::ApiError;
use crate::handlers::common::{map_service_error, success_response, PaginationParams};
use crate::handlers::CustomerContext;
use crate::AppState;

pub fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_orders))
        .route("/:id", get(get_order))
}

#[utoipa::path(
    get,
    path = "/api/v1/orders",
    params(
        ("X-Customer-Id" = Uuid, Header, description = "Acting customer"),
        PaginationParams
    ),
    responses(
        (status = 200, description = "Order history, newest first", body = crate::services::cart::OrderHistoryPage),
        (status = 401, description = "Missing customer context", body = crate::errors::ErrorResponse)
    ),
    tag = "orders"
)]
pub async fn list_orders(
    State(state): State<AppState>,
    customer: CustomerContext,
    Query(params): Query<PaginationParams>,
) -> Result<impl IntoResponse, ApiError> {
    let page = state
        .services
        .cart
        .list_orders(customer.0, params.page, params.per_page)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(page))
}

#[utoipa::path(
    get,
    path = "/api/v1/orders/{id}",
    params(
        ("X-Customer-Id" = Uuid, Header, description = "Acting customer"),
        ("id" = Uuid, Path, description = "Order id")
    ),
    responses(
        (status = 200, description = "Order with its lines", body = crate::services::cart::OrderDetail),
        (status = 404, description = "Order not found for this customer", body = crate::errors::ErrorResponse)
    ),
    tag = "orders"
)]
pub async fn get_order(
    State(state): State<AppState>,
    customer: CustomerContext,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let order = state
        .services
        .cart
        .get_order(customer.0, id)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(order))
}
