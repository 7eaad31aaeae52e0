use axum::{
    extract::{Path, State},
    response::IntoResponse,
    routing::{delete, get, post},
    Json, Router,
};
use uuid::Uuid;

use crate::errors::ApiError;
use crate::handlers::common::{
    created_response, map_service_error, no_content_response, success_response,
};
use crate::handlers::CustomerContext;
use crate::services::cart::AddItemInput;
use crate::AppState;

pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(open_cart))
        .route("/", get(get_cart))
        .route("/items", post(add_item))
        .route("/items/:item_id", delete(remove_item))
        .route("/confirm", post(confirm_cart))
}

#[utoipa::path(
    post,
    path = "/api/v1/cart",
    params(("X-Customer-Id" = Uuid, Header, description = "Acting customer")),
    responses(
        (status = 201, description = "Cart opened or reused", body = crate::entities::OrderModel),
        (status = 401, description = "Missing customer context", body = crate::errors::ErrorResponse),
        (status = 404, description = "Customer not found", body = crate::errors::ErrorResponse)
    ),
    tag = "cart"
)]
pub async fn open_cart(
    State(state): State<AppState>,
    customer: CustomerContext,
) -> Result<impl IntoResponse, ApiError> {
    let order = state
        .services
        .cart
        .open_cart(customer.0)
        .await
        .map_err(map_service_error)?;
    Ok(created_response(order))
}

#[utoipa::path(
    get,
    path = "/api/v1/cart",
    params(("X-Customer-Id" = Uuid, Header, description = "Acting customer")),
    responses(
        (status = 200, description = "Open cart with its lines", body = crate::services::cart::CartView),
        (status = 401, description = "Missing customer context", body = crate::errors::ErrorResponse),
        (status = 404, description = "No open cart", body = crate::errors::ErrorResponse)
    ),
    tag = "cart"
)]
pub async fn get_cart(
    State(state): State<AppState>,
    customer: CustomerContext,
) -> Result<impl IntoResponse, ApiError> {
    let cart = state
        .services
        .cart
        .get_cart(customer.0)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(cart))
}

#[utoipa::path(
    post,
    path = "/api/v1/cart/items",
    params(("X-Customer-Id" = Uuid, Header, description = "Acting customer")),
    request_body = AddItemInput,
    responses(
        (status = 201, description = "Line added or quantity bumped", body = crate::entities::OrderItemModel),
        (status = 400, description = "Invalid quantity or unpriced article", body = crate::errors::ErrorResponse),
        (status = 404, description = "Article not found", body = crate::errors::ErrorResponse)
    ),
    tag = "cart"
)]
pub async fn add_item(
    State(state): State<AppState>,
    customer: CustomerContext,
    Json(input): Json<AddItemInput>,
) -> Result<impl IntoResponse, ApiError> {
    let item = state
        .services
        .cart
        .add_item(customer.0, input)
        .await
        .map_err(map_service_error)?;
    Ok(created_response(item))
}

#[utoipa::path(
    delete,
    path = "/api/v1/cart/items/{item_id}",
    params(
        ("X-Customer-Id" = Uuid, Header, description = "Acting customer"),
        ("item_id" = Uuid, Path, description = "Cart line id")
    ),
    responses(
        (status = 204, description = "Line removed"),
        (status = 404, description = "Unknown line or not the caller's", body = crate::errors::ErrorResponse),
        (status = 409, description = "Line belongs to a confirmed order", body = crate::errors::ErrorResponse)
    ),
    tag = "cart"
)]
pub async fn remove_item(
    State(state): State<AppState>,
    customer: CustomerContext,
    Path(item_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .services
        .cart
        .remove_item(customer.0, item_id)
        .await
        .map_err(map_service_error)?;
    Ok(no_content_response())
}

#[utoipa::path(
    post,
    path = "/api/v1/cart/confirm",
    params(("X-Customer-Id" = Uuid, Header, description = "Acting customer")),
    responses(
        (status = 200, description = "Cart confirmed into a processing order", body = crate::entities::OrderModel),
        (status = 400, description = "Cart is empty", body = crate::errors::ErrorResponse),
        (status = 404, description = "No open cart", body = crate::errors::ErrorResponse)
    ),
    tag = "cart"
)]
pub async fn confirm_cart(
    State(state): State<AppState>,
    customer: CustomerContext,
) -> Result<impl IntoResponse, ApiError> {
    let order = state
        .services
        .cart
        .confirm(customer.0)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(order))
}
