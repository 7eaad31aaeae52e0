pub mod articles;
pub mod cart;
pub mod common;
pub mod customers;
pub mod groups;
pub mod lines;
pub mod orders;

use axum::{
    extract::FromRequestParts,
    http::{header::HeaderName, request::Parts},
};
use uuid::Uuid;

use crate::errors::ApiError;
use crate::services::{CartService, CatalogService, CustomerService};

pub static CUSTOMER_ID_HEADER: HeaderName = HeaderName::from_static("x-customer-id");

/// Container for the service layer, shared through [`crate::AppState`].
#[derive(Clone)]
pub struct AppServices {
    pub catalog: CatalogService,
    pub cart: CartService,
    pub customers: CustomerService,
}

/// The customer a cart or order request acts on behalf of, taken from
/// the `X-Customer-Id` header. The gateway in front of this service is
/// expected to authenticate the caller and inject the header.
#[derive(Debug, Clone, Copy)]
pub struct CustomerContext(pub Uuid);

#[async_trait::async_trait]
impl<S> FromRequestParts<S> for CustomerContext
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let raw = parts
            .headers
            .get(&CUSTOMER_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| {
                ApiError::Unauthorized("Missing X-Customer-Id header".to_string())
            })?;

        let customer_id = Uuid::parse_str(raw).map_err(|_| {
            ApiError::Unauthorized("X-Customer-Id header is not a valid UUID".to_string())
        })?;

        Ok(CustomerContext(customer_id))
    }
}
