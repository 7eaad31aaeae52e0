#![forbid(unsafe_code)]

pub mod config;
pub mod db;
pub mod entities;
pub mod errors;
pub mod events;
pub mod handlers;
pub mod migrator;
pub mod openapi;
pub mod services;

use axum::{extract::State, http::StatusCode, response::IntoResponse, routing::get, Json, Router};
use sea_orm::DatabaseConnection;
use serde_json::json;
use std::sync::Arc;

use crate::config::AppConfig;
use crate::events::EventSender;
use crate::handlers::AppServices;
use crate::services::{CartService, CatalogService, CustomerService};

/// Shared application state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DatabaseConnection>,
    pub config: Arc<AppConfig>,
    pub event_sender: Arc<EventSender>,
    pub services: AppServices,
}

impl AppState {
    pub fn new(
        db: Arc<DatabaseConnection>,
        config: Arc<AppConfig>,
        event_sender: Arc<EventSender>,
    ) -> Self {
        let services = AppServices {
            catalog: CatalogService::new(db.clone(), Some(event_sender.clone())),
            cart: CartService::new(db.clone(), Some(event_sender.clone())),
            customers: CustomerService::new(db.clone()),
        };
        Self {
            db,
            config,
            event_sender,
            services,
        }
    }
}

/// All versioned API routes, mounted under `/api/v1`.
pub fn api_v1_routes() -> Router<AppState> {
    Router::new()
        .nest("/groups", handlers::groups::group_routes())
        .nest("/lines", handlers::lines::line_routes())
        .nest("/articles", handlers::articles::article_routes())
        .nest("/customers", handlers::customers::customer_routes())
        .nest("/cart", handlers::cart::cart_routes())
        .nest("/orders", handlers::orders::order_routes())
}

/// Liveness/readiness probe; verifies the database connection.
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    match db::ping(&state.db).await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({ "status": "ok", "database": "up" })),
        ),
        Err(_) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "status": "degraded", "database": "down" })),
        ),
    }
}

/// Builds the full application router, including probes and docs.
pub fn app_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(|| async { "POS Catalog & Orders API" }))
        .route("/health", get(health_check))
        .nest("/api/v1", api_v1_routes())
        .merge(openapi::swagger_ui())
        .with_state(state)
}
