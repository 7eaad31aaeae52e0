use std::sync::Arc;

use axum::{
    body::Body,
    http::{Method, Request},
    routing::get,
    Router,
};
use rust_decimal::Decimal;
use sea_orm::EntityTrait;
use serde_json::Value;
use tokio::sync::mpsc;
use tower::ServiceExt;
use uuid::Uuid;

use pos_api::{
    config::AppConfig,
    db,
    entities::{ArticleGroupModel, ArticleLineModel, ArticleModel, CustomerModel},
    events::{self, EventSender},
    services::{
        catalog::{CreateArticleInput, GroupInput, LineInput, PriceInput},
        customers::CreateCustomerInput,
    },
    AppState,
};

/// Test harness backed by an in-memory SQLite database.
pub struct TestApp {
    router: Router,
    pub state: AppState,
    _event_task: tokio::task::JoinHandle<()>,
}

impl TestApp {
    pub async fn new() -> Self {
        let mut cfg = AppConfig::new(
            "sqlite::memory:".to_string(),
            "127.0.0.1".to_string(),
            18_080,
            "test".to_string(),
        );
        // A single connection keeps every query on the same in-memory
        // database.
        cfg.db_max_connections = 1;
        cfg.db_min_connections = 1;

        let pool = db::establish_connection_from_app_config(&cfg)
            .await
            .expect("failed to create test database");
        db::run_migrations(&pool)
            .await
            .expect("failed to run migrations in tests");

        let db_arc = Arc::new(pool);
        let (event_tx, event_rx) = mpsc::channel(256);
        let event_sender = Arc::new(EventSender::new(event_tx));
        let event_task = tokio::spawn(events::process_events(event_rx));

        let state = AppState::new(db_arc, Arc::new(cfg), event_sender);

        let router = Router::new()
            .route("/health", get(pos_api::health_check))
            .nest("/api/v1", pos_api::api_v1_routes())
            .with_state(state.clone());

        Self {
            router,
            state,
            _event_task: event_task,
        }
    }

    /// Send a request against the router, optionally acting as a
    /// customer.
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
        customer_id: Option<Uuid>,
    ) -> axum::response::Response {
        let mut builder = Request::builder().method(method).uri(uri);

        if let Some(id) = customer_id {
            builder = builder.header("x-customer-id", id.to_string());
        }

        let body = if let Some(json) = body {
            builder = builder.header("content-type", "application/json");
            Body::from(serde_json::to_vec(&json).expect("failed to serialize request body"))
        } else {
            Body::empty()
        };

        let request = builder.body(body).expect("failed to build request");
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router error during test request")
    }

    pub async fn seed_customer(&self, name: &str, email: &str) -> CustomerModel {
        self.state
            .services
            .customers
            .create_customer(CreateCustomerInput {
                name: name.to_string(),
                email: email.to_string(),
            })
            .await
            .expect("failed to seed customer")
    }

    pub async fn seed_group(&self, name: &str) -> ArticleGroupModel {
        self.state
            .services
            .catalog
            .create_group(GroupInput {
                name: name.to_string(),
                status: None,
            })
            .await
            .expect("failed to seed group")
    }

    pub async fn seed_line(&self, group_id: Uuid, name: &str) -> ArticleLineModel {
        self.state
            .services
            .catalog
            .create_line(LineInput {
                group_id,
                name: name.to_string(),
                status: None,
            })
            .await
            .expect("failed to seed line")
    }

    /// Creates an article priced at `price_1` and returns its model.
    pub async fn seed_article(
        &self,
        group_id: Uuid,
        line_id: Uuid,
        code: &str,
        description: &str,
        price_1: Decimal,
    ) -> ArticleModel {
        let detail = self
            .state
            .services
            .catalog
            .create_article(CreateArticleInput {
                code: code.to_string(),
                barcode: None,
                description: description.to_string(),
                presentation: None,
                group_id,
                line_id,
                stock: Some(Decimal::new(100, 0)),
                status: None,
                prices: Some(PriceInput {
                    price_1,
                    price_2: Decimal::ZERO,
                    price_3: Decimal::ZERO,
                    price_4: Decimal::ZERO,
                    purchase_price: Decimal::ZERO,
                    cost_price: Decimal::ZERO,
                }),
            })
            .await
            .expect("failed to seed article");

        pos_api::entities::Article::find_by_id(detail.id)
            .one(&*self.state.db)
            .await
            .expect("failed to reload seeded article")
            .expect("seeded article missing")
    }
}

#[allow(dead_code)]
pub async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("failed to read response body");
    serde_json::from_slice(&bytes).expect("response body is not valid json")
}
