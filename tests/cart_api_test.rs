mod common;

use axum::http::{Method, StatusCode};
use common::{body_json, TestApp};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::{json, Value};

/// Decimals serialize as JSON strings; parse them back for numeric
/// comparison regardless of scale.
fn decimal_field(value: &Value) -> Decimal {
    value
        .as_str()
        .expect("expected a decimal string")
        .parse()
        .expect("expected a parseable decimal")
}

#[tokio::test]
async fn cart_endpoints_require_customer_context() {
    let app = TestApp::new().await;

    let response = app.request(Method::POST, "/api/v1/cart", None, None).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app.request(Method::GET, "/api/v1/orders", None, None).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn full_cart_flow_over_http() {
    let app = TestApp::new().await;
    let customer = app.seed_customer("Mia", "mia@example.com").await;
    let group = app.seed_group("Bakery").await;
    let line = app.seed_line(group.id, "Bread").await;
    let article = app
        .seed_article(group.id, line.id, "BRD-1", "Baguette", dec!(2.50))
        .await;

    // Open the cart.
    let response = app
        .request(Method::POST, "/api/v1/cart", None, Some(customer.id))
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let order = body_json(response).await;
    assert_eq!(order["status"], "pending");

    // Add the article twice; the quantity accumulates on one line.
    for _ in 0..2 {
        let response = app
            .request(
                Method::POST,
                "/api/v1/cart/items",
                Some(json!({ "article_id": article.id, "quantity": "2" })),
                Some(customer.id),
            )
            .await;
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let response = app
        .request(Method::GET, "/api/v1/cart", None, Some(customer.id))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let cart = body_json(response).await;
    assert_eq!(cart["items"].as_array().map(|a| a.len()), Some(1));
    assert_eq!(decimal_field(&cart["total"]), dec!(10.00));
    assert_eq!(cart["items"][0]["article"]["code"], "BRD-1");

    // Confirm and check the history.
    let response = app
        .request(Method::POST, "/api/v1/cart/confirm", None, Some(customer.id))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let confirmed = body_json(response).await;
    assert_eq!(confirmed["status"], "processing");

    let response = app
        .request(Method::GET, "/api/v1/orders", None, Some(customer.id))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let history = body_json(response).await;
    assert_eq!(history["total"], 1);

    let order_id = history["orders"][0]["id"].as_str().expect("order id").to_string();
    let response = app
        .request(
            Method::GET,
            &format!("/api/v1/orders/{}", order_id),
            None,
            Some(customer.id),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let detail = body_json(response).await;
    assert_eq!(decimal_field(&detail["items"][0]["quantity"]), dec!(4));

    // The confirmed order no longer shows up as a cart.
    let response = app
        .request(Method::GET, "/api/v1/cart", None, Some(customer.id))
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn catalog_crud_over_http() {
    let app = TestApp::new().await;

    let response = app
        .request(
            Method::POST,
            "/api/v1/groups",
            Some(json!({ "name": "Frozen" })),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let group = body_json(response).await;
    let group_id = group["id"].as_str().expect("group id").to_string();

    let response = app
        .request(
            Method::POST,
            "/api/v1/lines",
            Some(json!({ "group_id": group_id, "name": "Ice cream" })),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let line = body_json(response).await;
    let line_id = line["id"].as_str().expect("line id").to_string();

    let response = app
        .request(
            Method::POST,
            "/api/v1/articles",
            Some(json!({
                "code": "ICE-1",
                "description": "Vanilla tub",
                "group_id": group_id,
                "line_id": line_id,
                "prices": {
                    "price_1": "6.00",
                    "price_2": "0",
                    "price_3": "0",
                    "price_4": "0",
                    "purchase_price": "0",
                    "cost_price": "0"
                }
            })),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let article = body_json(response).await;
    assert_eq!(article["group"]["name"], "Frozen");
    assert_eq!(decimal_field(&article["prices"]["price_1"]), dec!(6.00));

    // Deleting the group is refused while the article exists.
    let response = app
        .request(
            Method::DELETE,
            &format!("/api/v1/groups/{}", group_id),
            None,
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    // Unknown article id is a clean 404.
    let response = app
        .request(
            Method::GET,
            &format!("/api/v1/articles/{}", uuid::Uuid::new_v4()),
            None,
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
