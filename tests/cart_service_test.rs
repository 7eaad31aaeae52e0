mod common;

use common::TestApp;
use rust_decimal_macros::dec;
use uuid::Uuid;

use pos_api::{
    entities::OrderStatus,
    errors::ServiceError,
    services::cart::AddItemInput,
    services::catalog::PriceInput,
};

async fn seeded_app() -> (TestApp, Uuid, Uuid, Uuid) {
    let app = TestApp::new().await;
    let customer = app.seed_customer("Ada", "ada@example.com").await;
    let group = app.seed_group("Beverages").await;
    let line = app.seed_line(group.id, "Sodas").await;
    let article = app
        .seed_article(group.id, line.id, "SODA-1", "Cola 600ml", dec!(10.00))
        .await;
    (app, customer.id, article.id, line.id)
}

#[tokio::test]
async fn open_cart_reuses_pending_order() {
    let (app, customer_id, _, _) = seeded_app().await;
    let cart = &app.state.services.cart;

    let first = cart.open_cart(customer_id).await.expect("open cart");
    let second = cart.open_cart(customer_id).await.expect("reopen cart");

    assert_eq!(first.id, second.id);
    assert_eq!(first.status, OrderStatus::Pending);
}

#[tokio::test]
async fn open_cart_unknown_customer_is_not_found() {
    let (app, _, _, _) = seeded_app().await;
    let err = app
        .state
        .services
        .cart
        .open_cart(Uuid::new_v4())
        .await
        .expect_err("unknown customer must fail");
    assert!(matches!(err, ServiceError::NotFound(_)));
}

#[tokio::test]
async fn concurrent_opens_share_one_cart() {
    let (app, customer_id, _, _) = seeded_app().await;
    let cart = app.state.services.cart.clone();
    let cart2 = cart.clone();

    let (a, b) = tokio::join!(cart.open_cart(customer_id), cart2.open_cart(customer_id));
    let a = a.expect("first open");
    let b = b.expect("second open");
    assert_eq!(a.id, b.id);
}

#[tokio::test]
async fn adding_same_article_bumps_quantity_and_keeps_price() {
    let (app, customer_id, article_id, _) = seeded_app().await;
    let cart = &app.state.services.cart;

    let first = cart
        .add_item(
            customer_id,
            AddItemInput {
                article_id,
                quantity: None,
            },
        )
        .await
        .expect("first add");
    assert_eq!(first.quantity, dec!(1));
    assert_eq!(first.unit_price, dec!(10.00));

    // Raise the sale price; the line must keep the captured price.
    app.state
        .services
        .catalog
        .update_prices(
            article_id,
            PriceInput {
                price_1: dec!(99.00),
                price_2: dec!(0),
                price_3: dec!(0),
                price_4: dec!(0),
                purchase_price: dec!(0),
                cost_price: dec!(0),
            },
        )
        .await
        .expect("reprice");

    let second = cart
        .add_item(
            customer_id,
            AddItemInput {
                article_id,
                quantity: Some(dec!(1)),
            },
        )
        .await
        .expect("second add");

    assert_eq!(second.id, first.id);
    assert_eq!(second.quantity, dec!(2));
    assert_eq!(second.unit_price, dec!(10.00));
    assert_eq!(second.line_total, dec!(20.00));

    let view = cart.get_cart(customer_id).await.expect("view cart");
    assert_eq!(view.items.len(), 1);
    assert_eq!(view.total, dec!(20.00));
}

#[tokio::test]
async fn add_rejects_bad_quantity_and_unpriced_articles() {
    let (app, customer_id, article_id, _) = seeded_app().await;
    let cart = &app.state.services.cart;

    let err = cart
        .add_item(
            customer_id,
            AddItemInput {
                article_id,
                quantity: Some(dec!(0)),
            },
        )
        .await
        .expect_err("zero quantity must fail");
    assert!(matches!(err, ServiceError::ValidationError(_)));

    let err = cart
        .add_item(
            customer_id,
            AddItemInput {
                article_id,
                quantity: Some(dec!(-3)),
            },
        )
        .await
        .expect_err("negative quantity must fail");
    assert!(matches!(err, ServiceError::ValidationError(_)));

    // An article whose sale price is zero cannot be sold.
    let group = app.seed_group("Misc").await;
    let line = app.seed_line(group.id, "Unpriced").await;
    let free = app
        .seed_article(group.id, line.id, "FREE-1", "Sample", dec!(0))
        .await;
    let err = cart
        .add_item(
            customer_id,
            AddItemInput {
                article_id: free.id,
                quantity: None,
            },
        )
        .await
        .expect_err("unpriced article must fail");
    assert!(matches!(err, ServiceError::ValidationError(_)));
}

#[tokio::test]
async fn removing_a_line_recomputes_the_total() {
    let (app, customer_id, article_id, _) = seeded_app().await;
    let cart = &app.state.services.cart;

    let group = app.seed_group("Snacks").await;
    let line = app.seed_line(group.id, "Chips").await;
    let other = app
        .seed_article(group.id, line.id, "CHIP-1", "Potato chips", dec!(4.50))
        .await;

    cart.add_item(
        customer_id,
        AddItemInput {
            article_id,
            quantity: Some(dec!(2)),
        },
    )
    .await
    .expect("add first article");
    let chip_line = cart
        .add_item(
            customer_id,
            AddItemInput {
                article_id: other.id,
                quantity: None,
            },
        )
        .await
        .expect("add second article");

    let view = cart.get_cart(customer_id).await.expect("view cart");
    assert_eq!(view.total, dec!(24.50));

    cart.remove_item(customer_id, chip_line.id)
        .await
        .expect("remove line");

    let view = cart.get_cart(customer_id).await.expect("view cart again");
    assert_eq!(view.items.len(), 1);
    assert_eq!(view.total, dec!(20.00));
}

#[tokio::test]
async fn remove_is_scoped_to_the_callers_cart() {
    let (app, customer_id, article_id, _) = seeded_app().await;
    let cart = &app.state.services.cart;
    let other_customer = app.seed_customer("Bob", "bob@example.com").await;

    let item = cart
        .add_item(
            customer_id,
            AddItemInput {
                article_id,
                quantity: None,
            },
        )
        .await
        .expect("add item");

    // Another customer's line is invisible, with or without a cart of
    // their own.
    let err = cart
        .remove_item(other_customer.id, item.id)
        .await
        .expect_err("foreign remove must fail");
    assert!(matches!(err, ServiceError::NotFound(_)));

    cart.open_cart(other_customer.id).await.expect("open cart");
    let err = cart
        .remove_item(other_customer.id, item.id)
        .await
        .expect_err("foreign remove must still fail");
    assert!(matches!(err, ServiceError::NotFound(_)));

    // Unknown line ids are missing too.
    let err = cart
        .remove_item(customer_id, Uuid::new_v4())
        .await
        .expect_err("unknown line must fail");
    assert!(matches!(err, ServiceError::NotFound(_)));
}

#[tokio::test]
async fn lines_of_confirmed_orders_cannot_be_removed() {
    let (app, customer_id, article_id, _) = seeded_app().await;
    let cart = &app.state.services.cart;

    let item = cart
        .add_item(
            customer_id,
            AddItemInput {
                article_id,
                quantity: None,
            },
        )
        .await
        .expect("add item");
    let confirmed = cart.confirm(customer_id).await.expect("confirm");

    // The line exists but its order has left Pending.
    let err = cart
        .remove_item(customer_id, item.id)
        .await
        .expect_err("confirmed line must be frozen");
    assert!(matches!(err, ServiceError::Conflict(_)));

    // The order is untouched.
    let detail = cart
        .get_order(customer_id, confirmed.id)
        .await
        .expect("order detail");
    assert_eq!(detail.items.len(), 1);
    assert_eq!(detail.total, dec!(10.00));
}

#[tokio::test]
async fn empty_cart_cannot_be_confirmed() {
    let (app, customer_id, _, _) = seeded_app().await;
    let cart = &app.state.services.cart;

    cart.open_cart(customer_id).await.expect("open cart");
    let err = cart
        .confirm(customer_id)
        .await
        .expect_err("empty confirm must fail");
    assert!(matches!(err, ServiceError::ValidationError(_)));
}

#[tokio::test]
async fn confirm_moves_cart_to_processing_and_persists_total() {
    let (app, customer_id, article_id, _) = seeded_app().await;
    let cart = &app.state.services.cart;

    cart.add_item(
        customer_id,
        AddItemInput {
            article_id,
            quantity: Some(dec!(3)),
        },
    )
    .await
    .expect("add item");

    let confirmed = cart.confirm(customer_id).await.expect("confirm cart");
    assert_eq!(confirmed.status, OrderStatus::Processing);
    assert_eq!(confirmed.total, dec!(30.00));

    // The cart is gone; a new open creates a fresh pending order.
    let err = cart.get_cart(customer_id).await.expect_err("no cart left");
    assert!(matches!(err, ServiceError::NotFound(_)));
    let fresh = cart.open_cart(customer_id).await.expect("new cart");
    assert_ne!(fresh.id, confirmed.id);
}

#[tokio::test]
async fn order_history_excludes_the_open_cart_and_other_customers() {
    let (app, customer_id, article_id, _) = seeded_app().await;
    let cart = &app.state.services.cart;
    let other = app.seed_customer("Eve", "eve@example.com").await;

    cart.add_item(
        customer_id,
        AddItemInput {
            article_id,
            quantity: None,
        },
    )
    .await
    .expect("add item");
    let confirmed = cart.confirm(customer_id).await.expect("confirm");

    // A second, still-open cart must not appear in the history.
    cart.open_cart(customer_id).await.expect("new cart");

    let history = cart
        .list_orders(customer_id, 1, 20)
        .await
        .expect("list orders");
    assert_eq!(history.total, 1);
    assert_eq!(history.orders[0].id, confirmed.id);

    let empty = cart.list_orders(other.id, 1, 20).await.expect("other list");
    assert_eq!(empty.total, 0);

    // Order detail is scoped the same way.
    let detail = cart
        .get_order(customer_id, confirmed.id)
        .await
        .expect("own order detail");
    assert_eq!(detail.items.len(), 1);
    let err = cart
        .get_order(other.id, confirmed.id)
        .await
        .expect_err("foreign order must be hidden");
    assert!(matches!(err, ServiceError::NotFound(_)));
}

#[tokio::test]
async fn customer_with_orders_cannot_be_deleted() {
    let (app, customer_id, article_id, _) = seeded_app().await;
    let cart = &app.state.services.cart;

    cart.add_item(
        customer_id,
        AddItemInput {
            article_id,
            quantity: None,
        },
    )
    .await
    .expect("add item");

    let err = app
        .state
        .services
        .customers
        .delete_customer(customer_id)
        .await
        .expect_err("delete must be refused");
    assert!(matches!(err, ServiceError::Conflict(_)));
}
