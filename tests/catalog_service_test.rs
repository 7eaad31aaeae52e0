mod common;

use common::TestApp;
use rust_decimal_macros::dec;

use pos_api::{
    entities::EntityStatus,
    errors::ServiceError,
    services::catalog::{
        ArticleFilter, CreateArticleInput, GroupInput, LineInput, PriceInput, UpdateArticleInput,
    },
};

fn article_input(
    code: &str,
    description: &str,
    group_id: uuid::Uuid,
    line_id: uuid::Uuid,
) -> CreateArticleInput {
    CreateArticleInput {
        code: code.to_string(),
        barcode: None,
        description: description.to_string(),
        presentation: None,
        group_id,
        line_id,
        stock: None,
        status: None,
        prices: Some(PriceInput {
            price_1: dec!(5.00),
            price_2: dec!(0),
            price_3: dec!(0),
            price_4: dec!(0),
            purchase_price: dec!(0),
            cost_price: dec!(0),
        }),
    }
}

#[tokio::test]
async fn article_line_must_belong_to_its_group() {
    let app = TestApp::new().await;
    let catalog = &app.state.services.catalog;

    let group_a = app.seed_group("Group A").await;
    let group_b = app.seed_group("Group B").await;
    let line_b = app.seed_line(group_b.id, "Line B").await;

    let err = catalog
        .create_article(article_input("X-1", "Mismatched", group_a.id, line_b.id))
        .await
        .expect_err("line from another group must be rejected");
    assert!(matches!(err, ServiceError::ValidationError(_)));
}

#[tokio::test]
async fn duplicate_article_codes_are_rejected() {
    let app = TestApp::new().await;
    let catalog = &app.state.services.catalog;

    let group = app.seed_group("Tools").await;
    let line = app.seed_line(group.id, "Hand tools").await;

    catalog
        .create_article(article_input("TL-1", "Hammer", group.id, line.id))
        .await
        .expect("first create");
    let err = catalog
        .create_article(article_input("TL-1", "Other hammer", group.id, line.id))
        .await
        .expect_err("duplicate code must fail");
    assert!(matches!(err, ServiceError::Conflict(_)));
}

#[tokio::test]
async fn negative_stock_and_prices_are_rejected() {
    let app = TestApp::new().await;
    let catalog = &app.state.services.catalog;

    let group = app.seed_group("Tools").await;
    let line = app.seed_line(group.id, "Hand tools").await;

    let mut input = article_input("TL-2", "Wrench", group.id, line.id);
    input.stock = Some(dec!(-1));
    let err = catalog
        .create_article(input)
        .await
        .expect_err("negative stock must fail");
    assert!(matches!(err, ServiceError::ValidationError(_)));

    let mut input = article_input("TL-3", "Pliers", group.id, line.id);
    input.prices = Some(PriceInput {
        price_1: dec!(-5.00),
        price_2: dec!(0),
        price_3: dec!(0),
        price_4: dec!(0),
        purchase_price: dec!(0),
        cost_price: dec!(0),
    });
    let err = catalog
        .create_article(input)
        .await
        .expect_err("negative price must fail");
    assert!(matches!(err, ServiceError::ValidationError(_)));
}

#[tokio::test]
async fn group_deletion_is_blocked_by_articles_but_cascades_lines() {
    let app = TestApp::new().await;
    let catalog = &app.state.services.catalog;

    let group = app.seed_group("Seasonal").await;
    let line = app.seed_line(group.id, "Summer").await;
    let article = app
        .seed_article(group.id, line.id, "SUM-1", "Sunscreen", dec!(8.00))
        .await;

    let err = catalog
        .delete_group(group.id)
        .await
        .expect_err("group with articles must be protected");
    assert!(matches!(err, ServiceError::Conflict(_)));

    catalog
        .delete_article(article.id)
        .await
        .expect("delete article");
    catalog.delete_group(group.id).await.expect("delete group");

    // The line went with its group.
    let err = catalog.get_line(line.id).await.expect_err("line is gone");
    assert!(matches!(err, ServiceError::NotFound(_)));
}

#[tokio::test]
async fn line_deletion_is_blocked_by_articles() {
    let app = TestApp::new().await;
    let catalog = &app.state.services.catalog;

    let group = app.seed_group("Seasonal").await;
    let line = app.seed_line(group.id, "Winter").await;
    app.seed_article(group.id, line.id, "WIN-1", "Gloves", dec!(12.00))
        .await;

    let err = catalog
        .delete_line(line.id)
        .await
        .expect_err("line with articles must be protected");
    assert!(matches!(err, ServiceError::Conflict(_)));
}

#[tokio::test]
async fn inactive_lines_are_hidden_from_group_listing() {
    let app = TestApp::new().await;
    let catalog = &app.state.services.catalog;

    let group = app.seed_group("Dairy").await;
    let active = app.seed_line(group.id, "Milk").await;
    let retired = app.seed_line(group.id, "Cream").await;
    catalog
        .update_line(
            retired.id,
            LineInput {
                group_id: group.id,
                name: retired.name.clone(),
                status: Some(EntityStatus::Inactive),
            },
        )
        .await
        .expect("retire line");

    let lines = catalog
        .list_lines_by_group(group.id)
        .await
        .expect("list lines");
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0].id, active.id);
}

#[tokio::test]
async fn article_deletion_removes_its_price_list() {
    let app = TestApp::new().await;
    let catalog = &app.state.services.catalog;

    let group = app.seed_group("Pantry").await;
    let line = app.seed_line(group.id, "Rice").await;
    let article = app
        .seed_article(group.id, line.id, "RICE-1", "Rice 1kg", dec!(3.00))
        .await;

    catalog
        .delete_article(article.id)
        .await
        .expect("delete article");
    let err = catalog
        .get_prices(article.id)
        .await
        .expect_err("prices are gone");
    assert!(matches!(err, ServiceError::NotFound(_)));
}

#[tokio::test]
async fn price_updates_replace_all_tiers() {
    let app = TestApp::new().await;
    let catalog = &app.state.services.catalog;

    let group = app.seed_group("Pantry").await;
    let line = app.seed_line(group.id, "Pasta").await;
    let article = app
        .seed_article(group.id, line.id, "PASTA-1", "Spaghetti", dec!(2.00))
        .await;

    let updated = catalog
        .update_prices(
            article.id,
            PriceInput {
                price_1: dec!(2.50),
                price_2: dec!(2.20),
                price_3: dec!(2.00),
                price_4: dec!(1.80),
                purchase_price: dec!(1.20),
                cost_price: dec!(1.35),
            },
        )
        .await
        .expect("update prices");
    assert_eq!(updated.price_1, dec!(2.50));
    assert_eq!(updated.price_2, dec!(2.20));
    assert_eq!(updated.price_3, dec!(2.00));
    assert_eq!(updated.price_4, dec!(1.80));
    assert_eq!(updated.purchase_price, dec!(1.20));
    assert_eq!(updated.cost_price, dec!(1.35));

    // Read back through the article projection to exercise the stored
    // columns, not just the returned view.
    let detail = catalog.get_article(article.id).await.expect("get article");
    assert_eq!(detail.prices.price_4, dec!(1.80));
    assert_eq!(detail.prices.cost_price, dec!(1.35));
}

#[tokio::test]
async fn listing_filters_by_description_group_and_line() {
    let app = TestApp::new().await;
    let catalog = &app.state.services.catalog;

    let group_a = app.seed_group("Fruits").await;
    let line_a = app.seed_line(group_a.id, "Citrus").await;
    let group_b = app.seed_group("Vegetables").await;
    let line_b = app.seed_line(group_b.id, "Roots").await;

    app.seed_article(group_a.id, line_a.id, "FR-1", "Orange bag", dec!(4.00))
        .await;
    app.seed_article(group_a.id, line_a.id, "FR-2", "Lemon bag", dec!(3.00))
        .await;
    app.seed_article(group_b.id, line_b.id, "VG-1", "Carrot bag", dec!(2.00))
        .await;

    let page = catalog
        .list_articles(
            ArticleFilter {
                q: Some("bag".to_string()),
                ..Default::default()
            },
            1,
            20,
        )
        .await
        .expect("filter by description");
    assert_eq!(page.total, 3);
    // Ordered by description.
    assert_eq!(page.articles[0].description, "Carrot bag");

    let page = catalog
        .list_articles(
            ArticleFilter {
                group_id: Some(group_a.id),
                ..Default::default()
            },
            1,
            20,
        )
        .await
        .expect("filter by group");
    assert_eq!(page.total, 2);

    let page = catalog
        .list_articles(
            ArticleFilter {
                line_id: Some(line_b.id),
                ..Default::default()
            },
            1,
            20,
        )
        .await
        .expect("filter by line");
    assert_eq!(page.total, 1);
    assert_eq!(page.articles[0].code, "VG-1");
    assert_eq!(page.articles[0].price_1, Some(dec!(2.00)));
}

#[tokio::test]
async fn update_validates_the_resulting_group_line_pair() {
    let app = TestApp::new().await;
    let catalog = &app.state.services.catalog;

    let group_a = app.seed_group("Fruits").await;
    let line_a = app.seed_line(group_a.id, "Citrus").await;
    let group_b = app.seed_group("Vegetables").await;
    let line_b = app.seed_line(group_b.id, "Roots").await;

    let article = app
        .seed_article(group_a.id, line_a.id, "FR-3", "Lime bag", dec!(3.50))
        .await;

    // Moving only the group leaves the line orphaned.
    let err = catalog
        .update_article(
            article.id,
            UpdateArticleInput {
                group_id: Some(group_b.id),
                ..Default::default()
            },
        )
        .await
        .expect_err("group-only move must fail");
    assert!(matches!(err, ServiceError::ValidationError(_)));

    // Moving both keeps the pair consistent.
    let detail = catalog
        .update_article(
            article.id,
            UpdateArticleInput {
                group_id: Some(group_b.id),
                line_id: Some(line_b.id),
                ..Default::default()
            },
        )
        .await
        .expect("consistent move");
    assert_eq!(detail.group.id, group_b.id);
    assert_eq!(detail.line.id, line_b.id);
}
