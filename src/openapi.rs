use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::entities;
use crate::errors::ErrorResponse;
use crate::handlers;
use crate::services::{cart, catalog, customers};

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::groups::create_group,
        handlers::groups::list_groups,
        handlers::groups::get_group,
        handlers::groups::update_group,
        handlers::groups::delete_group,
        handlers::groups::list_group_lines,
        handlers::lines::create_line,
        handlers::lines::get_line,
        handlers::lines::update_line,
        handlers::lines::delete_line,
        handlers::articles::create_article,
        handlers::articles::list_articles,
        handlers::articles::get_article,
        handlers::articles::update_article,
        handlers::articles::delete_article,
        handlers::articles::get_prices,
        handlers::articles::update_prices,
        handlers::customers::create_customer,
        handlers::customers::list_customers,
        handlers::customers::get_customer,
        handlers::customers::delete_customer,
        handlers::cart::open_cart,
        handlers::cart::get_cart,
        handlers::cart::add_item,
        handlers::cart::remove_item,
        handlers::cart::confirm_cart,
        handlers::orders::list_orders,
        handlers::orders::get_order,
    ),
    components(schemas(
        ErrorResponse,
        entities::EntityStatus,
        entities::OrderStatus,
        entities::ArticleGroupModel,
        entities::ArticleLineModel,
        entities::ArticleModel,
        entities::PriceListModel,
        entities::CustomerModel,
        entities::OrderModel,
        entities::OrderItemModel,
        catalog::GroupInput,
        catalog::LineInput,
        catalog::PriceInput,
        catalog::CreateArticleInput,
        catalog::UpdateArticleInput,
        catalog::GroupRef,
        catalog::LineRef,
        catalog::PriceView,
        catalog::ArticleDetail,
        catalog::ArticleSummary,
        catalog::ArticleListPage,
        customers::CreateCustomerInput,
        cart::AddItemInput,
        cart::CartItemView,
        cart::CartView,
        cart::OrderDetail,
        cart::OrderHistoryPage,
    )),
    tags(
        (name = "groups", description = "Article group management"),
        (name = "lines", description = "Article line management"),
        (name = "articles", description = "Article and price list management"),
        (name = "customers", description = "Customer management"),
        (name = "cart", description = "Per-customer open cart"),
        (name = "orders", description = "Confirmed order history")
    ),
    info(
        title = "POS Catalog & Orders API",
        description = "Catalog, pricing and cart/order API for point-of-sale clients"
    )
)]
pub struct ApiDoc;

/// Swagger UI served at /docs, backed by the generated document.
pub fn swagger_ui() -> SwaggerUi {
    SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi())
}
