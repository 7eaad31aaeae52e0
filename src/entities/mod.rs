pub mod article;
pub mod article_group;
pub mod article_line;
pub mod customer;
pub mod order;
pub mod order_item;
pub mod price_list;

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub use article::{Entity as Article, Model as ArticleModel};
pub use article_group::{Entity as ArticleGroup, Model as ArticleGroupModel};
pub use article_line::{Entity as ArticleLine, Model as ArticleLineModel};
pub use customer::{Entity as Customer, Model as CustomerModel};
pub use order::{Entity as Order, Model as OrderModel, OrderStatus};
pub use order_item::{Entity as OrderItem, Model as OrderItemModel};
pub use price_list::{Entity as PriceList, Model as PriceListModel};

/// Lifecycle status shared by catalog entities (groups, lines, articles).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "snake_case")]
pub enum EntityStatus {
    #[sea_orm(string_value = "active")]
    Active,
    #[sea_orm(string_value = "inactive")]
    Inactive,
}
