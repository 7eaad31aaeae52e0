use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::EntityStatus;

/// A sellable product/SKU. The line must belong to the same group;
/// that invariant is enforced by the catalog service on every write.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[schema(as = Article)]
#[sea_orm(table_name = "articles")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub code: String,
    #[sea_orm(nullable)]
    pub barcode: Option<String>,
    pub description: String,
    #[sea_orm(nullable)]
    pub presentation: Option<String>,
    pub group_id: Uuid,
    pub line_id: Uuid,
    #[sea_orm(column_type = "Decimal(Some((12, 2)))")]
    pub stock: Decimal,
    pub status: EntityStatus,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::article_group::Entity",
        from = "Column::GroupId",
        to = "super::article_group::Column::Id"
    )]
    ArticleGroup,
    #[sea_orm(
        belongs_to = "super::article_line::Entity",
        from = "Column::LineId",
        to = "super::article_line::Column::Id"
    )]
    ArticleLine,
    #[sea_orm(has_one = "super::price_list::Entity")]
    PriceList,
    #[sea_orm(has_many = "super::order_item::Entity")]
    OrderItems,
}

impl Related<super::article_group::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ArticleGroup.def()
    }
}

impl Related<super::article_line::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ArticleLine.def()
    }
}

impl Related<super::price_list::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PriceList.def()
    }
}

impl Related<super::order_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::OrderItems.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
