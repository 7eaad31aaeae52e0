use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Price tiers for one article. Created together with the article and
/// removed with it; the cart snapshots `price_1` as the sale price.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[schema(as = PriceList)]
#[sea_orm(table_name = "price_lists")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub article_id: Uuid,
    #[sea_orm(column_type = "Decimal(Some((12, 2)))")]
    pub price_1: Decimal,
    #[sea_orm(column_type = "Decimal(Some((12, 2)))")]
    pub price_2: Decimal,
    #[sea_orm(column_type = "Decimal(Some((12, 2)))")]
    pub price_3: Decimal,
    #[sea_orm(column_type = "Decimal(Some((12, 2)))")]
    pub price_4: Decimal,
    #[sea_orm(column_type = "Decimal(Some((12, 2)))")]
    pub purchase_price: Decimal,
    #[sea_orm(column_type = "Decimal(Some((12, 2)))")]
    pub cost_price: Decimal,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::article::Entity",
        from = "Column::ArticleId",
        to = "super::article::Column::Id"
    )]
    Article,
}

impl Related<super::article::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Article.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
