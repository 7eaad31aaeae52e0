use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::EntityStatus;

/// Top-level article category (e.g. beverages, dairy, cleaning).
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[schema(as = ArticleGroup)]
#[sea_orm(table_name = "article_groups")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    pub status: EntityStatus,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::article_line::Entity")]
    ArticleLines,
    #[sea_orm(has_many = "super::article::Entity")]
    Articles,
}

impl Related<super::article_line::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ArticleLines.def()
    }
}

impl Related<super::article::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Articles.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
