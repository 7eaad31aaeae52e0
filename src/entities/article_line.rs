use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::EntityStatus;

/// Sub-category within a group (e.g. sodas, juices inside beverages).
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[schema(as = ArticleLine)]
#[sea_orm(table_name = "article_lines")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub group_id: Uuid,
    pub name: String,
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
    #[sea_orm(has_many = "super::article::Entity")]
    Articles,
}

impl Related<super::article_group::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ArticleGroup.def()
    }
}

impl Related<super::article::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Articles.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
