use sea_orm::entity::prelude::*;
use serde::Serialize;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "folders")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,
    pub icon_type: String,
    pub display_order: i32,
    pub is_active: bool,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::design_work::Entity")]
    DesignWork,
}

impl Related<super::design_work::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::DesignWork.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// A folder as listed to clients, with the number of visible items in it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FolderSummary {
    #[serde(flatten)]
    pub folder: Model,
    pub item_count: i64,
}
