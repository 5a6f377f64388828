use sea_orm::entity::prelude::*;
use serde::Serialize;

/// One uploaded media asset. Always belongs to a folder, and its `file_url`
/// (plus `thumbnail_url`, when present) name files in the upload directory.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "design_work")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub title: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,
    pub file_url: String,
    pub thumbnail_url: Option<String>,
    pub file_type: Option<String>,
    pub file_size: Option<i64>,
    pub width: Option<i32>,
    pub height: Option<i32>,
    pub client_name: Option<String>,
    pub project_date: Option<Date>,
    #[sea_orm(column_type = "Text", nullable)]
    pub tags: Option<String>,
    pub display_order: i32,
    pub is_active: bool,
    pub folder_id: i32,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::folder::Entity",
        from = "Column::FolderId",
        to = "super::folder::Column::Id",
        on_delete = "Cascade"
    )]
    Folder,
}

impl Related<super::folder::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Folder.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// URLs of every file on disk that backs this item.
    pub fn file_urls(&self) -> Vec<String> {
        let mut urls = vec![self.file_url.clone()];
        urls.extend(self.thumbnail_url.clone());
        urls
    }
}
