use sea_orm::{entity::prelude::*, Set};
use serde::Serialize;

/// The résumé. Only ever one row, with id [`super::SINGLETON_ID`].
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "resume_info")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub full_name: Option<String>,
    pub title: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub location: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub summary: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub skills: Option<String>,
    pub resume_pdf_url: Option<String>,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl ActiveModel {
    /// An empty résumé.
    pub fn defaults() -> Self {
        Self {
            id: Set(super::SINGLETON_ID),
            full_name: Set(None),
            title: Set(None),
            email: Set(None),
            phone: Set(None),
            location: Set(None),
            summary: Set(None),
            skills: Set(None),
            resume_pdf_url: Set(None),
            updated_at: Set(chrono::Utc::now()),
        }
    }
}
