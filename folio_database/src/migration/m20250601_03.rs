use sea_orm_migration::prelude::*;

use super::SchemaManagerExtensions;
use crate::entity::{design_work, folder};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.create_table_for_entity(folder::Entity).await?;
        manager.create_table_for_entity(design_work::Entity).await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx-design_work-folder_id")
                    .table(design_work::Entity)
                    .col(design_work::Column::FolderId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table_for_entity(design_work::Entity).await?;
        manager.drop_table_for_entity(folder::Entity).await
    }
}
