use sea_orm_migration::prelude::*;

use super::SchemaManagerExtensions;
use crate::entity::{project, resume_info, site_settings, web_link};

/// Projects, links and the two singleton tables.
#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.create_table_for_entity(project::Entity).await?;
        manager.create_table_for_entity(web_link::Entity).await?;
        manager.create_table_for_entity(resume_info::Entity).await?;
        manager.create_table_for_entity(site_settings::Entity).await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table_for_entity(site_settings::Entity).await?;
        manager.drop_table_for_entity(resume_info::Entity).await?;
        manager.drop_table_for_entity(web_link::Entity).await?;
        manager.drop_table_for_entity(project::Entity).await
    }
}
