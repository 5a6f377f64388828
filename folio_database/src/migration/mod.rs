use sea_orm::{EntityTrait, Schema};
pub use sea_orm_migration::prelude::*;

mod m20250601_01;
mod m20250601_02;
mod m20250601_03;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250601_01::Migration),
            Box::new(m20250601_02::Migration),
            Box::new(m20250601_03::Migration),
        ]
    }
}

/// Tables are derived from the entity definitions rather than spelled out
/// column by column, so the two cannot drift apart.
#[async_trait::async_trait]
trait SchemaManagerExtensions {
    async fn create_table_for_entity<E>(&self, entity: E) -> Result<(), DbErr>
    where
        E: EntityTrait;

    async fn drop_table_for_entity<E>(&self, entity: E) -> Result<(), DbErr>
    where
        E: EntityTrait;
}

#[async_trait::async_trait]
impl<'c> SchemaManagerExtensions for SchemaManager<'c> {
    async fn create_table_for_entity<E>(&self, entity: E) -> Result<(), DbErr>
    where
        E: EntityTrait,
    {
        let schema = Schema::new(self.get_database_backend());
        let mut stmt = schema.create_table_from_entity(entity);
        self.create_table(stmt.if_not_exists().to_owned()).await
    }

    async fn drop_table_for_entity<E>(&self, entity: E) -> Result<(), DbErr>
    where
        E: EntityTrait,
    {
        self.drop_table(Table::drop().table(entity).if_exists().to_owned())
            .await
    }
}
