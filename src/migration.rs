pub use sea_orm_migration::prelude::*;

mod m20250301_000001_create_study_tables;
mod m20250301_000002_backfill_scheduled_at;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    // Keep our bookkeeping apart from any other migrator sharing the database
    fn migration_table_name() -> sea_orm::DynIden {
        Alias::new("study_circle_migrations").into_iden()
    }

    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250301_000001_create_study_tables::Migration),
            Box::new(m20250301_000002_backfill_scheduled_at::Migration),
        ]
    }
}
