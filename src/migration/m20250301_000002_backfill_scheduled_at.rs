use sea_orm::ConnectionTrait;
use sea_orm_migration::prelude::*;

/// Folds the legacy `starts_at` column into `scheduled_at`.
///
/// Rows that already carry `scheduled_at` keep it; rows with only `starts_at`
/// get it copied over. The legacy column is then dropped, so reads never have
/// to reconcile the two again.
#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let backfill = Query::update()
            .table(StudySession::Table)
            .value(StudySession::ScheduledAt, Expr::col(StudySession::StartsAt))
            .and_where(Expr::col(StudySession::ScheduledAt).is_null())
            .and_where(Expr::col(StudySession::StartsAt).is_not_null())
            .to_owned();

        let backend = manager.get_database_backend();
        manager
            .get_connection()
            .execute(backend.build(&backfill))
            .await?;

        manager
            .alter_table(
                Table::alter()
                    .table(StudySession::Table)
                    .drop_column(StudySession::StartsAt)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .alter_table(
                Table::alter()
                    .table(StudySession::Table)
                    .add_column(
                        ColumnDef::new(StudySession::StartsAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .to_owned(),
            )
            .await
    }
}

#[derive(DeriveIden)]
enum StudySession {
    Table,
    ScheduledAt,
    StartsAt,
}
