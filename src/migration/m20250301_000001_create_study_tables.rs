use sea_orm_migration::prelude::*;

/// Creates the study collections and the identity session table.
///
/// `study_session` is created in its historical shape, still carrying the
/// legacy `starts_at` column. The next migration folds it into `scheduled_at`.
#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Study::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Study::Id).text().not_null().primary_key())
                    .col(ColumnDef::new(Study::Name).string().not_null())
                    .col(
                        ColumnDef::new(Study::JoinCode)
                            .string_len(6)
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(Study::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Study::CreatedBy).string().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(JoinCode::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(JoinCode::Code).text().not_null().primary_key())
                    .col(ColumnDef::new(JoinCode::StudyId).text().not_null())
                    .col(
                        ColumnDef::new(JoinCode::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_join_code_study")
                            .from(JoinCode::Table, JoinCode::StudyId)
                            .to(Study::Table, Study::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Member::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Member::StudyId).text().not_null())
                    .col(ColumnDef::new(Member::UserId).text().not_null())
                    .col(ColumnDef::new(Member::Role).string_len(16).not_null())
                    .col(
                        ColumnDef::new(Member::JoinedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .primary_key(Index::create().col(Member::StudyId).col(Member::UserId))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_member_study")
                            .from(Member::Table, Member::StudyId)
                            .to(Study::Table, Study::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(StudySession::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(StudySession::Id).text().not_null().primary_key())
                    .col(ColumnDef::new(StudySession::StudyId).text().not_null())
                    .col(ColumnDef::new(StudySession::Title).string().null())
                    .col(ColumnDef::new(StudySession::SortOrder).big_integer().null())
                    .col(
                        ColumnDef::new(StudySession::ScheduledAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(StudySession::StartsAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(StudySession::PassageReference)
                            .string()
                            .not_null()
                            .default(""),
                    )
                    .col(ColumnDef::new(StudySession::Agenda).json().not_null())
                    .col(ColumnDef::new(StudySession::Recap).json().null())
                    .col(
                        ColumnDef::new(StudySession::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(StudySession::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_study_session_study")
                            .from(StudySession::Table, StudySession::StudyId)
                            .to(Study::Table, Study::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_study_session_order")
                    .table(StudySession::Table)
                    .col(StudySession::StudyId)
                    .col(StudySession::SortOrder)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(IdentitySession::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(IdentitySession::Id)
                            .text()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(IdentitySession::Uid).text().null())
                    .col(ColumnDef::new(IdentitySession::Data).binary().not_null())
                    .col(
                        ColumnDef::new(IdentitySession::ExpiryDate)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_identity_session_expiry")
                    .table(IdentitySession::Table)
                    .col(IdentitySession::ExpiryDate)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(IdentitySession::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(StudySession::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Member::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(JoinCode::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Study::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Study {
    Table,
    Id,
    Name,
    JoinCode,
    CreatedAt,
    CreatedBy,
}

#[derive(DeriveIden)]
enum JoinCode {
    Table,
    Code,
    StudyId,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Member {
    Table,
    StudyId,
    UserId,
    Role,
    JoinedAt,
}

#[derive(DeriveIden)]
enum StudySession {
    Table,
    Id,
    StudyId,
    Title,
    SortOrder,
    ScheduledAt,
    StartsAt,
    PassageReference,
    Agenda,
    Recap,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum IdentitySession {
    Table,
    Id,
    Uid,
    Data,
    ExpiryDate,
}
