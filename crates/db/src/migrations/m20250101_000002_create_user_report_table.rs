//! Create user_report table.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(UserReport::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(UserReport::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(UserReport::ReporterId)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(UserReport::ReportedUserId)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(UserReport::ReportType)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(ColumnDef::new(UserReport::Details).text().not_null())
                    .col(ColumnDef::new(UserReport::DamagePercentage).double())
                    .col(ColumnDef::new(UserReport::RelatedRentalId).string_len(32))
                    .col(ColumnDef::new(UserReport::RelatedDeliveryId).string_len(32))
                    .col(
                        ColumnDef::new(UserReport::Status)
                            .string_len(32)
                            .not_null()
                            .default("PENDING"),
                    )
                    .col(ColumnDef::new(UserReport::ClaimedBy).string_len(32))
                    .col(ColumnDef::new(UserReport::ClaimedAt).timestamp_with_time_zone())
                    .col(ColumnDef::new(UserReport::LockExpiresAt).timestamp_with_time_zone())
                    .col(ColumnDef::new(UserReport::ResolvedBy).string_len(32))
                    .col(ColumnDef::new(UserReport::ResolvedAt).timestamp_with_time_zone())
                    .col(ColumnDef::new(UserReport::ResolutionNotes).text())
                    .col(ColumnDef::new(UserReport::EscalatedFromId).string_len(32))
                    .col(
                        ColumnDef::new(UserReport::SubmittedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(UserReport::UpdatedAt).timestamp_with_time_zone())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_user_report_reporter")
                            .from(UserReport::Table, UserReport::ReporterId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_user_report_reported_user")
                            .from(UserReport::Table, UserReport::ReportedUserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Index for the escalation scan
        manager
            .create_index(
                Index::create()
                    .name("idx_user_report_status_type_submitted")
                    .table(UserReport::Table)
                    .col(UserReport::Status)
                    .col(UserReport::ReportType)
                    .col(UserReport::SubmittedAt)
                    .to_owned(),
            )
            .await?;

        // Index for the expired-lock reaper scan
        manager
            .create_index(
                Index::create()
                    .name("idx_user_report_lock")
                    .table(UserReport::Table)
                    .col(UserReport::ClaimedBy)
                    .col(UserReport::LockExpiresAt)
                    .to_owned(),
            )
            .await?;

        // Index for own-scoped listings
        manager
            .create_index(
                Index::create()
                    .name("idx_user_report_reporter_id")
                    .table(UserReport::Table)
                    .col(UserReport::ReporterId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_user_report_reported_user_id")
                    .table(UserReport::Table)
                    .col(UserReport::ReportedUserId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(UserReport::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum UserReport {
    Table,
    Id,
    ReporterId,
    ReportedUserId,
    ReportType,
    Details,
    DamagePercentage,
    RelatedRentalId,
    RelatedDeliveryId,
    Status,
    ClaimedBy,
    ClaimedAt,
    LockExpiresAt,
    ResolvedBy,
    ResolvedAt,
    ResolutionNotes,
    EscalatedFromId,
    SubmittedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum User {
    Table,
    Id,
}
