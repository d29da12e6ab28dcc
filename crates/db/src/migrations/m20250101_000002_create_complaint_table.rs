//! Create complaint table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Complaint::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Complaint::Id).string_len(32).not_null().primary_key())
                    .col(ColumnDef::new(Complaint::Title).string_len(256).not_null())
                    .col(ColumnDef::new(Complaint::Description).text().not_null())
                    .col(ColumnDef::new(Complaint::Category).string_len(16).not_null())
                    .col(ColumnDef::new(Complaint::Block).string_len(64).not_null())
                    .col(ColumnDef::new(Complaint::Status).string_len(16).not_null().default("Open"))
                    .col(ColumnDef::new(Complaint::Urgency).string_len(8).not_null().default("Low"))
                    .col(ColumnDef::new(Complaint::AiTags).json_binary().not_null().default("[]"))
                    .col(ColumnDef::new(Complaint::Images).json_binary().not_null().default("[]"))
                    .col(ColumnDef::new(Complaint::StudentId).string_len(32).not_null())
                    .col(ColumnDef::new(Complaint::WardenId).string_len(32))
                    .col(ColumnDef::new(Complaint::Comments).json_binary().not_null().default("[]"))
                    .col(ColumnDef::new(Complaint::AssignedAt).timestamp_with_time_zone())
                    .col(ColumnDef::new(Complaint::ResolvedAt).timestamp_with_time_zone())
                    .col(
                        ColumnDef::new(Complaint::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(Complaint::UpdatedAt).timestamp_with_time_zone())
                    .to_owned(),
            )
            .await?;

        // Index: student_id (own complaints)
        manager
            .create_index(
                Index::create()
                    .name("idx_complaint_student_id")
                    .table(Complaint::Table)
                    .col(Complaint::StudentId)
                    .to_owned(),
            )
            .await?;

        // Index: warden_id (assigned complaints)
        manager
            .create_index(
                Index::create()
                    .name("idx_complaint_warden_id")
                    .table(Complaint::Table)
                    .col(Complaint::WardenId)
                    .to_owned(),
            )
            .await?;

        // Composite index: (block, category) for hotspots
        manager
            .create_index(
                Index::create()
                    .name("idx_complaint_block_category")
                    .table(Complaint::Table)
                    .col(Complaint::Block)
                    .col(Complaint::Category)
                    .to_owned(),
            )
            .await?;

        // Index: status
        manager
            .create_index(
                Index::create()
                    .name("idx_complaint_status")
                    .table(Complaint::Table)
                    .col(Complaint::Status)
                    .to_owned(),
            )
            .await?;

        // Foreign key: student_id -> user.id
        manager
            .create_foreign_key(
                ForeignKey::create()
                    .name("fk_complaint_student_id")
                    .from(Complaint::Table, Complaint::StudentId)
                    .to(User::Table, User::Id)
                    .on_delete(ForeignKeyAction::Cascade)
                    .to_owned(),
            )
            .await?;

        // Foreign key: warden_id -> user.id
        manager
            .create_foreign_key(
                ForeignKey::create()
                    .name("fk_complaint_warden_id")
                    .from(Complaint::Table, Complaint::WardenId)
                    .to(User::Table, User::Id)
                    .on_delete(ForeignKeyAction::SetNull)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Complaint::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Complaint {
    Table,
    Id,
    Title,
    Description,
    Category,
    Block,
    Status,
    Urgency,
    AiTags,
    Images,
    StudentId,
    WardenId,
    Comments,
    AssignedAt,
    ResolvedAt,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum User {
    Table,
    Id,
}
