//! Rewrite complaint rows that still carry pre-release category values.
//!
//! `electricity` became `electrical` and `wifi` became `internet`.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

/// (legacy, canonical)
const CATEGORY_RENAMES: [(&str, &str); 2] = [("electricity", "electrical"), ("wifi", "internet")];

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        for (legacy, canonical) in CATEGORY_RENAMES {
            manager
                .exec_stmt(
                    Query::update()
                        .table(Complaint::Table)
                        .value(Complaint::Category, canonical)
                        .and_where(Expr::col(Complaint::Category).eq(legacy))
                        .to_owned(),
                )
                .await?;
        }

        // Block names are compared upper-cased everywhere.
        manager
            .exec_stmt(
                Query::update()
                    .table(Complaint::Table)
                    .value(
                        Complaint::Block,
                        Func::upper(Expr::col(Complaint::Block)),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, _manager: &SchemaManager) -> Result<(), DbErr> {
        // Legacy values are not restored.
        Ok(())
    }
}

#[derive(Iden)]
enum Complaint {
    Table,
    Category,
    Block,
}
