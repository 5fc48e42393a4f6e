use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Proof::Table)
                    .if_not_exists()
                    .col(big_unsigned(Proof::Height).primary_key())
                    .col(text(Proof::ProofInfo))
                    .col(integer(Proof::Status))
                    .col(big_unsigned_null(Proof::DeletedAt))
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Proof::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Proof {
    Table,
    Height,
    ProofInfo,
    Status,
    DeletedAt,
}
