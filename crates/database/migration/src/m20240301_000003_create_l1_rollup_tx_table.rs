use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(L1RollupTx::Table)
                    .if_not_exists()
                    .col(pk_auto(L1RollupTx::Id))
                    .col(binary_len(L1RollupTx::TxHash, 32))
                    .col(integer(L1RollupTx::TxType))
                    .col(integer(L1RollupTx::Status))
                    .col(big_unsigned(L1RollupTx::L2BlockHeight))
                    .col(big_unsigned(L1RollupTx::Nonce))
                    .col(text(L1RollupTx::GasPrice))
                    .col(big_unsigned(L1RollupTx::CreatedAt))
                    .col(big_unsigned(L1RollupTx::UpdatedAt))
                    .col(big_unsigned_null(L1RollupTx::DeletedAt))
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(L1RollupTx::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
pub(crate) enum L1RollupTx {
    Table,
    Id,
    TxHash,
    TxType,
    Status,
    L2BlockHeight,
    Nonce,
    GasPrice,
    CreatedAt,
    UpdatedAt,
    DeletedAt,
}
