use super::m20240301_000003_create_l1_rollup_tx_table::L1RollupTx;
use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Lookup of the in flight transaction per channel.
        manager
            .create_index(
                Index::create()
                    .name("idx_l1_rollup_tx_type_status")
                    .table(L1RollupTx::Table)
                    .col(L1RollupTx::TxType)
                    .col(L1RollupTx::Status)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_l1_rollup_tx_type_nonce")
                    .table(L1RollupTx::Table)
                    .col(L1RollupTx::TxType)
                    .col(L1RollupTx::Nonce)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_l1_rollup_tx_type_nonce").to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_l1_rollup_tx_type_status").to_owned())
            .await
    }
}
