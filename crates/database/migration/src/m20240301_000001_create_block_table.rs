use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Block::Table)
                    .if_not_exists()
                    .col(big_unsigned(Block::Height).primary_key())
                    .col(integer(Block::Status))
                    .col(binary_len(Block::Commitment, 32))
                    .col(binary_len(Block::StateRoot, 32))
                    .col(big_unsigned(Block::PriorityOperations))
                    .col(binary_len(Block::PendingOnchainOperationsHash, 32))
                    .col(text(Block::PendingOnchainOperationsPubdata))
                    .col(integer(Block::BlockSize))
                    .col(big_unsigned(Block::CreatedAt))
                    .col(binary_len_null(Block::CommittedTxHash, 32))
                    .col(big_unsigned_null(Block::CommittedAt))
                    .col(binary_len_null(Block::VerifiedTxHash, 32))
                    .col(big_unsigned_null(Block::VerifiedAt))
                    .col(big_unsigned_null(Block::DeletedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_block_status")
                    .table(Block::Table)
                    .col(Block::Status)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Block::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Block {
    Table,
    Height,
    Status,
    Commitment,
    StateRoot,
    PriorityOperations,
    PendingOnchainOperationsHash,
    PendingOnchainOperationsPubdata,
    BlockSize,
    CreatedAt,
    CommittedTxHash,
    CommittedAt,
    VerifiedTxHash,
    VerifiedAt,
    DeletedAt,
}
