use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(CompressedBlock::Table)
                    .if_not_exists()
                    .col(big_unsigned(CompressedBlock::Height).primary_key())
                    .col(binary_len(CompressedBlock::StateRoot, 32))
                    .col(blob(CompressedBlock::PublicData))
                    .col(text(CompressedBlock::PublicDataOffsets))
                    .col(text(CompressedBlock::WitnessSignatures))
                    .col(big_unsigned(CompressedBlock::Timestamp))
                    .col(integer(CompressedBlock::BlockSize))
                    .col(big_unsigned_null(CompressedBlock::DeletedAt))
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(CompressedBlock::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum CompressedBlock {
    Table,
    Height,
    StateRoot,
    PublicData,
    PublicDataOffsets,
    WitnessSignatures,
    Timestamp,
    BlockSize,
    DeletedAt,
}
