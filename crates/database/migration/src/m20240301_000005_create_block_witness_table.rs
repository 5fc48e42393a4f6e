use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(BlockWitness::Table)
                    .if_not_exists()
                    .col(big_unsigned(BlockWitness::Height).primary_key())
                    .col(blob(BlockWitness::WitnessData))
                    .col(big_unsigned_null(BlockWitness::DeletedAt))
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(BlockWitness::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum BlockWitness {
    Table,
    Height,
    WitnessData,
    DeletedAt,
}
