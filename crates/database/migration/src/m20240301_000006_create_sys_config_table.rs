use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(SysConfig::Table)
                    .if_not_exists()
                    .col(string(SysConfig::Name).primary_key())
                    .col(text(SysConfig::Value))
                    .col(string(SysConfig::ValueType))
                    .col(text(SysConfig::Comment))
                    .col(big_unsigned_null(SysConfig::DeletedAt))
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(SysConfig::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum SysConfig {
    Table,
    Name,
    Value,
    ValueType,
    Comment,
    DeletedAt,
}
