pub use sea_orm_migration::prelude::*;

mod m20240301_000001_create_block_table;
mod m20240301_000002_create_compressed_block_table;
mod m20240301_000003_create_l1_rollup_tx_table;
mod m20240301_000004_create_proof_table;
mod m20240301_000005_create_block_witness_table;
mod m20240301_000006_create_sys_config_table;
mod m20240315_000001_add_l1_rollup_tx_indexes;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240301_000001_create_block_table::Migration),
            Box::new(m20240301_000002_create_compressed_block_table::Migration),
            Box::new(m20240301_000003_create_l1_rollup_tx_table::Migration),
            Box::new(m20240301_000004_create_proof_table::Migration),
            Box::new(m20240301_000005_create_block_witness_table::Migration),
            Box::new(m20240301_000006_create_sys_config_table::Migration),
            Box::new(m20240315_000001_add_l1_rollup_tx_indexes::Migration),
        ]
    }
}
