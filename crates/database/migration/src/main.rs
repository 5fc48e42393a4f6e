use sea_orm_migration::prelude::*;

#[tokio::main]
async fn main() {
    tracing::info!(target: "settlement::migration", "Running database migrations.");
    cli::run_cli(settlement_migration::Migrator).await;
    tracing::info!(target: "settlement::migration", "Database migrations complete.")
}
