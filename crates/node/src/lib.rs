//! The settlement node: submits committed and proven rollup blocks to L1, tracks their
//! confirmation and rolls back the chain on operator request.

#![recursion_limit = "256"]

pub mod args;
pub use args::{Cli, Command, RollbackArgs, SettlementArgs};

mod constants;

mod signer;
pub use signer::ChannelSigner;

mod tree;
pub use tree::ExternalCommandTree;

use settlement_rollback::RollbackOrchestrator;
use settlement_sender::SenderService;
use std::{sync::Arc, time::Duration};

/// Runs the settlement service until ctrl-c is received or a fatal integrity error occurs.
pub async fn run(args: SettlementArgs) -> eyre::Result<()> {
    let (db, ctx) = args.build().await?;
    let service = SenderService::new(ctx, args.sender_args.service_config());

    tracing::info!(target: "settlement::node", "starting settlement service");
    let result = service
        .run(async {
            if let Err(err) = tokio::signal::ctrl_c().await {
                tracing::error!(target: "settlement::node", ?err, "failed to listen for ctrl-c");
            }
            tracing::info!(target: "settlement::node", "received shutdown signal");
        })
        .await;

    // The service has joined every task and dropped the context, so this is the last handle.
    let closed = match Arc::try_unwrap(db) {
        Ok(db) => db.close().await.map_err(eyre::Report::from),
        Err(_) => Err(eyre::eyre!("database still in use on exit")),
    };

    result?;
    closed
}

/// Rolls back every block at or above the requested height.
pub async fn rollback(args: RollbackArgs) -> eyre::Result<()> {
    args.validate().map_err(|e| eyre::eyre!(e))?;
    let (_db, ctx) = args.settlement_args.build().await?;
    let tree = ExternalCommandTree::new(args.tree_command.clone(), args.tree_args.clone());
    let orchestrator = RollbackOrchestrator::new(ctx, tree)
        .with_poll_interval(Duration::from_secs(args.poll_interval));

    let report = orchestrator.run(args.height).await?;
    tracing::info!(
        target: "settlement::node",
        height = args.height,
        revert_tx = ?report.revert_tx,
        purged_txs = report.purged_txs,
        deleted_proofs = report.deleted_proofs,
        deleted_witnesses = report.deleted_witnesses,
        "rollback complete"
    );
    Ok(())
}
