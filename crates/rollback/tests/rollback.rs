//! Rollback scenarios against an in-memory database and a scripted L1.

use alloy_primitives::{address, Address, Bytes, Log, B256};
use alloy_sol_types::{SolCall, SolEvent};
use parking_lot::Mutex;
use settlement_db::{test_utils::setup_test_db, DatabaseOperations};
use settlement_l1::{revertBlocksCall, test_utils::MockChainClient, BlocksRevert};
use settlement_primitives::{
    Block, BlockStatus, BlockWitness, L1RollupTx, L1RollupTxStatus, L1RollupTxType, Proof,
    ProofStatus,
};
use settlement_rollback::{RollbackError, RollbackOrchestrator, TreeStorage, TreeStorageError};
use settlement_sender::{SenderConfig, SenderContext};
use std::{sync::Arc, time::Duration};

const CONTRACT: Address = address!("00000000000000000000000000000000000000aa");
const COMMIT_SIGNER: Address = address!("0000000000000000000000000000000000000001");

type Context = Arc<SenderContext<Arc<MockChainClient>>>;

#[derive(Debug, Default)]
struct MockTree {
    rollbacks: Mutex<Vec<u64>>,
    fail: bool,
}

#[async_trait::async_trait]
impl TreeStorage for MockTree {
    async fn rollback_to(&self, height: u64) -> Result<(), TreeStorageError> {
        if self.fail {
            return Err(TreeStorageError::Failed { height, reason: "unavailable".to_string() });
        }
        self.rollbacks.lock().push(height);
        Ok(())
    }
}

fn config() -> SenderConfig {
    SenderConfig {
        rollup_contract: CONTRACT,
        commit_signer: COMMIT_SIGNER,
        verify_signer: address!("0000000000000000000000000000000000000002"),
        ..Default::default()
    }
}

/// Blocks and proofs 1 to 5 committed, witnesses 1 to 5, commits handled at heights 2 and 5.
async fn setup_with(config: SenderConfig) -> (Context, Arc<MockChainClient>) {
    let db = Arc::new(setup_test_db().await);
    for height in 1..=5u64 {
        db.insert_block(Block {
            height,
            status: BlockStatus::Committed,
            state_root: B256::with_last_byte(height as u8),
            committed_tx_hash: Some(B256::repeat_byte(0xc0)),
            committed_at: Some(1),
            ..Default::default()
        })
        .await
        .unwrap();
        db.insert_proof(Proof {
            height,
            proof_info: "{}".to_string(),
            status: ProofStatus::Confirmed,
        })
        .await
        .unwrap();
        db.insert_block_witness(BlockWitness { height, witness_data: Bytes::from(vec![1, 2]) })
            .await
            .unwrap();
    }
    for (nonce, height) in [(0, 2), (1, 5)] {
        db.insert_l1_rollup_tx(L1RollupTx {
            status: L1RollupTxStatus::Handled,
            ..L1RollupTx::pending(
                B256::with_last_byte(height as u8),
                L1RollupTxType::Commit,
                height,
                nonce,
                100,
            )
        })
        .await
        .unwrap();
    }

    let client = Arc::new(MockChainClient::new(100));
    client.set_nonce(COMMIT_SIGNER, 2);
    client.set_latest_block(20);
    (Arc::new(SenderContext::new(db, client.clone(), config)), client)
}

fn revert_log() -> Log {
    Log {
        address: CONTRACT,
        data: BlocksRevert { totalBlocksVerified: 0, totalBlocksCommitted: 2 }.encode_log_data(),
    }
}

async fn status(ctx: &Context, height: u64) -> BlockStatus {
    ctx.database.get_block_by_height(height).await.unwrap().unwrap().status
}

#[tokio::test]
async fn test_rollback_to_height() {
    let (ctx, client) = setup_with(config()).await;
    client.auto_mine(10, true, vec![revert_log()]);
    let tree = Arc::new(MockTree::default());
    let orchestrator = RollbackOrchestrator::new(ctx.clone(), tree.clone());

    let report = orchestrator.run(3).await.unwrap();
    assert!(report.revert_tx.is_some());
    assert_eq!(report.purged_txs, 1);
    assert_eq!(report.deleted_proofs, 3);
    assert_eq!(report.deleted_witnesses, 3);

    let sent = client.sent_transactions();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].1.nonce, 2);
    let call = revertBlocksCall::abi_decode(&sent[0].1.input).unwrap();
    let reverted: Vec<_> = call._blocksToRevert.iter().map(|h| h.blockNumber).collect();
    assert_eq!(reverted, vec![5, 4, 3]);

    for height in 1..=2 {
        assert_eq!(status(&ctx, height).await, BlockStatus::Committed);
        assert!(ctx.database.get_proof(height).await.unwrap().is_some());
    }
    for height in 3..=5 {
        let block = ctx.database.get_block_by_height(height).await.unwrap().unwrap();
        assert_eq!(block.status, BlockStatus::Proposing);
        assert_eq!(block.committed_tx_hash, None);
        assert!(ctx.database.get_proof(height).await.unwrap().is_none());
    }
    assert_eq!(ctx.database.get_latest_block_witness_height().await.unwrap(), Some(2));
    let last_commit =
        ctx.database.get_latest_handled_tx(L1RollupTxType::Commit).await.unwrap().unwrap();
    assert_eq!(last_commit.l2_block_height, 2);
    assert_eq!(*tree.rollbacks.lock(), vec![2]);
}

#[tokio::test]
async fn test_rollback_is_idempotent() {
    let (ctx, client) = setup_with(config()).await;
    client.auto_mine(10, true, vec![revert_log()]);
    let tree = Arc::new(MockTree::default());
    let orchestrator = RollbackOrchestrator::new(ctx.clone(), tree.clone());

    orchestrator.run(3).await.unwrap();
    let report = orchestrator.run(3).await.unwrap();

    assert_eq!(report, Default::default());
    assert_eq!(client.sent_transactions().len(), 1);
    assert_eq!(*tree.rollbacks.lock(), vec![2, 2]);
    for height in 3..=5 {
        assert_eq!(status(&ctx, height).await, BlockStatus::Proposing);
    }
    assert_eq!(status(&ctx, 2).await, BlockStatus::Committed);
}

#[tokio::test]
async fn test_rollback_rejects_zero_height() {
    let (ctx, client) = setup_with(config()).await;
    let orchestrator = RollbackOrchestrator::new(ctx.clone(), MockTree::default());

    assert!(matches!(orchestrator.run(0).await, Err(RollbackError::ZeroHeight)));
    assert_eq!(client.calls(), 0);
    assert_eq!(status(&ctx, 1).await, BlockStatus::Committed);
}

#[tokio::test]
async fn test_failed_revert_aborts_rollback() {
    let (ctx, client) = setup_with(config()).await;
    client.auto_mine(10, false, vec![]);
    let tree = Arc::new(MockTree::default());
    let orchestrator = RollbackOrchestrator::new(ctx.clone(), tree.clone());

    assert!(matches!(orchestrator.run(3).await, Err(RollbackError::RevertFailed(_))));
    assert_eq!(status(&ctx, 3).await, BlockStatus::Committed);
    assert!(ctx.database.get_proof(3).await.unwrap().is_some());
    assert!(tree.rollbacks.lock().is_empty());
}

#[tokio::test]
async fn test_unconfirmed_revert_times_out() {
    let (ctx, _client) = setup_with(SenderConfig {
        max_waiting_time: Duration::from_millis(50),
        ..config()
    })
    .await;
    let orchestrator = RollbackOrchestrator::new(ctx.clone(), MockTree::default())
        .with_poll_interval(Duration::from_millis(10));

    assert!(matches!(orchestrator.run(3).await, Err(RollbackError::RevertTimeout { .. })));
    assert_eq!(status(&ctx, 4).await, BlockStatus::Committed);
}

#[tokio::test]
async fn test_tree_failure_stops_before_witnesses() {
    let (ctx, client) = setup_with(config()).await;
    client.auto_mine(10, true, vec![]);
    let orchestrator =
        RollbackOrchestrator::new(ctx.clone(), MockTree { fail: true, ..Default::default() });

    assert!(matches!(orchestrator.run(3).await, Err(RollbackError::TreeStorage(_))));
    assert_eq!(status(&ctx, 3).await, BlockStatus::Pending);
    assert!(ctx.database.get_proof(3).await.unwrap().is_none());
    assert_eq!(ctx.database.get_latest_block_witness_height().await.unwrap(), Some(5));

    // resuming once the tree is reachable completes the rollback
    let tree = Arc::new(MockTree::default());
    RollbackOrchestrator::new(ctx.clone(), tree.clone()).run(3).await.unwrap();
    assert_eq!(status(&ctx, 3).await, BlockStatus::Proposing);
    assert_eq!(ctx.database.get_latest_block_witness_height().await.unwrap(), Some(2));
    assert_eq!(client.sent_transactions().len(), 1);
}

#[tokio::test]
async fn test_rollback_refuses_verified_blocks() {
    let (ctx, client) = setup_with(config()).await;
    ctx.database.mark_blocks_verified(3, B256::repeat_byte(0xee), 2).await.unwrap();
    let tree = Arc::new(MockTree::default());
    let orchestrator = RollbackOrchestrator::new(ctx.clone(), tree.clone());

    // a target at or below a verified block is refused before any step
    for height in [1, 3] {
        assert!(matches!(
            orchestrator.run(height).await,
            Err(RollbackError::VerifiedBlock { height: verified }) if verified == height
        ));
    }
    assert!(matches!(
        orchestrator.run(2).await,
        Err(RollbackError::VerifiedBlock { height: 2 })
    ));
    assert_eq!(client.calls(), 0);
    assert!(tree.rollbacks.lock().is_empty());
    for height in 1..=3 {
        assert_eq!(status(&ctx, height).await, BlockStatus::VerifiedAndExecuted);
        assert!(ctx.database.get_proof(height).await.unwrap().is_some());
    }
    assert_eq!(ctx.database.get_latest_block_witness_height().await.unwrap(), Some(5));

    // only committed blocks above the verified prefix can be rolled back
    client.auto_mine(10, true, vec![revert_log()]);
    orchestrator.run(4).await.unwrap();
    assert_eq!(status(&ctx, 3).await, BlockStatus::VerifiedAndExecuted);
    assert_eq!(status(&ctx, 4).await, BlockStatus::Proposing);
    let call = revertBlocksCall::abi_decode(&client.sent_transactions()[0].1.input).unwrap();
    let reverted: Vec<_> = call._blocksToRevert.iter().map(|h| h.blockNumber).collect();
    assert_eq!(reverted, vec![5, 4]);
}
