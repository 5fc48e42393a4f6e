use super::{transaction::DatabaseTransaction, DatabaseConnectionProvider};
use crate::error::DatabaseError;

use sea_orm::{Database as SeaOrmDatabase, DatabaseConnection, TransactionTrait};

/// The [`Database`] struct is responsible for interacting with the database.
///
/// The [`Database`] type wraps a [`sea_orm::DatabaseConnection`]. We implement
/// [`DatabaseConnectionProvider`] for [`Database`] such that it can be used to perform the
/// operations defined in [`crate::DatabaseOperations`]. Atomic operations can be performed using
/// the [`Database::tx`] method which returns a [`DatabaseTransaction`] that also implements the
/// [`DatabaseConnectionProvider`] trait and also the [`crate::DatabaseOperations`] trait.
#[derive(Debug)]
pub struct Database {
    /// The underlying database connection.
    connection: DatabaseConnection,
}

impl Database {
    /// Creates a new [`Database`] instance associated with the provided database URL.
    pub async fn new(database_url: &str) -> Result<Self, DatabaseError> {
        let connection = SeaOrmDatabase::connect(database_url).await?;
        Ok(Self { connection })
    }

    /// Creates a new [`DatabaseTransaction`] which can be used for atomic operations.
    pub async fn tx(&self) -> Result<DatabaseTransaction, DatabaseError> {
        Ok(DatabaseTransaction::new(self.connection.begin().await?))
    }

    /// Closes the underlying connection pool.
    pub async fn close(self) -> Result<(), DatabaseError> {
        tracing::debug!(target: "settlement::db", "Closing database connection");
        self.connection.close().await?;
        Ok(())
    }
}

impl DatabaseConnectionProvider for Database {
    type Connection = DatabaseConnection;

    fn get_connection(&self) -> &Self::Connection {
        &self.connection
    }
}

impl From<DatabaseConnection> for Database {
    fn from(connection: DatabaseConnection) -> Self {
        Self { connection }
    }
}

#[cfg(test)]
mod test {
    use super::Database;
    use crate::operations::DatabaseOperations;
    use alloy_primitives::{Bytes, B256};
    use sea_orm::DatabaseConnection;
    use settlement_migration::{Migrator, MigratorTrait};
    use settlement_primitives::{
        Block, BlockStatus, BlockWitness, CompressedBlock, L1RollupTx, L1RollupTxStatus,
        L1RollupTxType, Proof, ProofStatus,
    };
    use std::collections::BTreeMap;

    async fn setup_test_db() -> Database {
        let connection: DatabaseConnection =
            sea_orm::Database::connect("sqlite::memory:").await.unwrap();
        Migrator::up(&connection, None).await.unwrap();
        connection.into()
    }

    fn random_hash() -> B256 {
        B256::from(rand::random::<[u8; 32]>())
    }

    fn block(height: u64, status: BlockStatus) -> Block {
        Block {
            height,
            status,
            commitment: random_hash(),
            state_root: random_hash(),
            pending_onchain_operations_pubdata: vec![Bytes::from(vec![height as u8; 4])],
            block_size: 8,
            created_at: 1_700_000_000_000 + height,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_database_ledger_pending_and_handled() {
        // Set up the test database.
        let db = setup_test_db().await;

        // Insert a pending commit tx.
        let tx = L1RollupTx::pending(random_hash(), L1RollupTxType::Commit, 5, 7, 1_000_000_000);
        let id = db.insert_l1_rollup_tx(tx.clone()).await.unwrap();

        // The commit channel has a pending tx, the verify channel does not.
        let pending = db.get_latest_pending_tx(L1RollupTxType::Commit).await.unwrap().unwrap();
        assert_eq!(pending.id, Some(id));
        assert_eq!(pending.tx_hash, tx.tx_hash);
        assert_eq!(pending.gas_price, 1_000_000_000);
        assert!(db.get_latest_pending_tx(L1RollupTxType::VerifyAndExecute).await.unwrap().is_none());
        assert!(db.get_latest_handled_tx(L1RollupTxType::Commit).await.unwrap().is_none());

        // Mark it handled.
        db.mark_l1_rollup_tx_handled(id).await.unwrap();
        assert!(db.get_latest_pending_tx(L1RollupTxType::Commit).await.unwrap().is_none());
        let handled = db.get_latest_handled_tx(L1RollupTxType::Commit).await.unwrap().unwrap();
        assert_eq!(handled.status, L1RollupTxStatus::Handled);
        assert_eq!(handled.l2_block_height, 5);

        // Marking an unknown tx fails.
        assert!(db.mark_l1_rollup_tx_handled(id + 100).await.is_err());
    }

    #[tokio::test]
    async fn test_database_latest_handled_tx_by_height() {
        // Set up the test database.
        let db = setup_test_db().await;

        for (height, nonce) in [(3u64, 0u64), (9, 2), (6, 1)] {
            let tx = L1RollupTx::pending(random_hash(), L1RollupTxType::Commit, height, nonce, 1);
            let id = db.insert_l1_rollup_tx(tx).await.unwrap();
            db.mark_l1_rollup_tx_handled(id).await.unwrap();
        }

        let handled = db.get_latest_handled_tx(L1RollupTxType::Commit).await.unwrap().unwrap();
        assert_eq!(handled.l2_block_height, 9);
    }

    #[tokio::test]
    async fn test_database_soft_deleted_tx_visible_by_nonce() {
        // Set up the test database.
        let db = setup_test_db().await;

        let tx = L1RollupTx::pending(random_hash(), L1RollupTxType::VerifyAndExecute, 4, 11, 42);
        let id = db.insert_l1_rollup_tx(tx.clone()).await.unwrap();
        db.soft_delete_l1_rollup_tx(id).await.unwrap();

        // The slot is free but the nonce lookup still sees the row.
        assert!(db.get_pending_txs().await.unwrap().is_empty());
        let by_nonce =
            db.get_tx_by_nonce(L1RollupTxType::VerifyAndExecute, 11).await.unwrap().unwrap();
        assert_eq!(by_nonce.tx_hash, tx.tx_hash);
        assert!(db.get_tx_by_nonce(L1RollupTxType::Commit, 11).await.unwrap().is_none());

        // Soft deleted rows can not be marked handled.
        assert!(db.mark_l1_rollup_tx_handled(id).await.is_err());
    }

    #[tokio::test]
    async fn test_database_tx() {
        // Setup the test database.
        let db = setup_test_db().await;

        // Insert two txs in a database transaction and commit.
        let tx = db.tx().await.unwrap();
        tx.insert_l1_rollup_tx(L1RollupTx::pending(random_hash(), L1RollupTxType::Commit, 1, 0, 1))
            .await
            .unwrap();
        tx.insert_l1_rollup_tx(L1RollupTx::pending(
            random_hash(),
            L1RollupTxType::VerifyAndExecute,
            1,
            0,
            1,
        ))
        .await
        .unwrap();
        tx.commit().await.unwrap();
        assert_eq!(db.get_pending_txs().await.unwrap().len(), 2);

        // A rolled back transaction leaves no trace.
        let tx = db.tx().await.unwrap();
        for pending in tx.get_pending_txs().await.unwrap() {
            tx.delete_l1_rollup_tx(pending.id.unwrap()).await.unwrap();
        }
        tx.rollback().await.unwrap();
        assert_eq!(db.get_pending_txs().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_database_compressed_blocks_between() {
        // Set up the test database.
        let db = setup_test_db().await;

        for height in [3u64, 1, 2, 5] {
            let mut witness_signatures = BTreeMap::new();
            witness_signatures.insert(4u32, Bytes::from(vec![0xab; 65]));
            db.insert_compressed_block(CompressedBlock {
                height,
                state_root: random_hash(),
                public_data: Bytes::from(vec![1u8; 32]),
                public_data_offsets: vec![0, 4],
                witness_signatures,
                timestamp: 1_700_000_000 + height,
                block_size: 2,
            })
            .await
            .unwrap();
        }

        let blocks = db.get_compressed_blocks_between(1, 4).await.unwrap();
        let heights: Vec<_> = blocks.iter().map(|b| b.height).collect();
        assert_eq!(heights, vec![1, 2, 3]);
        assert_eq!(blocks[0].public_data_offsets, vec![0, 4]);
        assert_eq!(blocks[0].witness_signatures.get(&4).map(|s| s.len()), Some(65));
        assert!(db.get_compressed_blocks_between(6, 10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_database_block_status_transitions() {
        // Set up the test database.
        let db = setup_test_db().await;

        for height in 1..=5 {
            db.insert_block(block(height, BlockStatus::Pending)).await.unwrap();
        }
        let stored = db.get_block_by_height(2).await.unwrap().unwrap();
        assert_eq!(stored.pending_onchain_operations_pubdata, vec![Bytes::from(vec![2u8; 4])]);

        // Commit up to height 3.
        let commit_hash = random_hash();
        assert_eq!(db.mark_blocks_committed(3, commit_hash, 100).await.unwrap(), 3);
        let committed = db.get_committed_blocks_between(1, 5).await.unwrap();
        assert_eq!(committed.len(), 3);
        assert_eq!(committed[2].committed_tx_hash, Some(commit_hash));
        assert_eq!(committed[2].committed_at, Some(100));

        // Verify up to height 2.
        assert_eq!(db.mark_blocks_verified(2, random_hash(), 200).await.unwrap(), 2);
        assert_eq!(db.get_committed_blocks_ge(1).await.unwrap().len(), 1);
        let verified = db.get_block_by_height(1).await.unwrap().unwrap();
        assert_eq!(verified.status, BlockStatus::VerifiedAndExecuted);

        // Resetting to pending clears the L1 references.
        assert_eq!(db.set_block_status_ge(3, BlockStatus::Pending).await.unwrap(), 3);
        let reset = db.get_block_by_height(3).await.unwrap().unwrap();
        assert_eq!(reset.status, BlockStatus::Pending);
        assert_eq!(reset.committed_tx_hash, None);
        assert_eq!(reset.committed_at, None);
    }

    #[tokio::test]
    async fn test_database_proofs() {
        // Set up the test database.
        let db = setup_test_db().await;

        for (height, status) in [
            (1u64, ProofStatus::NotConfirmed),
            (2, ProofStatus::NotConfirmed),
            (3, ProofStatus::NotSent),
        ] {
            db.insert_proof(Proof { height, proof_info: "{}".to_string(), status }).await.unwrap();
        }

        // Proofs that are not sent yet are excluded.
        let proofs = db.get_proofs_between(1, 3).await.unwrap();
        assert_eq!(proofs.iter().map(|p| p.height).collect::<Vec<_>>(), vec![1, 2]);

        // Confirm up to height 2.
        assert_eq!(db.confirm_proofs_le(2).await.unwrap(), 2);
        assert_eq!(db.get_proof(2).await.unwrap().unwrap().status, ProofStatus::Confirmed);
        assert_eq!(db.get_proof(3).await.unwrap().unwrap().status, ProofStatus::NotSent);

        // Deleting is idempotent.
        assert_eq!(db.delete_proofs_ge(2).await.unwrap(), 2);
        assert_eq!(db.delete_proofs_ge(2).await.unwrap(), 0);
        assert!(db.get_proof(1).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_database_delete_ge() {
        // Set up the test database.
        let db = setup_test_db().await;

        for height in 1..=4u64 {
            db.insert_block_witness(BlockWitness {
                height,
                witness_data: Bytes::from(vec![height as u8]),
            })
            .await
            .unwrap();
            db.insert_l1_rollup_tx(L1RollupTx::pending(
                random_hash(),
                L1RollupTxType::Commit,
                height,
                height,
                1,
            ))
            .await
            .unwrap();
        }
        db.insert_l1_rollup_tx(L1RollupTx::pending(
            random_hash(),
            L1RollupTxType::VerifyAndExecute,
            4,
            0,
            1,
        ))
        .await
        .unwrap();

        assert_eq!(db.delete_block_witnesses_ge(3).await.unwrap(), 2);
        assert_eq!(db.get_latest_block_witness_height().await.unwrap(), Some(2));

        // Only the commit channel is purged.
        assert_eq!(db.delete_l1_rollup_txs_ge(L1RollupTxType::Commit, 3).await.unwrap(), 2);
        assert_eq!(db.delete_l1_rollup_txs_ge(L1RollupTxType::Commit, 3).await.unwrap(), 0);
        let pending = db.get_pending_txs().await.unwrap();
        assert_eq!(pending.len(), 3);
        assert!(pending.iter().any(|tx| tx.tx_type == L1RollupTxType::VerifyAndExecute));
    }

    #[tokio::test]
    async fn test_database_sys_config() {
        // Set up the test database.
        let db = setup_test_db().await;

        assert!(db.get_sys_config("L1RpcEndpoint").await.unwrap().is_none());
        db.set_sys_config("L1RpcEndpoint", "http://localhost:8545").await.unwrap();
        db.set_sys_config("L1RpcEndpoint", "http://localhost:8546").await.unwrap();
        assert_eq!(
            db.get_sys_config("L1RpcEndpoint").await.unwrap().as_deref(),
            Some("http://localhost:8546")
        );
    }

    #[tokio::test]
    async fn test_database_first_block_ge_with_status() {
        // Set up the test database.
        let db = setup_test_db().await;

        for (height, status) in [
            (1, BlockStatus::VerifiedAndExecuted),
            (2, BlockStatus::Committed),
            (3, BlockStatus::VerifiedAndExecuted),
            (4, BlockStatus::Committed),
        ] {
            db.insert_block(block(height, status)).await.unwrap();
        }

        for (height, expected) in [(1, Some(1)), (2, Some(3)), (4, None)] {
            let first = db
                .get_first_block_ge_with_status(height, BlockStatus::VerifiedAndExecuted)
                .await
                .unwrap()
                .map(|block| block.height);
            assert_eq!(first, expected);
        }
    }
}
