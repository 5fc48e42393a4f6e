use super::{models, DatabaseError};
use crate::DatabaseConnectionProvider;

use alloy_primitives::B256;
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect,
};
use settlement_primitives::{
    Block, BlockStatus, BlockWitness, CompressedBlock, L1RollupTx, L1RollupTxStatus,
    L1RollupTxType, Proof, ProofStatus,
};

/// The [`DatabaseOperations`] trait provides methods for interacting with the database.
#[async_trait::async_trait]
pub trait DatabaseOperations: DatabaseConnectionProvider {
    /// Insert an [`L1RollupTx`] into the ledger and return its identifier.
    async fn insert_l1_rollup_tx(&self, tx: L1RollupTx) -> Result<i64, DatabaseError> {
        tracing::trace!(target: "settlement::db", tx_hash = ?tx.tx_hash, tx_type = %tx.tx_type, height = tx.l2_block_height, nonce = tx.nonce, "Inserting rollup tx into database.");
        let tx: models::l1_rollup_tx::ActiveModel = tx.into();
        let model = tx.insert(self.get_connection()).await?;
        Ok(model.id)
    }

    /// Get the latest pending [`L1RollupTx`] of the provided type, if any.
    async fn get_latest_pending_tx(
        &self,
        tx_type: L1RollupTxType,
    ) -> Result<Option<L1RollupTx>, DatabaseError> {
        models::l1_rollup_tx::Entity::find()
            .filter(models::l1_rollup_tx::Column::TxType.eq(tx_type.as_i32()))
            .filter(models::l1_rollup_tx::Column::Status.eq(L1RollupTxStatus::Pending.as_i32()))
            .filter(models::l1_rollup_tx::Column::DeletedAt.is_null())
            .order_by_desc(models::l1_rollup_tx::Column::Id)
            .one(self.get_connection())
            .await?
            .map(TryInto::try_into)
            .transpose()
    }

    /// Get the handled [`L1RollupTx`] of the provided type carrying the highest L2 block height.
    async fn get_latest_handled_tx(
        &self,
        tx_type: L1RollupTxType,
    ) -> Result<Option<L1RollupTx>, DatabaseError> {
        models::l1_rollup_tx::Entity::find()
            .filter(models::l1_rollup_tx::Column::TxType.eq(tx_type.as_i32()))
            .filter(models::l1_rollup_tx::Column::Status.eq(L1RollupTxStatus::Handled.as_i32()))
            .filter(models::l1_rollup_tx::Column::DeletedAt.is_null())
            .order_by_desc(models::l1_rollup_tx::Column::L2BlockHeight)
            .one(self.get_connection())
            .await?
            .map(TryInto::try_into)
            .transpose()
    }

    /// Get the most recent [`L1RollupTx`] of the provided type that used `nonce`.
    ///
    /// Soft deleted rows are included: a transaction abandoned after a timeout may still sit in
    /// the L1 mempool, and its gas price is the baseline for a replacement.
    async fn get_tx_by_nonce(
        &self,
        tx_type: L1RollupTxType,
        nonce: u64,
    ) -> Result<Option<L1RollupTx>, DatabaseError> {
        models::l1_rollup_tx::Entity::find()
            .filter(models::l1_rollup_tx::Column::TxType.eq(tx_type.as_i32()))
            .filter(models::l1_rollup_tx::Column::Nonce.eq(nonce as i64))
            .order_by_desc(models::l1_rollup_tx::Column::Id)
            .one(self.get_connection())
            .await?
            .map(TryInto::try_into)
            .transpose()
    }

    /// Get all pending [`L1RollupTx`]s ordered by identifier.
    async fn get_pending_txs(&self) -> Result<Vec<L1RollupTx>, DatabaseError> {
        models::l1_rollup_tx::Entity::find()
            .filter(models::l1_rollup_tx::Column::Status.eq(L1RollupTxStatus::Pending.as_i32()))
            .filter(models::l1_rollup_tx::Column::DeletedAt.is_null())
            .order_by_asc(models::l1_rollup_tx::Column::Id)
            .all(self.get_connection())
            .await?
            .into_iter()
            .map(TryInto::try_into)
            .collect()
    }

    /// Mark the [`L1RollupTx`] with the provided identifier as handled.
    async fn mark_l1_rollup_tx_handled(&self, id: i64) -> Result<(), DatabaseError> {
        tracing::trace!(target: "settlement::db", id, "Marking rollup tx as handled.");
        let res = models::l1_rollup_tx::Entity::update_many()
            .col_expr(
                models::l1_rollup_tx::Column::Status,
                Expr::value(L1RollupTxStatus::Handled.as_i32()),
            )
            .col_expr(
                models::l1_rollup_tx::Column::UpdatedAt,
                Expr::value(settlement_primitives::unix_timestamp() as i64),
            )
            .filter(models::l1_rollup_tx::Column::Id.eq(id))
            .filter(models::l1_rollup_tx::Column::DeletedAt.is_null())
            .exec(self.get_connection())
            .await?;
        if res.rows_affected == 0 {
            return Err(DatabaseError::L1RollupTxNotFound(id));
        }
        Ok(())
    }

    /// Soft delete the [`L1RollupTx`] with the provided identifier.
    ///
    /// The row no longer counts as pending but remains visible to
    /// [`DatabaseOperations::get_tx_by_nonce`].
    async fn soft_delete_l1_rollup_tx(&self, id: i64) -> Result<(), DatabaseError> {
        tracing::trace!(target: "settlement::db", id, "Soft deleting rollup tx.");
        models::l1_rollup_tx::Entity::update_many()
            .col_expr(
                models::l1_rollup_tx::Column::DeletedAt,
                Expr::value(settlement_primitives::unix_timestamp() as i64),
            )
            .filter(models::l1_rollup_tx::Column::Id.eq(id))
            .exec(self.get_connection())
            .await?;
        Ok(())
    }

    /// Delete the [`L1RollupTx`] with the provided identifier.
    async fn delete_l1_rollup_tx(&self, id: i64) -> Result<(), DatabaseError> {
        tracing::trace!(target: "settlement::db", id, "Deleting rollup tx.");
        models::l1_rollup_tx::Entity::delete_by_id(id).exec(self.get_connection()).await?;
        Ok(())
    }

    /// Delete all [`L1RollupTx`]s of the provided type carrying a height greater than or equal
    /// to `height`, soft deleted rows included. Returns the number of deleted rows.
    async fn delete_l1_rollup_txs_ge(
        &self,
        tx_type: L1RollupTxType,
        height: u64,
    ) -> Result<u64, DatabaseError> {
        tracing::trace!(target: "settlement::db", tx_type = %tx_type, height, "Deleting rollup txs greater than or equal to height.");
        Ok(models::l1_rollup_tx::Entity::delete_many()
            .filter(models::l1_rollup_tx::Column::TxType.eq(tx_type.as_i32()))
            .filter(models::l1_rollup_tx::Column::L2BlockHeight.gte(height as i64))
            .exec(self.get_connection())
            .await?
            .rows_affected)
    }

    /// Insert a [`Block`] into the database.
    async fn insert_block(&self, block: Block) -> Result<(), DatabaseError> {
        tracing::trace!(target: "settlement::db", height = block.height, status = %block.status, "Inserting block into database.");
        let block: models::block::ActiveModel = block.try_into()?;
        block.insert(self.get_connection()).await?;
        Ok(())
    }

    /// Get the [`Block`] at the provided height.
    async fn get_block_by_height(&self, height: u64) -> Result<Option<Block>, DatabaseError> {
        models::block::Entity::find()
            .filter(models::block::Column::Height.eq(height as i64))
            .filter(models::block::Column::DeletedAt.is_null())
            .one(self.get_connection())
            .await?
            .map(TryInto::try_into)
            .transpose()
    }

    /// Get the committed [`Block`]s in the inclusive range `[start, end]`, ordered by height.
    async fn get_committed_blocks_between(
        &self,
        start: u64,
        end: u64,
    ) -> Result<Vec<Block>, DatabaseError> {
        models::block::Entity::find()
            .filter(models::block::Column::Height.between(start as i64, end as i64))
            .filter(models::block::Column::Status.eq(BlockStatus::Committed.as_i32()))
            .filter(models::block::Column::DeletedAt.is_null())
            .order_by_asc(models::block::Column::Height)
            .all(self.get_connection())
            .await?
            .into_iter()
            .map(TryInto::try_into)
            .collect()
    }

    /// Get the committed [`Block`]s at or above `height`, ordered by height.
    async fn get_committed_blocks_ge(&self, height: u64) -> Result<Vec<Block>, DatabaseError> {
        models::block::Entity::find()
            .filter(models::block::Column::Height.gte(height as i64))
            .filter(models::block::Column::Status.eq(BlockStatus::Committed.as_i32()))
            .filter(models::block::Column::DeletedAt.is_null())
            .order_by_asc(models::block::Column::Height)
            .all(self.get_connection())
            .await?
            .into_iter()
            .map(TryInto::try_into)
            .collect()
    }

    /// Get the lowest [`Block`] at or above `height` with the provided status.
    async fn get_first_block_ge_with_status(
        &self,
        height: u64,
        status: BlockStatus,
    ) -> Result<Option<Block>, DatabaseError> {
        models::block::Entity::find()
            .filter(models::block::Column::Height.gte(height as i64))
            .filter(models::block::Column::Status.eq(status.as_i32()))
            .filter(models::block::Column::DeletedAt.is_null())
            .order_by_asc(models::block::Column::Height)
            .one(self.get_connection())
            .await?
            .map(TryInto::try_into)
            .transpose()
    }

    /// Move the pending blocks at or below `height` to committed, recording the commit
    /// transaction. Returns the number of updated blocks.
    async fn mark_blocks_committed(
        &self,
        height: u64,
        tx_hash: B256,
        committed_at: u64,
    ) -> Result<u64, DatabaseError> {
        tracing::trace!(target: "settlement::db", height, ?tx_hash, "Marking blocks as committed.");
        Ok(models::block::Entity::update_many()
            .col_expr(models::block::Column::Status, Expr::value(BlockStatus::Committed.as_i32()))
            .col_expr(models::block::Column::CommittedTxHash, Expr::value(tx_hash.to_vec()))
            .col_expr(models::block::Column::CommittedAt, Expr::value(committed_at as i64))
            .filter(models::block::Column::Height.lte(height as i64))
            .filter(models::block::Column::Status.eq(BlockStatus::Pending.as_i32()))
            .filter(models::block::Column::DeletedAt.is_null())
            .exec(self.get_connection())
            .await?
            .rows_affected)
    }

    /// Move the committed blocks at or below `height` to verified and executed, recording the
    /// verification transaction. Returns the number of updated blocks.
    async fn mark_blocks_verified(
        &self,
        height: u64,
        tx_hash: B256,
        verified_at: u64,
    ) -> Result<u64, DatabaseError> {
        tracing::trace!(target: "settlement::db", height, ?tx_hash, "Marking blocks as verified.");
        Ok(models::block::Entity::update_many()
            .col_expr(
                models::block::Column::Status,
                Expr::value(BlockStatus::VerifiedAndExecuted.as_i32()),
            )
            .col_expr(models::block::Column::VerifiedTxHash, Expr::value(tx_hash.to_vec()))
            .col_expr(models::block::Column::VerifiedAt, Expr::value(verified_at as i64))
            .filter(models::block::Column::Height.lte(height as i64))
            .filter(models::block::Column::Status.eq(BlockStatus::Committed.as_i32()))
            .filter(models::block::Column::DeletedAt.is_null())
            .exec(self.get_connection())
            .await?
            .rows_affected)
    }

    /// Set the status of every block at or above `height`. Returns the number of updated
    /// blocks.
    async fn set_block_status_ge(
        &self,
        height: u64,
        status: BlockStatus,
    ) -> Result<u64, DatabaseError> {
        tracing::trace!(target: "settlement::db", height, %status, "Setting status of blocks greater than or equal to height.");
        let mut update = models::block::Entity::update_many()
            .col_expr(models::block::Column::Status, Expr::value(status.as_i32()));
        // Blocks moving back below committed lose their L1 references.
        if status < BlockStatus::Committed {
            update = update
                .col_expr(models::block::Column::CommittedTxHash, Expr::value(Option::<Vec<u8>>::None))
                .col_expr(models::block::Column::CommittedAt, Expr::value(Option::<i64>::None))
                .col_expr(models::block::Column::VerifiedTxHash, Expr::value(Option::<Vec<u8>>::None))
                .col_expr(models::block::Column::VerifiedAt, Expr::value(Option::<i64>::None));
        }
        Ok(update
            .filter(models::block::Column::Height.gte(height as i64))
            .filter(models::block::Column::DeletedAt.is_null())
            .exec(self.get_connection())
            .await?
            .rows_affected)
    }

    /// Insert a [`CompressedBlock`] into the database.
    async fn insert_compressed_block(&self, block: CompressedBlock) -> Result<(), DatabaseError> {
        tracing::trace!(target: "settlement::db", height = block.height, "Inserting compressed block into database.");
        let block: models::compressed_block::ActiveModel = block.try_into()?;
        block.insert(self.get_connection()).await?;
        Ok(())
    }

    /// Get the [`CompressedBlock`]s in the inclusive range `[start, end]`, ordered by height.
    async fn get_compressed_blocks_between(
        &self,
        start: u64,
        end: u64,
    ) -> Result<Vec<CompressedBlock>, DatabaseError> {
        models::compressed_block::Entity::find()
            .filter(models::compressed_block::Column::Height.between(start as i64, end as i64))
            .filter(models::compressed_block::Column::DeletedAt.is_null())
            .order_by_asc(models::compressed_block::Column::Height)
            .all(self.get_connection())
            .await?
            .into_iter()
            .map(TryInto::try_into)
            .collect()
    }

    /// Insert a [`Proof`] into the database.
    async fn insert_proof(&self, proof: Proof) -> Result<(), DatabaseError> {
        tracing::trace!(target: "settlement::db", height = proof.height, status = %proof.status, "Inserting proof into database.");
        let proof: models::proof::ActiveModel = proof.into();
        proof.insert(self.get_connection()).await?;
        Ok(())
    }

    /// Get the [`Proof`] at the provided height regardless of its status.
    async fn get_proof(&self, height: u64) -> Result<Option<Proof>, DatabaseError> {
        models::proof::Entity::find()
            .filter(models::proof::Column::Height.eq(height as i64))
            .filter(models::proof::Column::DeletedAt.is_null())
            .one(self.get_connection())
            .await?
            .map(TryInto::try_into)
            .transpose()
    }

    /// Get the sendable [`Proof`]s in the inclusive range `[start, end]`, ordered by height.
    ///
    /// Proofs that are still [`ProofStatus::NotSent`] are excluded.
    async fn get_proofs_between(&self, start: u64, end: u64) -> Result<Vec<Proof>, DatabaseError> {
        models::proof::Entity::find()
            .filter(models::proof::Column::Height.between(start as i64, end as i64))
            .filter(models::proof::Column::Status.ne(ProofStatus::NotSent.as_i32()))
            .filter(models::proof::Column::DeletedAt.is_null())
            .order_by_asc(models::proof::Column::Height)
            .all(self.get_connection())
            .await?
            .into_iter()
            .map(TryInto::try_into)
            .collect()
    }

    /// Mark every unconfirmed proof at or below `height` as confirmed. Returns the number of
    /// updated proofs.
    async fn confirm_proofs_le(&self, height: u64) -> Result<u64, DatabaseError> {
        tracing::trace!(target: "settlement::db", height, "Confirming proofs.");
        Ok(models::proof::Entity::update_many()
            .col_expr(models::proof::Column::Status, Expr::value(ProofStatus::Confirmed.as_i32()))
            .filter(models::proof::Column::Height.lte(height as i64))
            .filter(models::proof::Column::Status.eq(ProofStatus::NotConfirmed.as_i32()))
            .filter(models::proof::Column::DeletedAt.is_null())
            .exec(self.get_connection())
            .await?
            .rows_affected)
    }

    /// Delete all [`Proof`]s at or above `height`. Returns the number of deleted rows.
    async fn delete_proofs_ge(&self, height: u64) -> Result<u64, DatabaseError> {
        tracing::trace!(target: "settlement::db", height, "Deleting proofs greater than or equal to height.");
        Ok(models::proof::Entity::delete_many()
            .filter(models::proof::Column::Height.gte(height as i64))
            .exec(self.get_connection())
            .await?
            .rows_affected)
    }

    /// Insert a [`BlockWitness`] into the database.
    async fn insert_block_witness(&self, witness: BlockWitness) -> Result<(), DatabaseError> {
        tracing::trace!(target: "settlement::db", height = witness.height, "Inserting block witness into database.");
        let witness: models::block_witness::ActiveModel = witness.into();
        witness.insert(self.get_connection()).await?;
        Ok(())
    }

    /// Get the height of the latest [`BlockWitness`].
    async fn get_latest_block_witness_height(&self) -> Result<Option<u64>, DatabaseError> {
        Ok(models::block_witness::Entity::find()
            .filter(models::block_witness::Column::DeletedAt.is_null())
            .order_by_desc(models::block_witness::Column::Height)
            .select_only()
            .column(models::block_witness::Column::Height)
            .into_tuple::<i64>()
            .one(self.get_connection())
            .await?
            .map(|height| height as u64))
    }

    /// Delete all [`BlockWitness`]es at or above `height`. Returns the number of deleted rows.
    async fn delete_block_witnesses_ge(&self, height: u64) -> Result<u64, DatabaseError> {
        tracing::trace!(target: "settlement::db", height, "Deleting block witnesses greater than or equal to height.");
        Ok(models::block_witness::Entity::delete_many()
            .filter(models::block_witness::Column::Height.gte(height as i64))
            .exec(self.get_connection())
            .await?
            .rows_affected)
    }

    /// Insert or replace the system configuration entry `name`.
    async fn set_sys_config(&self, name: &str, value: &str) -> Result<(), DatabaseError> {
        tracing::trace!(target: "settlement::db", name, "Writing system configuration.");
        models::sys_config::Entity::delete_by_id(name.to_string())
            .exec(self.get_connection())
            .await?;
        models::sys_config::ActiveModel::string(name, value).insert(self.get_connection()).await?;
        Ok(())
    }

    /// Get the value of the system configuration entry `name`.
    async fn get_sys_config(&self, name: &str) -> Result<Option<String>, DatabaseError> {
        Ok(models::sys_config::Entity::find_by_id(name.to_string())
            .filter(models::sys_config::Column::DeletedAt.is_null())
            .one(self.get_connection())
            .await?
            .map(|model| model.value))
    }
}

impl<T> DatabaseOperations for T where T: DatabaseConnectionProvider {}
