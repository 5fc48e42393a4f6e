use super::decode_b256;
use crate::DatabaseError;

use alloy_primitives::Bytes;
use sea_orm::{entity::prelude::*, ActiveValue};
use settlement_primitives::{Block, BlockStatus};

/// A database model that represents an L2 block.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "block")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub(crate) height: i64,
    pub(crate) status: i32,
    commitment: Vec<u8>,
    state_root: Vec<u8>,
    priority_operations: i64,
    pending_onchain_operations_hash: Vec<u8>,
    pending_onchain_operations_pubdata: String,
    block_size: i32,
    created_at: i64,
    committed_tx_hash: Option<Vec<u8>>,
    committed_at: Option<i64>,
    verified_tx_hash: Option<Vec<u8>>,
    verified_at: Option<i64>,
    deleted_at: Option<i64>,
}

/// The relation for the block model.
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

/// The active model behavior for the block model.
impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Block> for ActiveModel {
    type Error = DatabaseError;

    fn try_from(value: Block) -> Result<Self, Self::Error> {
        Ok(Self {
            height: ActiveValue::Set(value.height as i64),
            status: ActiveValue::Set(value.status.as_i32()),
            commitment: ActiveValue::Set(value.commitment.to_vec()),
            state_root: ActiveValue::Set(value.state_root.to_vec()),
            priority_operations: ActiveValue::Set(value.priority_operations as i64),
            pending_onchain_operations_hash: ActiveValue::Set(
                value.pending_onchain_operations_hash.to_vec(),
            ),
            pending_onchain_operations_pubdata: ActiveValue::Set(serde_json::to_string(
                &value.pending_onchain_operations_pubdata,
            )?),
            block_size: ActiveValue::Set(value.block_size as i32),
            created_at: ActiveValue::Set(value.created_at as i64),
            committed_tx_hash: ActiveValue::Set(value.committed_tx_hash.map(|h| h.to_vec())),
            committed_at: ActiveValue::Set(value.committed_at.map(|t| t as i64)),
            verified_tx_hash: ActiveValue::Set(value.verified_tx_hash.map(|h| h.to_vec())),
            verified_at: ActiveValue::Set(value.verified_at.map(|t| t as i64)),
            deleted_at: ActiveValue::Set(None),
        })
    }
}

impl TryFrom<Model> for Block {
    type Error = DatabaseError;

    fn try_from(value: Model) -> Result<Self, Self::Error> {
        let pending_onchain_operations_pubdata: Vec<Bytes> =
            if value.pending_onchain_operations_pubdata.is_empty() {
                Vec::new()
            } else {
                serde_json::from_str(&value.pending_onchain_operations_pubdata)?
            };

        Ok(Self {
            height: value.height as u64,
            status: BlockStatus::try_from(value.status)?,
            commitment: decode_b256(&value.commitment)?,
            state_root: decode_b256(&value.state_root)?,
            priority_operations: value.priority_operations as u64,
            pending_onchain_operations_hash: decode_b256(&value.pending_onchain_operations_hash)?,
            pending_onchain_operations_pubdata,
            block_size: value.block_size as u16,
            created_at: value.created_at as u64,
            committed_tx_hash: value.committed_tx_hash.as_deref().map(decode_b256).transpose()?,
            committed_at: value.committed_at.map(|t| t as u64),
            verified_tx_hash: value.verified_tx_hash.as_deref().map(decode_b256).transpose()?,
            verified_at: value.verified_at.map(|t| t as u64),
        })
    }
}
