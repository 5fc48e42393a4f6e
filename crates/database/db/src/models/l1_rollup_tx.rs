use super::decode_b256;
use crate::DatabaseError;

use sea_orm::{entity::prelude::*, ActiveValue};
use settlement_primitives::{L1RollupTx, L1RollupTxStatus, L1RollupTxType};

/// A database model that represents a transaction broadcast to L1.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "l1_rollup_tx")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub(crate) id: i64,
    tx_hash: Vec<u8>,
    tx_type: i32,
    status: i32,
    l2_block_height: i64,
    nonce: i64,
    gas_price: String,
    created_at: i64,
    updated_at: i64,
    deleted_at: Option<i64>,
}

/// The relation for the rollup tx model.
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

/// The active model behavior for the rollup tx model.
impl ActiveModelBehavior for ActiveModel {}

impl From<L1RollupTx> for ActiveModel {
    fn from(value: L1RollupTx) -> Self {
        Self {
            id: value.id.map(ActiveValue::Set).unwrap_or(ActiveValue::NotSet),
            tx_hash: ActiveValue::Set(value.tx_hash.to_vec()),
            tx_type: ActiveValue::Set(value.tx_type.as_i32()),
            status: ActiveValue::Set(value.status.as_i32()),
            l2_block_height: ActiveValue::Set(value.l2_block_height as i64),
            nonce: ActiveValue::Set(value.nonce as i64),
            gas_price: ActiveValue::Set(value.gas_price.to_string()),
            created_at: ActiveValue::Set(value.created_at as i64),
            updated_at: ActiveValue::Set(value.created_at as i64),
            deleted_at: ActiveValue::Set(None),
        }
    }
}

impl TryFrom<Model> for L1RollupTx {
    type Error = DatabaseError;

    fn try_from(value: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: Some(value.id),
            tx_hash: decode_b256(&value.tx_hash)?,
            tx_type: L1RollupTxType::try_from(value.tx_type)?,
            status: L1RollupTxStatus::try_from(value.status)?,
            l2_block_height: value.l2_block_height as u64,
            nonce: value.nonce as u64,
            gas_price: value
                .gas_price
                .parse()
                .map_err(|_| DatabaseError::InvalidGasPrice(value.gas_price.clone()))?,
            created_at: value.created_at as u64,
        })
    }
}
