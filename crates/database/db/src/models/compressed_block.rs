use super::decode_b256;
use crate::DatabaseError;

use alloy_primitives::Bytes;
use sea_orm::{entity::prelude::*, ActiveValue};
use settlement_primitives::CompressedBlock;
use std::collections::BTreeMap;

/// A database model that represents the commit payload of an L2 block.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "compressed_block")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    height: i64,
    state_root: Vec<u8>,
    public_data: Vec<u8>,
    public_data_offsets: String,
    witness_signatures: String,
    timestamp: i64,
    block_size: i32,
    deleted_at: Option<i64>,
}

/// The relation for the compressed block model.
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

/// The active model behavior for the compressed block model.
impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<CompressedBlock> for ActiveModel {
    type Error = DatabaseError;

    fn try_from(value: CompressedBlock) -> Result<Self, Self::Error> {
        Ok(Self {
            height: ActiveValue::Set(value.height as i64),
            state_root: ActiveValue::Set(value.state_root.to_vec()),
            public_data: ActiveValue::Set(value.public_data.to_vec()),
            public_data_offsets: ActiveValue::Set(serde_json::to_string(
                &value.public_data_offsets,
            )?),
            witness_signatures: ActiveValue::Set(serde_json::to_string(
                &value.witness_signatures,
            )?),
            timestamp: ActiveValue::Set(value.timestamp as i64),
            block_size: ActiveValue::Set(value.block_size as i32),
            deleted_at: ActiveValue::Set(None),
        })
    }
}

impl TryFrom<Model> for CompressedBlock {
    type Error = DatabaseError;

    fn try_from(value: Model) -> Result<Self, Self::Error> {
        let witness_signatures: BTreeMap<u32, Bytes> = if value.witness_signatures.is_empty() {
            BTreeMap::new()
        } else {
            serde_json::from_str(&value.witness_signatures)?
        };

        Ok(Self {
            height: value.height as u64,
            state_root: decode_b256(&value.state_root)?,
            public_data: value.public_data.into(),
            public_data_offsets: serde_json::from_str(&value.public_data_offsets)?,
            witness_signatures,
            timestamp: value.timestamp as u64,
            block_size: value.block_size as u16,
        })
    }
}
