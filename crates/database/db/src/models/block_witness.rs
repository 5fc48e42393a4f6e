use sea_orm::{entity::prelude::*, ActiveValue};
use settlement_primitives::BlockWitness;

/// A database model that represents the witness of a block.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "block_witness")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    height: i64,
    witness_data: Vec<u8>,
    deleted_at: Option<i64>,
}

/// The relation for the block witness model.
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

/// The active model behavior for the block witness model.
impl ActiveModelBehavior for ActiveModel {}

impl From<BlockWitness> for ActiveModel {
    fn from(value: BlockWitness) -> Self {
        Self {
            height: ActiveValue::Set(value.height as i64),
            witness_data: ActiveValue::Set(value.witness_data.to_vec()),
            deleted_at: ActiveValue::Set(None),
        }
    }
}

impl From<Model> for BlockWitness {
    fn from(value: Model) -> Self {
        Self { height: value.height as u64, witness_data: value.witness_data.into() }
    }
}
