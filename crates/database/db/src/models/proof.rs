use crate::DatabaseError;

use sea_orm::{entity::prelude::*, ActiveValue};
use settlement_primitives::{Proof, ProofStatus};

/// A database model that represents the proof of a block.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "proof")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    height: i64,
    proof_info: String,
    status: i32,
    deleted_at: Option<i64>,
}

/// The relation for the proof model.
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

/// The active model behavior for the proof model.
impl ActiveModelBehavior for ActiveModel {}

impl From<Proof> for ActiveModel {
    fn from(value: Proof) -> Self {
        Self {
            height: ActiveValue::Set(value.height as i64),
            proof_info: ActiveValue::Set(value.proof_info),
            status: ActiveValue::Set(value.status.as_i32()),
            deleted_at: ActiveValue::Set(None),
        }
    }
}

impl TryFrom<Model> for Proof {
    type Error = DatabaseError;

    fn try_from(value: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            height: value.height as u64,
            proof_info: value.proof_info,
            status: ProofStatus::try_from(value.status)?,
        })
    }
}
