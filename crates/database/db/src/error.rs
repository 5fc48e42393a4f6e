use settlement_primitives::PrimitiveError;

/// The error type for database operations.
#[derive(Debug, thiserror::Error)]
pub enum DatabaseError {
    /// A database error occurred.
    #[error("database error: {0}")]
    DatabaseError(#[from] sea_orm::DbErr),
    /// A JSON encoded column could not be (de)serialized.
    #[error("json column error: {0}")]
    Json(#[from] serde_json::Error),
    /// A stored value could not be converted into its domain type.
    #[error("invalid stored value: {0}")]
    Primitive(#[from] PrimitiveError),
    /// A stored hash does not have the expected length.
    #[error("invalid hash length {0}")]
    InvalidHashLength(usize),
    /// A stored gas price could not be parsed.
    #[error("invalid gas price {0}")]
    InvalidGasPrice(String),
    /// The rollup transaction was not found in the database.
    #[error("rollup tx with id [{0}] not found in database")]
    L1RollupTxNotFound(i64),
}
