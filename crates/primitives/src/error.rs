/// Errors related to settlement primitives.
#[derive(Debug, thiserror::Error)]
pub enum PrimitiveError {
    /// An unknown status discriminant was encountered for the named entity.
    #[error("unknown {entity} status {value}")]
    UnknownStatus {
        /// The entity the status belongs to.
        entity: &'static str,
        /// The raw status value.
        value: i32,
    },
    /// An unknown rollup transaction type.
    #[error("unknown rollup tx type {0}")]
    UnknownTxType(i32),
    /// The proof could not be decoded.
    #[error("invalid proof: {0}")]
    InvalidProof(String),
}
