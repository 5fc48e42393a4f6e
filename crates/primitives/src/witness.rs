use alloy_primitives::Bytes;

/// The intermediate artifact from which the proof of a block is generated.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BlockWitness {
    /// The block height.
    pub height: u64,
    /// The serialized witness.
    pub witness_data: Bytes,
}
