/// The transaction types found at the start of every on-chain operation in the block public
/// data.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum PubdataTxType {
    /// Padding.
    Empty = 0,
    /// Rotation of the L2 public key of an account, authorized by an L1 signature.
    ChangePubKey = 1,
    /// Deposit of fungible assets.
    Deposit = 2,
    /// Deposit of a non fungible asset.
    DepositNft = 3,
    /// L2 transfer.
    Transfer = 4,
    /// Withdrawal of fungible assets.
    Withdraw = 5,
    /// Creation of an NFT collection.
    CreateCollection = 6,
    /// Mint of an NFT.
    MintNft = 7,
    /// L2 transfer of an NFT.
    TransferNft = 8,
    /// Match of an NFT offer.
    AtomicMatch = 9,
    /// Cancellation of an offer.
    CancelOffer = 10,
    /// Withdrawal of an NFT.
    WithdrawNft = 11,
    /// Forced exit of fungible assets.
    FullExit = 12,
    /// Forced exit of an NFT.
    FullExitNft = 13,
}

impl PubdataTxType {
    /// Returns the [`PubdataTxType`] for the given type byte.
    pub const fn from_u8(value: u8) -> Option<Self> {
        Some(match value {
            0 => Self::Empty,
            1 => Self::ChangePubKey,
            2 => Self::Deposit,
            3 => Self::DepositNft,
            4 => Self::Transfer,
            5 => Self::Withdraw,
            6 => Self::CreateCollection,
            7 => Self::MintNft,
            8 => Self::TransferNft,
            9 => Self::AtomicMatch,
            10 => Self::CancelOffer,
            11 => Self::WithdrawNft,
            12 => Self::FullExit,
            13 => Self::FullExitNft,
            _ => return None,
        })
    }

    /// Returns true if the operation must carry an L1 signature as eth witness.
    pub const fn requires_eth_witness(&self) -> bool {
        matches!(self, Self::ChangePubKey)
    }

    /// Returns true if the operation originates from an L1 priority request.
    pub const fn is_priority_operation(&self) -> bool {
        matches!(self, Self::Deposit | Self::DepositNft | Self::FullExit | Self::FullExitNft)
    }
}

#[cfg(test)]
mod tests {
    use super::PubdataTxType;

    #[test]
    fn test_type_byte_round_trip() {
        for byte in 0..=13u8 {
            let ty = PubdataTxType::from_u8(byte).unwrap();
            assert_eq!(ty as u8, byte);
        }
        assert_eq!(PubdataTxType::from_u8(14), None);
    }

    #[test]
    fn test_only_change_pub_key_requires_witness() {
        let witnessed: Vec<_> = (0..=13u8)
            .filter_map(PubdataTxType::from_u8)
            .filter(PubdataTxType::requires_eth_witness)
            .collect();
        assert_eq!(witnessed, vec![PubdataTxType::ChangePubKey]);
    }
}
