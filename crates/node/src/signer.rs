use alloy_network::EthereumWallet;
use alloy_primitives::{hex, Address};
use alloy_signer::Signer;
use alloy_signer_aws::AwsSigner;
use alloy_signer_local::PrivateKeySigner;
use aws_sdk_kms::config::BehaviorVersion;
use std::{fs, path::Path};

/// The signer of a rollup transaction channel.
#[derive(Debug, Clone)]
pub enum ChannelSigner {
    /// A private key loaded from a file.
    Local(PrivateKeySigner),
    /// A key held by AWS KMS.
    Aws(AwsSigner),
}

impl ChannelSigner {
    /// Loads a private key signer from a hex encoded key file, with an optional 0x prefix.
    pub fn from_key_file(path: &Path, chain_id: u64) -> eyre::Result<Self> {
        let key_content = fs::read_to_string(path)
            .map_err(|e| eyre::eyre!("Failed to read signer key file {}: {}", path.display(), e))?;
        let key_content = key_content.trim();
        let hex_str = key_content.strip_prefix("0x").unwrap_or(key_content);
        let key_bytes = hex::decode(hex_str).map_err(|e| {
            eyre::eyre!("Failed to decode hex private key from file {}: {}", path.display(), e)
        })?;

        let signer = PrivateKeySigner::from_slice(&key_bytes)
            .map_err(|e| eyre::eyre!("Failed to create signer from key file: {}", e))?
            .with_chain_id(Some(chain_id));
        Ok(Self::Local(signer))
    }

    /// Connects to the AWS KMS key `key_id` using the default AWS configuration.
    pub async fn from_aws_kms(key_id: String, chain_id: u64) -> eyre::Result<Self> {
        let config = aws_config::defaults(BehaviorVersion::latest()).load().await;
        let kms_client = aws_sdk_kms::Client::new(&config);
        let signer = AwsSigner::new(kms_client, key_id, Some(chain_id))
            .await
            .map_err(|e| eyre::eyre!("Failed to initialize AWS KMS signer: {}", e))?;
        Ok(Self::Aws(signer))
    }

    /// Returns the address of the signer.
    pub fn address(&self) -> Address {
        match self {
            Self::Local(signer) => signer.address(),
            Self::Aws(signer) => signer.address(),
        }
    }

    /// Returns a wallet using the signer by default.
    pub fn into_wallet(self) -> EthereumWallet {
        match self {
            Self::Local(signer) => EthereumWallet::new(signer),
            Self::Aws(signer) => EthereumWallet::new(signer),
        }
    }

    /// Registers the signer with the wallet, making it available for its address.
    pub fn register(self, wallet: &mut EthereumWallet) {
        match self {
            Self::Local(signer) => wallet.register_signer(signer),
            Self::Aws(signer) => wallet.register_signer(signer),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signer_from_key_file() {
        let key = PrivateKeySigner::from_slice(&[0x42; 32]).unwrap();
        let path = std::env::temp_dir().join(format!("settlement-key-{}", key.address()));
        fs::write(&path, format!("0x{}\n", hex::encode([0x42; 32]))).unwrap();

        let signer = ChannelSigner::from_key_file(&path, 1).unwrap();
        assert_eq!(signer.address(), key.address());
        fs::remove_file(&path).unwrap();

        let missing = std::env::temp_dir().join("settlement-missing-key");
        assert!(ChannelSigner::from_key_file(&missing, 1).is_err());
    }
}
