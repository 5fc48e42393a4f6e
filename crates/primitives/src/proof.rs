use crate::PrimitiveError;

use alloy_primitives::U256;
use std::{str::FromStr, string::String};

/// The number of field elements a single proof contributes to the verify call.
pub const PROOF_ELEMENTS: usize = 8;

/// The status of a proof.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub enum ProofStatus {
    /// The proof has not been handed over for submission yet.
    #[default]
    NotSent,
    /// The proof is ready and awaiting on-chain verification.
    NotConfirmed,
    /// The proof was verified on-chain.
    Confirmed,
}

impl ProofStatus {
    /// Returns the database representation of the status.
    pub const fn as_i32(&self) -> i32 {
        match self {
            Self::NotSent => 0,
            Self::NotConfirmed => 1,
            Self::Confirmed => 2,
        }
    }
}

impl TryFrom<i32> for ProofStatus {
    type Error = PrimitiveError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        Ok(match value {
            0 => Self::NotSent,
            1 => Self::NotConfirmed,
            2 => Self::Confirmed,
            value => return Err(PrimitiveError::UnknownStatus { entity: "proof", value }),
        })
    }
}

/// A proof for a single block height.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Proof {
    /// The height of the proven block.
    pub height: u64,
    /// The JSON encoded [`FormattedProof`].
    pub proof_info: String,
    /// The proof status.
    pub status: ProofStatus,
}

impl Proof {
    /// Decodes the stored proof into its curve points.
    pub fn formatted(&self) -> Result<FormattedProof, PrimitiveError> {
        self.proof_info.parse()
    }
}

/// A groth16 proof as its A, B and C curve points.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FormattedProof {
    /// The A point.
    pub a: [U256; 2],
    /// The B point.
    pub b: [[U256; 2]; 2],
    /// The C point.
    pub c: [U256; 2],
}

impl FormattedProof {
    /// Returns the proof as the flat list of elements expected by the rollup contract.
    pub const fn flatten(&self) -> [U256; PROOF_ELEMENTS] {
        [
            self.a[0], self.a[1], self.b[0][0], self.b[0][1], self.b[1][0], self.b[1][1], self.c[0],
            self.c[1],
        ]
    }
}

#[derive(serde::Deserialize)]
struct RawProof {
    a: [String; 2],
    b: [[String; 2]; 2],
    c: [String; 2],
}

fn parse_element(value: &str) -> Result<U256, PrimitiveError> {
    U256::from_str(value.trim())
        .map_err(|err| PrimitiveError::InvalidProof(format!("bad element {value}: {err}")))
}

impl FromStr for FormattedProof {
    type Err = PrimitiveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw: RawProof =
            serde_json::from_str(s).map_err(|err| PrimitiveError::InvalidProof(err.to_string()))?;
        Ok(Self {
            a: [parse_element(&raw.a[0])?, parse_element(&raw.a[1])?],
            b: [
                [parse_element(&raw.b[0][0])?, parse_element(&raw.b[0][1])?],
                [parse_element(&raw.b[1][0])?, parse_element(&raw.b[1][1])?],
            ],
            c: [parse_element(&raw.c[0])?, parse_element(&raw.c[1])?],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flatten_proof_order() {
        let proof: FormattedProof =
            r#"{"a":["1","2"],"b":[["3","4"],["5","6"]],"c":["0x7","8"]}"#.parse().unwrap();
        let flat = proof.flatten();
        let expected: Vec<U256> = (1..=8u64).map(U256::from).collect();
        assert_eq!(flat.to_vec(), expected);
    }

    #[test]
    fn test_invalid_proof() {
        let err = r#"{"a":["1"],"b":[],"c":[]}"#.parse::<FormattedProof>().unwrap_err();
        assert!(matches!(err, PrimitiveError::InvalidProof(_)));

        let err = r#"{"a":["1","zz"],"b":[["3","4"],["5","6"]],"c":["7","8"]}"#
            .parse::<FormattedProof>()
            .unwrap_err();
        assert!(matches!(err, PrimitiveError::InvalidProof(_)));
    }

    #[test]
    fn test_proof_status_conversion() {
        for status in [ProofStatus::NotSent, ProofStatus::NotConfirmed, ProofStatus::Confirmed] {
            assert_eq!(ProofStatus::try_from(status.as_i32()).unwrap(), status);
        }
        assert!(ProofStatus::try_from(7).is_err());
    }
}
