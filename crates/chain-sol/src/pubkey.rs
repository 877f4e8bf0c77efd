//! Solana account addresses.
//!
//! A Solana address is the Base58 encoding of 32 raw bytes: an Ed25519 public
//! key for wallets, or an off-curve SHA-256 digest for program-derived
//! addresses. There is no hashing step between key and address.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::SolError;

/// Length of a Solana address in bytes.
pub const PUBKEY_LEN: usize = 32;

/// A 32-byte Solana account address.
#[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Pubkey([u8; PUBKEY_LEN]);

impl Pubkey {
    pub const fn new_from_array(bytes: [u8; PUBKEY_LEN]) -> Self {
        Self(bytes)
    }

    /// Builds a key from a slice that must be exactly 32 bytes long.
    pub fn try_from_slice(bytes: &[u8]) -> Result<Self, SolError> {
        let arr: [u8; PUBKEY_LEN] = bytes.try_into().map_err(|_| {
            SolError::InvalidAddress(format!("expected 32 bytes, got {}", bytes.len()))
        })?;
        Ok(Self(arr))
    }

    pub const fn to_bytes(self) -> [u8; PUBKEY_LEN] {
        self.0
    }

    pub const fn as_array(&self) -> &[u8; PUBKEY_LEN] {
        &self.0
    }

    /// Whether these bytes decompress to a point on the Ed25519 curve.
    ///
    /// Wallet keys are always on the curve; program-derived addresses never
    /// are, which is what makes them unsignable.
    pub fn is_on_curve(&self) -> bool {
        bytes_are_curve_point(&self.0)
    }
}

/// Check if 32 bytes represent a valid Ed25519 curve point.
///
/// Uses `curve25519-dalek` to attempt decompression. If it succeeds, the
/// point is on the curve.
pub(crate) fn bytes_are_curve_point(bytes: &[u8; PUBKEY_LEN]) -> bool {
    curve25519_dalek::edwards::CompressedEdwardsY(*bytes)
        .decompress()
        .is_some()
}

impl AsRef<[u8]> for Pubkey {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<[u8; PUBKEY_LEN]> for Pubkey {
    fn from(bytes: [u8; PUBKEY_LEN]) -> Self {
        Self(bytes)
    }
}

impl FromStr for Pubkey {
    type Err = SolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(SolError::InvalidAddress("empty address".into()));
        }

        let bytes = bs58::decode(s)
            .into_vec()
            .map_err(|e| SolError::InvalidAddress(format!("base58 decode failed: {e}")))?;

        Self::try_from_slice(&bytes)
    }
}

impl fmt::Display for Pubkey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&bs58::encode(self.0).into_string())
    }
}

impl fmt::Debug for Pubkey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Pubkey({self})")
    }
}

impl Serialize for Pubkey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Pubkey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// The System Program address is 32 zero bytes, which encodes to
    /// "11111111111111111111111111111111" in Base58.
    #[test]
    fn system_program_address() {
        let zeros = Pubkey::default();
        assert_eq!(zeros.to_string(), "11111111111111111111111111111111");
    }

    #[test]
    fn roundtrip_encode_decode() {
        // Known Solana address (the Token Program)
        let address = "TokenkegQfeZyiNwAJbNbGKPFXCWuBvf9Ss623VQ5DA";
        let key: Pubkey = address.parse().unwrap();
        assert_eq!(key.to_string(), address);
    }

    #[test]
    fn garbage_is_rejected() {
        assert!("not-a-valid-address!!!".parse::<Pubkey>().is_err());
    }

    #[test]
    fn too_short_is_rejected() {
        // "1" decodes to a single zero byte, which is not 32 bytes.
        let err = "1".parse::<Pubkey>().unwrap_err();
        assert_eq!(
            err,
            SolError::InvalidAddress("expected 32 bytes, got 1".into())
        );
    }

    #[test]
    fn empty_is_rejected() {
        assert!("".parse::<Pubkey>().is_err());
    }

    #[test]
    fn try_from_slice_checks_length() {
        assert!(Pubkey::try_from_slice(&[7u8; 31]).is_err());
        assert_eq!(
            Pubkey::try_from_slice(&[7u8; 32]).unwrap(),
            Pubkey::new_from_array([7u8; 32])
        );
    }

    #[test]
    fn basepoint_is_on_curve() {
        // The Ed25519 basepoint (compressed form).
        let mut basepoint = [0x66u8; 32];
        basepoint[0] = 0x58;
        assert!(Pubkey::new_from_array(basepoint).is_on_curve());
    }

    #[test]
    fn off_curve_bytes_are_detected() {
        // y = 0x020202...02 has no matching x coordinate.
        assert!(!Pubkey::new_from_array([0x02; 32]).is_on_curve());
    }

    #[test]
    fn generated_wallet_keys_are_on_curve() {
        let mut rng = rand::rngs::OsRng;
        for _ in 0..8 {
            let signing = ed25519_dalek::SigningKey::generate(&mut rng);
            let key = Pubkey::new_from_array(signing.verifying_key().to_bytes());
            assert!(key.is_on_curve());
        }
    }

    #[test]
    fn serde_uses_base58_string() {
        let key: Pubkey = "TokenkegQfeZyiNwAJbNbGKPFXCWuBvf9Ss623VQ5DA".parse().unwrap();
        let json = serde_json::to_string(&key).unwrap();
        assert_eq!(json, "\"TokenkegQfeZyiNwAJbNbGKPFXCWuBvf9Ss623VQ5DA\"");
        let back: Pubkey = serde_json::from_str(&json).unwrap();
        assert_eq!(back, key);
    }
}
