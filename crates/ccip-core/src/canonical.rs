//! Conversion between chain-native addresses and the protocol's canonical
//! 32-byte form.
//!
//! Two padding conventions coexist on the wire and are never inferred:
//!
//! ```text
//! Padding::Left   00 00 .. 00 | a0 a1 .. a19     native address embedded in a message
//! Padding::Right  a0 a1 .. a19 | 00 00 .. 00     token / pool address fields
//! ```
//!
//! 32-byte native identifiers fill the whole word under either mode.

use std::fmt;

use chain_sol::Pubkey;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::chains::ChainFamily;
use crate::error::CcipError;

/// Length of a canonical address in bytes.
pub const CANONICAL_LEN: usize = 32;

/// Width of a chain-native address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AddressWidth {
    /// 20-byte EVM address.
    Bytes20,
    /// 32-byte account identifier.
    Bytes32,
}

impl AddressWidth {
    pub const fn len(self) -> usize {
        match self {
            AddressWidth::Bytes20 => 20,
            AddressWidth::Bytes32 => 32,
        }
    }
}

/// Which side of the canonical word receives the zero padding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Padding {
    /// Zeros first, value right-aligned.
    #[default]
    Left,
    /// Value first, zeros trailing.
    Right,
}

/// The protocol's fixed 32-byte address representation.
#[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CanonicalAddress([u8; CANONICAL_LEN]);

impl CanonicalAddress {
    pub const ZERO: Self = Self([0u8; CANONICAL_LEN]);

    pub const fn from_bytes(bytes: [u8; CANONICAL_LEN]) -> Self {
        Self(bytes)
    }

    pub const fn as_bytes(&self) -> &[u8; CANONICAL_LEN] {
        &self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; CANONICAL_LEN]
    }
}

impl From<Pubkey> for CanonicalAddress {
    fn from(key: Pubkey) -> Self {
        Self(key.to_bytes())
    }
}

impl fmt::Display for CanonicalAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&to_display_hex(&self.0))
    }
}

impl fmt::Debug for CanonicalAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CanonicalAddress({self})")
    }
}

impl Serialize for CanonicalAddress {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for CanonicalAddress {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        let hex_part = s.strip_prefix("0x").unwrap_or(&s);
        let bytes = hex::decode(hex_part).map_err(serde::de::Error::custom)?;
        let arr: [u8; CANONICAL_LEN] = bytes.try_into().map_err(|v: Vec<u8>| {
            serde::de::Error::custom(format!("expected 32 bytes, got {}", v.len()))
        })?;
        Ok(Self(arr))
    }
}

/// Embeds a native address as canonical, value right-aligned.
pub fn encode_to_canonical(
    native: &[u8],
    width: AddressWidth,
) -> Result<CanonicalAddress, CcipError> {
    encode_to_canonical_padded(native, width, Padding::Left)
}

/// Embeds a native address as canonical using an explicit padding mode.
pub fn encode_to_canonical_padded(
    native: &[u8],
    width: AddressWidth,
    padding: Padding,
) -> Result<CanonicalAddress, CcipError> {
    let len = width.len();
    if native.len() != len {
        return Err(CcipError::InvalidAddressLength {
            expected: len,
            got: native.len(),
        });
    }

    Ok(pad_word(native, padding))
}

// Caller guarantees `native.len() <= CANONICAL_LEN`.
fn pad_word(native: &[u8], padding: Padding) -> CanonicalAddress {
    let len = native.len();
    let mut word = [0u8; CANONICAL_LEN];
    match padding {
        Padding::Left => word[CANONICAL_LEN - len..].copy_from_slice(native),
        Padding::Right => word[..len].copy_from_slice(native),
    }
    CanonicalAddress(word)
}

/// Recovers the native bytes of a right-aligned canonical address.
pub fn decode_from_canonical(
    canonical: &CanonicalAddress,
    width: AddressWidth,
) -> Result<Vec<u8>, CcipError> {
    decode_from_canonical_padded(canonical, width, Padding::Left)
}

/// Recovers the native bytes of a canonical address under an explicit
/// padding mode. The padding region must be all zero.
pub fn decode_from_canonical_padded(
    canonical: &CanonicalAddress,
    width: AddressWidth,
    padding: Padding,
) -> Result<Vec<u8>, CcipError> {
    let len = width.len();
    let (pad, value) = match padding {
        Padding::Left => {
            let (pad, value) = canonical.0.split_at(CANONICAL_LEN - len);
            (pad, value)
        }
        Padding::Right => {
            let (value, pad) = canonical.0.split_at(len);
            (pad, value)
        }
    };

    if pad.iter().any(|b| *b != 0) {
        return Err(CcipError::NonZeroPadding(canonical.to_string()));
    }

    Ok(value.to_vec())
}

/// `0x`-prefixed lowercase hex, for logs and diagnostics only.
pub fn to_display_hex(bytes: &[u8]) -> String {
    format!("0x{}", hex::encode(bytes))
}

/// A chain-native address as written by users of that chain.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub enum NativeAddress {
    Evm([u8; 20]),
    Svm([u8; 32]),
}

impl NativeAddress {
    /// Parses the textual form used on chains of `family`: 0x hex (EIP-55
    /// checksum enforced when mixed-case) for EVM, Base58 for SVM.
    pub fn parse(input: &str, family: ChainFamily) -> Result<Self, CcipError> {
        match family {
            ChainFamily::Evm => Ok(NativeAddress::Evm(chain_eth::parse_address(input)?)),
            ChainFamily::Svm => Ok(NativeAddress::Svm(input.parse::<Pubkey>()?.to_bytes())),
        }
    }

    pub fn family(&self) -> ChainFamily {
        match self {
            NativeAddress::Evm(_) => ChainFamily::Evm,
            NativeAddress::Svm(_) => ChainFamily::Svm,
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        match self {
            NativeAddress::Evm(bytes) => bytes,
            NativeAddress::Svm(bytes) => bytes,
        }
    }

    pub fn is_zero(&self) -> bool {
        self.as_bytes().iter().all(|b| *b == 0)
    }

    /// Embeds the address under [`Padding::Left`], as
    /// [`encode_to_canonical`] does. The width always matches the variant.
    pub fn to_canonical(&self) -> CanonicalAddress {
        pad_word(self.as_bytes(), Padding::Left)
    }
}

impl fmt::Display for NativeAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NativeAddress::Evm(bytes) => f.write_str(&chain_eth::to_checksum_address(bytes)),
            NativeAddress::Svm(bytes) => write!(f, "{}", Pubkey::new_from_array(*bytes)),
        }
    }
}

impl fmt::Debug for NativeAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NativeAddress::Evm(_) => write!(f, "Evm({self})"),
            NativeAddress::Svm(_) => write!(f, "Svm({self})"),
        }
    }
}

impl Serialize for NativeAddress {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
