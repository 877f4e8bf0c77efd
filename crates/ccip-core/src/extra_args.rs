//! Tagged, versioned "extra args" buffers carrying destination execution
//! hints.
//!
//! Every buffer starts with a 4-byte tag naming both the schema version and
//! the destination execution model. Multi-byte integers are little-endian;
//! booleans are a single `0x00` / `0x01` byte.
//!
//! ```text
//! EVMExtraArgsV1      97a657c9 | gas_limit u128 (16)
//! GenericExtraArgsV2  181dcf10 | gas_limit u128 (16) | allow_out_of_order (1)
//! SVMExtraArgsV1      1f3b3aba | compute_units u32 (4) | allow_out_of_order (1)
//!                              | token_receiver (32, zero = none)
//!                              | account_count u8 (1) | accounts (32 * n)
//!                              | writable_bitmap (ceil(n / 8), LE)
//! ```
//!
//! Bytes after the schema's last field are tolerated so newer senders can
//! append fields. [`decode_extra_args`] drops them; [`decode_extra_args_raw`]
//! keeps them so the buffer can be re-emitted unchanged.

use std::fmt;

use alloy_primitives::U256;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::bitmap::{self, WritableSlot};
use crate::canonical::{CanonicalAddress, CANONICAL_LEN};
use crate::chains::ChainFamily;
use crate::error::CcipError;

/// Length of the leading tag.
pub const TAG_LEN: usize = 4;

/// Most accounts an SVM buffer can list (the count is a single byte).
pub const MAX_SVM_ACCOUNTS: usize = u8::MAX as usize;

const EVM_V1_TAG: [u8; 4] = [0x97, 0xa6, 0x57, 0xc9];
const GENERIC_V2_TAG: [u8; 4] = [0x18, 0x1d, 0xcf, 0x10];
const SVM_V1_TAG: [u8; 4] = [0x1f, 0x3b, 0x3a, 0xba];

/// Known extra-args schemas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExtraArgsTag {
    /// Gas limit only; messages are always executed in order.
    EvmV1,
    /// Gas limit plus out-of-order flag.
    GenericV2,
    /// Compute budget, out-of-order flag, token receiver and account list.
    SvmV1,
}

impl ExtraArgsTag {
    pub const fn to_bytes(self) -> [u8; TAG_LEN] {
        match self {
            ExtraArgsTag::EvmV1 => EVM_V1_TAG,
            ExtraArgsTag::GenericV2 => GENERIC_V2_TAG,
            ExtraArgsTag::SvmV1 => SVM_V1_TAG,
        }
    }

    pub fn from_bytes(bytes: [u8; TAG_LEN]) -> Option<Self> {
        match bytes {
            EVM_V1_TAG => Some(ExtraArgsTag::EvmV1),
            GENERIC_V2_TAG => Some(ExtraArgsTag::GenericV2),
            SVM_V1_TAG => Some(ExtraArgsTag::SvmV1),
            _ => None,
        }
    }

    pub const fn family(self) -> ChainFamily {
        match self {
            ExtraArgsTag::EvmV1 | ExtraArgsTag::GenericV2 => ChainFamily::Evm,
            ExtraArgsTag::SvmV1 => ChainFamily::Svm,
        }
    }

    /// Largest execution budget the schema can carry.
    pub const fn max_execution_budget(self) -> u64 {
        match self {
            ExtraArgsTag::EvmV1 | ExtraArgsTag::GenericV2 => u64::MAX,
            ExtraArgsTag::SvmV1 => u32::MAX as u64,
        }
    }

    /// Bytes occupied by the fields every buffer of this schema carries.
    pub const fn min_len(self) -> usize {
        match self {
            ExtraArgsTag::EvmV1 => TAG_LEN + 16,
            ExtraArgsTag::GenericV2 => TAG_LEN + 16 + 1,
            ExtraArgsTag::SvmV1 => TAG_LEN + 4 + 1 + CANONICAL_LEN + 1,
        }
    }

    fn name(self) -> &'static str {
        match self {
            ExtraArgsTag::EvmV1 => "EVMExtraArgsV1",
            ExtraArgsTag::GenericV2 => "GenericExtraArgsV2",
            ExtraArgsTag::SvmV1 => "SVMExtraArgsV1",
        }
    }
}

impl fmt::Display for ExtraArgsTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (0x{})", self.name(), hex::encode(self.to_bytes()))
    }
}

/// Destination execution hints, independent of wire schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExecutionHints {
    /// Gas limit (EVM) or compute-unit budget (SVM).
    pub execution_budget: u64,
    pub allow_out_of_order_execution: bool,
    pub token_receiver: Option<CanonicalAddress>,
    pub accounts: Vec<CanonicalAddress>,
    pub writable_bitmap: U256,
}

impl ExecutionHints {
    /// Hints for an EVM destination.
    pub fn evm(gas_limit: u64, allow_out_of_order_execution: bool) -> Self {
        Self {
            execution_budget: gas_limit,
            allow_out_of_order_execution,
            token_receiver: None,
            accounts: Vec::new(),
            writable_bitmap: U256::ZERO,
        }
    }

    /// Hints for an SVM destination from `(account, writable)` pairs.
    pub fn svm(
        compute_units: u32,
        allow_out_of_order_execution: bool,
        token_receiver: Option<CanonicalAddress>,
        accounts: &[(CanonicalAddress, bool)],
    ) -> Result<Self, CcipError> {
        let flags: Vec<bool> = accounts.iter().map(|(_, writable)| *writable).collect();
        Ok(Self {
            execution_budget: u64::from(compute_units),
            allow_out_of_order_execution,
            token_receiver,
            accounts: accounts.iter().map(|(account, _)| *account).collect(),
            writable_bitmap: bitmap::compute_writable_bitmap(&flags)?,
        })
    }

    pub fn is_writable(&self, index: usize) -> bool {
        index < self.accounts.len() && bitmap::is_writable(self.writable_bitmap, index)
    }

    pub fn writable_slots(&self) -> Vec<WritableSlot> {
        bitmap::explain(self.writable_bitmap, self.accounts.len())
    }
}

/// A decoded buffer together with any bytes past the schema's last field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawExtraArgs {
    pub tag: ExtraArgsTag,
    pub hints: ExecutionHints,
    pub trailing: Vec<u8>,
}

impl RawExtraArgs {
    /// Re-emits the decoded buffer, trailing bytes included.
    pub fn to_bytes(&self) -> Result<Vec<u8>, CcipError> {
        let mut out = encode_extra_args(self.tag, &self.hints)?;
        out.extend_from_slice(&self.trailing);
        Ok(out)
    }
}

/// Serializes `hints` under an explicitly chosen schema.
pub fn encode_extra_args(tag: ExtraArgsTag, hints: &ExecutionHints) -> Result<Vec<u8>, CcipError> {
    validate_hints(tag, hints)?;

    let mut out = Vec::with_capacity(
        tag.min_len()
            + hints.accounts.len() * CANONICAL_LEN
            + bitmap::encoded_len(hints.accounts.len()),
    );
    out.extend_from_slice(&tag.to_bytes());

    match tag {
        ExtraArgsTag::EvmV1 => {
            out.extend_from_slice(&u128::from(hints.execution_budget).to_le_bytes());
        }
        ExtraArgsTag::GenericV2 => {
            out.extend_from_slice(&u128::from(hints.execution_budget).to_le_bytes());
            out.push(u8::from(hints.allow_out_of_order_execution));
        }
        ExtraArgsTag::SvmV1 => {
            // Range checked in validate_hints.
            let compute_units = hints.execution_budget as u32;
            out.extend_from_slice(&compute_units.to_le_bytes());
            out.push(u8::from(hints.allow_out_of_order_execution));
            let receiver = hints.token_receiver.unwrap_or(CanonicalAddress::ZERO);
            out.extend_from_slice(receiver.as_bytes());
            out.push(hints.accounts.len() as u8);
            for account in &hints.accounts {
                out.extend_from_slice(account.as_bytes());
            }
            out.extend_from_slice(&bitmap::encode_bitmap(
                hints.writable_bitmap,
                hints.accounts.len(),
            )?);
        }
    }

    Ok(out)
}

fn validate_hints(tag: ExtraArgsTag, hints: &ExecutionHints) -> Result<(), CcipError> {
    let unsupported = |reason: &str| CcipError::UnsupportedHint {
        tag: tag.to_string(),
        reason: reason.to_string(),
    };

    let max = tag.max_execution_budget();
    if hints.execution_budget > max {
        return Err(CcipError::ExecutionBudgetOutOfRange {
            budget: u128::from(hints.execution_budget),
            max,
        });
    }

    if hints.token_receiver.is_some_and(|r| r.is_zero()) {
        return Err(unsupported("token receiver must not be the zero address"));
    }

    match tag.family() {
        ChainFamily::Evm => {
            if !hints.accounts.is_empty() || !hints.writable_bitmap.is_zero() {
                return Err(unsupported("account lists are only carried by SVM extra args"));
            }
            if hints.token_receiver.is_some() {
                return Err(unsupported("token receiver is only carried by SVM extra args"));
            }
            if tag == ExtraArgsTag::EvmV1 && hints.allow_out_of_order_execution {
                return Err(unsupported("out-of-order execution requires GenericExtraArgsV2"));
            }
        }
        ChainFamily::Svm => {
            if hints.accounts.len() > MAX_SVM_ACCOUNTS {
                return Err(CcipError::TooManyAccounts {
                    count: hints.accounts.len(),
                    max: MAX_SVM_ACCOUNTS,
                });
            }
            bitmap::validate_bitmap(hints.writable_bitmap, hints.accounts.len())?;
        }
    }

    Ok(())
}

/// Decodes a buffer, discarding any trailing bytes.
pub fn decode_extra_args(buf: &[u8]) -> Result<(ExtraArgsTag, ExecutionHints), CcipError> {
    let raw = decode_extra_args_raw(buf)?;
    if !raw.trailing.is_empty() {
        debug!(
            "ignoring {} trailing bytes after {} extra args",
            raw.trailing.len(),
            raw.tag
        );
    }
    Ok((raw.tag, raw.hints))
}

/// Decodes a buffer, keeping trailing bytes opaque.
pub fn decode_extra_args_raw(buf: &[u8]) -> Result<RawExtraArgs, CcipError> {
    let mut reader = Reader::new(buf);

    let tag_bytes = reader.array::<TAG_LEN>()?;
    let tag = ExtraArgsTag::from_bytes(tag_bytes)
        .ok_or_else(|| CcipError::UnsupportedExtraArgsTag(format!("0x{}", hex::encode(tag_bytes))))?;

    let hints = match tag {
        ExtraArgsTag::EvmV1 => ExecutionHints::evm(reader.gas_limit()?, false),
        ExtraArgsTag::GenericV2 => {
            let gas_limit = reader.gas_limit()?;
            ExecutionHints::evm(gas_limit, reader.bool()?)
        }
        ExtraArgsTag::SvmV1 => {
            let compute_units = u32::from_le_bytes(reader.array::<4>()?);
            let allow_out_of_order_execution = reader.bool()?;
            let receiver = CanonicalAddress::from_bytes(reader.array::<CANONICAL_LEN>()?);
            let count = usize::from(reader.array::<1>()?[0]);

            let mut accounts = Vec::with_capacity(count);
            for _ in 0..count {
                accounts.push(CanonicalAddress::from_bytes(reader.array::<CANONICAL_LEN>()?));
            }
            let writable_bitmap =
                bitmap::decode_bitmap(reader.take(bitmap::encoded_len(count))?, count)?;

            ExecutionHints {
                execution_budget: u64::from(compute_units),
                allow_out_of_order_execution,
                token_receiver: (!receiver.is_zero()).then_some(receiver),
                accounts,
                writable_bitmap,
            }
        }
    };

    Ok(RawExtraArgs {
        tag,
        hints,
        trailing: reader.rest().to_vec(),
    })
}

struct Reader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8], CcipError> {
        let end = self.pos + n;
        if end > self.buf.len() {
            return Err(CcipError::TruncatedBuffer {
                needed: end,
                got: self.buf.len(),
            });
        }
        let slice = &self.buf[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    fn array<const N: usize>(&mut self) -> Result<[u8; N], CcipError> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N)?);
        Ok(out)
    }

    fn bool(&mut self) -> Result<bool, CcipError> {
        match self.array::<1>()?[0] {
            0 => Ok(false),
            1 => Ok(true),
            other => Err(CcipError::InvalidBool(other)),
        }
    }

    fn gas_limit(&mut self) -> Result<u64, CcipError> {
        let wide = u128::from_le_bytes(self.array::<16>()?);
        u64::try_from(wide).map_err(|_| CcipError::ExecutionBudgetOutOfRange {
            budget: wide,
            max: u64::MAX,
        })
    }

    fn rest(&self) -> &'a [u8] {
        &self.buf[self.pos..]
    }
}
