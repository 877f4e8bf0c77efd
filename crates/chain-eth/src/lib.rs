//! Ethereum/EVM address support for cross-chain message construction.
//!
//! This crate provides:
//! - Parsing 0x-prefixed hex addresses into raw 20-byte values
//! - EIP-55 mixed-case checksum encoding and validation
//!
//! Everything above the raw 20 bytes (canonical 32-byte embedding, message
//! assembly) lives in `ccip-core`.

pub mod address;
pub mod error;

pub use address::{checksum_address, parse_address, to_checksum_address, ADDRESS_LEN};
pub use error::EthError;
