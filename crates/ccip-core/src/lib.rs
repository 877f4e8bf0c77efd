//! Cross-chain message construction between EVM and SVM chains.
//!
//! Addresses from either chain family are carried in one canonical 32-byte
//! form, and destination execution hints travel as a tagged, versioned
//! "extra args" buffer. [`MessageAssembler`] ties the codecs together: it
//! turns a [`UserIntent`] into a [`SendRequest`] and a matching
//! [`FeeQueryRequest`] without touching the network.

pub mod accounts;
pub mod bitmap;
pub mod canonical;
pub mod chains;
pub mod config;
pub mod error;
pub mod events;
pub mod extra_args;
pub mod message;
pub mod receiver;

pub use accounts::{resolve_accounts, AccountRequest, ResolvedAccounts};
pub use bitmap::{compute_writable_bitmap, explain, validate_bitmap, WritableSlot};
pub use canonical::{
    decode_from_canonical, decode_from_canonical_padded, encode_to_canonical,
    encode_to_canonical_padded, to_display_hex, AddressWidth, CanonicalAddress, NativeAddress,
    Padding,
};
pub use chains::{get_chain, supported_chains, CcipChain, ChainFamily};
pub use config::{ChainConfig, ProtocolConfig, ReceiverLimits};
pub use error::CcipError;
pub use events::EventDiscriminators;
pub use extra_args::{
    decode_extra_args, decode_extra_args_raw, encode_extra_args, ExecutionHints, ExtraArgsTag,
    RawExtraArgs,
};
pub use message::{
    AssembledMessage, FeeQueryRequest, HintsIntent, MessageAssembler, MessageKind, SendRequest,
    TokenAmount, TokenAmountIntent, UserIntent,
};
pub use receiver::SeedCatalog;

pub use alloy_primitives::U256;
pub use chain_sol::{find_program_address, DerivedAccount, PdaCache, Pubkey};
