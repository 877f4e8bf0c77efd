//! Solana chain support for cross-chain message construction.
//!
//! This crate handles Solana account addresses and program-derived address
//! (PDA) derivation without pulling in `solana-sdk` (which drags in tokio and
//! 200+ transitive dependencies).
//!
//! PDA derivation reproduces the runtime's `find_program_address` exactly:
//! SHA-256 over the seeds, a bump byte, the program id and a fixed marker,
//! with `curve25519-dalek` deciding whether a candidate lies on the curve.

pub mod error;
pub mod pda;
pub mod pubkey;
pub mod spl_token;

// Re-export key public types for ergonomic imports.
pub use error::SolError;
pub use pda::{
    create_program_address, find_program_address, DerivedAccount, PdaCache, MAX_SEEDS,
    MAX_SEED_LEN,
};
pub use pubkey::Pubkey;
pub use spl_token::{derive_associated_token_address, ASSOCIATED_TOKEN_PROGRAM_ID, TOKEN_PROGRAM_ID};
