use thiserror::Error;

/// Solana address and derivation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SolError {
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    /// Too many seeds, or a single seed longer than `MAX_SEED_LEN`.
    #[error("max seed length exceeded: {0}")]
    MaxSeedLengthExceeded(String),

    /// The supplied seeds (bump included) hash to a point on the curve.
    #[error("invalid seeds: derived address lies on the ed25519 curve")]
    InvalidSeeds,

    #[error("no valid bump seed found for program {program_id} with seeds [{seeds}]")]
    NoValidBumpFound { program_id: String, seeds: String },
}
