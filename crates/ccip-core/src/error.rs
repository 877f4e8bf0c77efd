use chain_eth::EthError;
use chain_sol::SolError;
use thiserror::Error;

/// Errors raised while encoding, decoding or assembling cross-chain messages.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CcipError {
    // -- Address codec --------------------------------------------------------
    #[error("invalid address length: expected {expected} bytes, got {got}")]
    InvalidAddressLength { expected: usize, got: usize },

    #[error("non-zero padding in canonical address {0}")]
    NonZeroPadding(String),

    #[error("invalid {field} address: {reason}")]
    InvalidAddress { field: String, reason: String },

    // -- Bitmap / extra args --------------------------------------------------
    #[error("writable bitmap {bitmap} marks slots beyond {account_count} accounts")]
    BitmapOverflow { bitmap: String, account_count: usize },

    #[error("too many accounts: {count} exceeds the limit of {max}")]
    TooManyAccounts { count: usize, max: usize },

    #[error("unsupported extra args tag: {0}")]
    UnsupportedExtraArgsTag(String),

    #[error("truncated buffer: needed {needed} bytes, got {got}")]
    TruncatedBuffer { needed: usize, got: usize },

    #[error("execution budget {budget} exceeds the maximum of {max}")]
    ExecutionBudgetOutOfRange { budget: u128, max: u64 },

    #[error("invalid boolean byte: {0:#04x}")]
    InvalidBool(u8),

    #[error("unsupported hint for {tag}: {reason}")]
    UnsupportedHint { tag: String, reason: String },

    // -- Message assembly -----------------------------------------------------
    #[error("invalid receiver: {0}")]
    InvalidReceiver(String),

    #[error("invalid token amount for {token}: {reason}")]
    InvalidTokenAmount { token: String, reason: String },

    #[error("unknown chain selector: {0}")]
    UnknownChain(u64),

    #[error("extra args tag {tag} targets {tag_family} chains but the destination is {destination_family}")]
    ExtraArgsFamilyMismatch {
        tag: String,
        tag_family: String,
        destination_family: String,
    },

    #[error("token transfers to SVM destinations require a token receiver")]
    MissingTokenReceiver,

    #[error("{field} exceeds receiver limit: {got} > {max}")]
    LimitExceeded { field: String, got: usize, max: usize },

    // -- Chain crates / configuration -----------------------------------------
    #[error("ETH: {0}")]
    Eth(#[from] EthError),

    #[error("SOL: {0}")]
    Sol(#[from] SolError),

    #[error("configuration error: {0}")]
    Config(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_invalid_address_length() {
        let err = CcipError::InvalidAddressLength {
            expected: 20,
            got: 19,
        };
        assert_eq!(
            err.to_string(),
            "invalid address length: expected 20 bytes, got 19"
        );
    }

    #[test]
    fn display_bitmap_overflow() {
        let err = CcipError::BitmapOverflow {
            bitmap: "4".into(),
            account_count: 2,
        };
        assert_eq!(
            err.to_string(),
            "writable bitmap 4 marks slots beyond 2 accounts"
        );
    }

    #[test]
    fn display_truncated_buffer() {
        let err = CcipError::TruncatedBuffer { needed: 4, got: 2 };
        assert_eq!(err.to_string(), "truncated buffer: needed 4 bytes, got 2");
    }

    #[test]
    fn display_invalid_token_amount() {
        let err = CcipError::InvalidTokenAmount {
            token: "0xabc".into(),
            reason: "amount must be > 0".into(),
        };
        assert_eq!(
            err.to_string(),
            "invalid token amount for 0xabc: amount must be > 0"
        );
    }

    #[test]
    fn display_invalid_bool() {
        assert_eq!(
            CcipError::InvalidBool(2).to_string(),
            "invalid boolean byte: 0x02"
        );
    }

    #[test]
    fn chain_errors_convert() {
        let err: CcipError = EthError::InvalidAddress("bad".into()).into();
        assert_eq!(err.to_string(), "ETH: invalid address: bad");

        let err: CcipError = SolError::InvalidSeeds.into();
        assert!(err.to_string().starts_with("SOL: invalid seeds"));
    }

    #[test]
    fn error_trait_is_implemented() {
        let err: Box<dyn std::error::Error> = Box::new(CcipError::UnknownChain(7));
        assert_eq!(err.to_string(), "unknown chain selector: 7");
    }
}
