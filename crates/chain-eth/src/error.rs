use thiserror::Error;

/// EVM address errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EthError {
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("checksum mismatch: expected {expected}, got {got}")]
    ChecksumMismatch { expected: String, got: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_invalid_address() {
        let err = EthError::InvalidAddress("bad length".into());
        assert_eq!(err.to_string(), "invalid address: bad length");
    }

    #[test]
    fn display_checksum_mismatch() {
        let err = EthError::ChecksumMismatch {
            expected: "0xAbC".into(),
            got: "0xaBc".into(),
        };
        assert_eq!(
            err.to_string(),
            "checksum mismatch: expected 0xAbC, got 0xaBc"
        );
    }

    #[test]
    fn error_trait_is_implemented() {
        let err: Box<dyn std::error::Error> = Box::new(EthError::InvalidAddress("test".into()));
        assert!(err.to_string().contains("test"));
    }

    #[test]
    fn debug_format_works() {
        let err = EthError::InvalidAddress("x".into());
        let debug = format!("{:?}", err);
        assert!(debug.contains("InvalidAddress"));
    }
}
