use sha3::{Digest, Keccak256};

use crate::error::EthError;

/// Length of a raw EVM address in bytes.
pub const ADDRESS_LEN: usize = 20;

/// Parses a 0x-prefixed hex address string into its raw 20 bytes.
///
/// All-lowercase and all-uppercase inputs carry no checksum and are accepted
/// as-is. Mixed-case inputs must match their EIP-55 checksum exactly, since a
/// mismatch almost always means a mistyped address.
pub fn parse_address(address: &str) -> Result<[u8; ADDRESS_LEN], EthError> {
    let hex_part = strip_prefix(address)?;

    if hex_part.len() != ADDRESS_LEN * 2 {
        return Err(EthError::InvalidAddress(format!(
            "expected 40 hex characters, got {}",
            hex_part.len()
        )));
    }

    let bytes = hex::decode(hex_part)
        .map_err(|e| EthError::InvalidAddress(format!("invalid hex: {e}")))?;

    let mut addr = [0u8; ADDRESS_LEN];
    addr.copy_from_slice(&bytes);

    let is_all_lower = hex_part.chars().all(|c| !c.is_ascii_uppercase());
    let is_all_upper = hex_part.chars().all(|c| !c.is_ascii_lowercase());

    if !is_all_lower && !is_all_upper {
        let expected = to_checksum_address(&addr);
        if &expected[2..] != hex_part {
            return Err(EthError::ChecksumMismatch {
                expected,
                got: address.to_string(),
            });
        }
    }

    Ok(addr)
}

/// Renders raw address bytes in EIP-55 mixed-case checksum form.
pub fn to_checksum_address(addr: &[u8; ADDRESS_LEN]) -> String {
    let hex_part = hex::encode(addr);

    // EIP-55: hash the lowercase hex address (without 0x).
    let hash = Keccak256::digest(hex_part.as_bytes());

    let mut checksummed = String::with_capacity(2 + ADDRESS_LEN * 2);
    checksummed.push_str("0x");

    for (i, c) in hex_part.chars().enumerate() {
        // Nibble i of the hash: high nibble for even i, low nibble for odd i.
        let byte = hash[i / 2];
        let nibble = if i % 2 == 0 { byte >> 4 } else { byte & 0x0f };
        if c.is_ascii_alphabetic() && nibble >= 8 {
            checksummed.push(c.to_ascii_uppercase());
        } else {
            checksummed.push(c);
        }
    }

    checksummed
}

/// Applies EIP-55 checksum casing to a 0x-prefixed address string of any case.
pub fn checksum_address(address: &str) -> Result<String, EthError> {
    let hex_part = strip_prefix(address)?.to_lowercase();
    let addr = parse_address(&format!("0x{hex_part}"))?;
    Ok(to_checksum_address(&addr))
}

fn strip_prefix(address: &str) -> Result<&str, EthError> {
    address
        .strip_prefix("0x")
        .or_else(|| address.strip_prefix("0X"))
        .ok_or_else(|| EthError::InvalidAddress("address must start with 0x".into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    // Test vectors from EIP-55.
    const EIP55_CASES: [&str; 4] = [
        "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed",
        "0xfB6916095ca1df60bB79Ce92cE3Ea74c37c5d359",
        "0xdbF03B407c01E7cD3CBea99509d93f8DDDC8C6FB",
        "0xD1220A0cf47c7B9Be7A2E6BA89F429762e7b9aDb",
    ];

    #[test]
    fn eip55_checksum_known_addresses() {
        for expected in &EIP55_CASES {
            let lower = format!("0x{}", expected[2..].to_lowercase());
            let result = checksum_address(&lower).unwrap();
            assert_eq!(&result, expected, "checksum mismatch for {}", expected);
        }
    }

    #[test]
    fn checksummed_input_parses() {
        for case in &EIP55_CASES {
            let addr = parse_address(case).unwrap();
            assert_eq!(to_checksum_address(&addr), *case);
        }
    }

    #[test]
    fn lowercase_and_uppercase_parse_to_same_bytes() {
        let lower = parse_address("0x5aaeb6053f3e94c9b9a09f33669435e7ef1beaed").unwrap();
        let upper = parse_address("0x5AAEB6053F3E94C9B9A09F33669435E7EF1BEAED").unwrap();
        assert_eq!(lower, upper);
        assert_eq!(lower[0], 0x5a);
        assert_eq!(lower[19], 0xed);
    }

    #[test]
    fn bad_checksum_is_rejected() {
        // Intentionally wrong case on a letter to break checksum.
        let addr = "0x5AAEB6053F3E94C9b9A09f33669435E7Ef1BeAed";
        let err = parse_address(addr).unwrap_err();
        assert!(matches!(err, EthError::ChecksumMismatch { .. }));
    }

    #[test]
    fn uppercase_prefix_is_accepted() {
        assert!(parse_address("0X5aaeb6053f3e94c9b9a09f33669435e7ef1beaed").is_ok());
    }

    #[test]
    fn short_address_errors() {
        assert!(parse_address("0x5aAeb6053F").is_err());
    }

    #[test]
    fn missing_prefix_errors() {
        let err = parse_address("5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed").unwrap_err();
        assert_eq!(
            err,
            EthError::InvalidAddress("address must start with 0x".into())
        );
    }

    #[test]
    fn non_hex_chars_error() {
        assert!(parse_address("0xGGGGb6053F3E94C9b9A09f33669435E7Ef1BeAed").is_err());
    }

    #[test]
    fn checksum_address_invalid_length() {
        assert!(checksum_address("0xdeadbeef").is_err());
    }

    #[test]
    fn random_addresses_survive_checksum_roundtrip() {
        use rand::RngCore;

        let mut rng = rand::thread_rng();
        for _ in 0..64 {
            let mut addr = [0u8; ADDRESS_LEN];
            rng.fill_bytes(&mut addr);
            let rendered = to_checksum_address(&addr);
            assert_eq!(parse_address(&rendered).unwrap(), addr);
        }
    }
}
