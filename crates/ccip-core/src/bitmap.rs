//! Writable-account bitmaps.
//!
//! Bit `i` (LSB first) marks `accounts[i]` as writable. On the wire the
//! bitmap occupies `ceil(n / 8)` little-endian bytes for `n` accounts, so
//! account 0 is bit 0 of the first byte.

use alloy_primitives::U256;
use serde::Serialize;

use crate::error::CcipError;

/// Number of account slots a bitmap can describe.
pub const BITMAP_CAPACITY: usize = U256::BITS;

/// One row of [`explain`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WritableSlot {
    pub index: usize,
    pub writable: bool,
}

/// Builds the bitmap for an ordered list of writability flags.
pub fn compute_writable_bitmap(flags: &[bool]) -> Result<U256, CcipError> {
    if flags.len() > BITMAP_CAPACITY {
        return Err(CcipError::TooManyAccounts {
            count: flags.len(),
            max: BITMAP_CAPACITY,
        });
    }

    let mut bitmap = U256::ZERO;
    for (i, writable) in flags.iter().enumerate() {
        if *writable {
            bitmap.set_bit(i, true);
        }
    }
    Ok(bitmap)
}

/// Rejects bitmaps that mark a slot at or past `account_count` writable.
pub fn validate_bitmap(bitmap: U256, account_count: usize) -> Result<(), CcipError> {
    if bitmap.bit_len() > account_count {
        return Err(CcipError::BitmapOverflow {
            bitmap: bitmap.to_string(),
            account_count,
        });
    }
    Ok(())
}

pub fn is_writable(bitmap: U256, index: usize) -> bool {
    index < BITMAP_CAPACITY && bitmap.bit(index)
}

/// Per-slot view of a bitmap, for diagnostics.
pub fn explain(bitmap: U256, account_count: usize) -> Vec<WritableSlot> {
    (0..account_count)
        .map(|index| WritableSlot {
            index,
            writable: is_writable(bitmap, index),
        })
        .collect()
}

/// Wire length of the bitmap for `account_count` accounts.
pub fn encoded_len(account_count: usize) -> usize {
    account_count.div_ceil(8)
}

/// Serializes a validated bitmap into its `ceil(n / 8)`-byte wire form.
pub fn encode_bitmap(bitmap: U256, account_count: usize) -> Result<Vec<u8>, CcipError> {
    if account_count > BITMAP_CAPACITY {
        return Err(CcipError::TooManyAccounts {
            count: account_count,
            max: BITMAP_CAPACITY,
        });
    }
    validate_bitmap(bitmap, account_count)?;

    let bytes = bitmap.to_le_bytes::<32>();
    Ok(bytes[..encoded_len(account_count)].to_vec())
}

/// Parses a wire bitmap. Stray bits in the final partial byte are an error.
pub fn decode_bitmap(bytes: &[u8], account_count: usize) -> Result<U256, CcipError> {
    if account_count > BITMAP_CAPACITY {
        return Err(CcipError::TooManyAccounts {
            count: account_count,
            max: BITMAP_CAPACITY,
        });
    }
    let expected = encoded_len(account_count);
    if bytes.len() != expected {
        return Err(CcipError::TruncatedBuffer {
            needed: expected,
            got: bytes.len(),
        });
    }

    // At most 32 bytes here, which always fits.
    let bitmap = U256::try_from_le_slice(bytes).unwrap_or_default();
    validate_bitmap(bitmap, account_count)?;
    Ok(bitmap)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compute_sets_bits_lsb_first() {
        let bitmap = compute_writable_bitmap(&[false, true]).unwrap();
        assert_eq!(bitmap, U256::from(0b10u8));

        let bitmap = compute_writable_bitmap(&[true, false, true, true]).unwrap();
        assert_eq!(bitmap, U256::from(0b1101u8));
    }

    #[test]
    fn compute_empty_is_zero() {
        assert_eq!(compute_writable_bitmap(&[]).unwrap(), U256::ZERO);
    }

    #[test]
    fn compute_beyond_machine_word() {
        let mut flags = vec![false; 200];
        flags[199] = true;
        flags[64] = true;
        let bitmap = compute_writable_bitmap(&flags).unwrap();
        assert!(bitmap.bit(199));
        assert!(bitmap.bit(64));
        assert_eq!(bitmap.count_ones(), 2);
        assert!(validate_bitmap(bitmap, 200).is_ok());
    }

    #[test]
    fn compute_rejects_too_many_flags() {
        let flags = vec![true; BITMAP_CAPACITY + 1];
        assert_eq!(
            compute_writable_bitmap(&flags),
            Err(CcipError::TooManyAccounts {
                count: 257,
                max: 256
            })
        );
    }

    #[test]
    fn bit_past_account_count_overflows() {
        assert_eq!(
            validate_bitmap(U256::from(4u8), 2),
            Err(CcipError::BitmapOverflow {
                bitmap: "4".into(),
                account_count: 2
            })
        );
    }

    #[test]
    fn zero_accounts() {
        assert!(validate_bitmap(U256::ZERO, 0).is_ok());
        assert!(validate_bitmap(U256::from(1u8), 0).is_err());
    }

    #[test]
    fn valid_iff_below_two_pow_n() {
        for n in 0..12usize {
            for b in 0u32..(1 << 13) {
                let ok = validate_bitmap(U256::from(b), n).is_ok();
                assert_eq!(ok, (b as u64) < (1u64 << n), "b={b} n={n}");
            }
        }
    }

    #[test]
    fn full_width_bitmap_is_valid_for_full_capacity() {
        assert!(validate_bitmap(U256::MAX, BITMAP_CAPACITY).is_ok());
        assert!(validate_bitmap(U256::MAX, BITMAP_CAPACITY - 1).is_err());
    }

    #[test]
    fn explain_lists_every_slot() {
        let slots = explain(U256::from(0b10u8), 3);
        assert_eq!(
            slots,
            vec![
                WritableSlot { index: 0, writable: false },
                WritableSlot { index: 1, writable: true },
                WritableSlot { index: 2, writable: false },
            ]
        );
        assert!(explain(U256::ZERO, 0).is_empty());
    }

    #[test]
    fn wire_form_is_little_endian_and_minimal() {
        assert_eq!(encode_bitmap(U256::ZERO, 0).unwrap(), Vec::<u8>::new());
        assert_eq!(encode_bitmap(U256::from(0b10u8), 2).unwrap(), vec![0x02]);

        let mut flags = vec![false; 9];
        flags[8] = true;
        flags[0] = true;
        let bitmap = compute_writable_bitmap(&flags).unwrap();
        assert_eq!(encode_bitmap(bitmap, 9).unwrap(), vec![0x01, 0x01]);
        assert_eq!(decode_bitmap(&[0x01, 0x01], 9).unwrap(), bitmap);
    }

    #[test]
    fn decode_rejects_stray_bits() {
        // Three accounts, but bit 3 is set in the only byte.
        assert!(matches!(
            decode_bitmap(&[0b1000], 3),
            Err(CcipError::BitmapOverflow { .. })
        ));
    }

    #[test]
    fn encode_refuses_invalid_bitmap() {
        assert!(encode_bitmap(U256::from(4u8), 2).is_err());
    }
}
