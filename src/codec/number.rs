//! Integer <-> byte sequence conversion with explicit width and byte order

use super::Endian;
use crate::error::{Error, Result};

/// Widest integer that can be range-checked exactly
const MAX_CHECKED_WIDTH: usize = 16;

/// Encode `value` as `size` bytes
///
/// Unsigned conversion rejects negative values and values that do not fit
/// in `8 * size` bits. Signed conversion checks the two's-complement range
/// and emits negative values as their two's-complement bit pattern. Widths
/// beyond 16 bytes are zero/sign extended.
pub fn number_to_bytes(value: i128, size: usize, endian: Endian, signed: bool) -> Result<Vec<u8>> {
    if size == 0 {
        return Err(Error::Validation(
            "size must be a positive number of bytes".to_string(),
        ));
    }

    if signed {
        if size < MAX_CHECKED_WIDTH {
            let bits = 8 * size as u32;
            let min = -(1i128 << (bits - 1));
            let max = (1i128 << (bits - 1)) - 1;
            if value < min || value > max {
                return Err(Error::Validation(format!(
                    "signed value {} out of range for {} bytes ({}..{})",
                    value, size, min, max
                )));
            }
        }
    } else {
        if value < 0 {
            return Err(Error::Validation(format!(
                "unsigned conversion of negative value {}",
                value
            )));
        }
        if size < MAX_CHECKED_WIDTH {
            let max = (1i128 << (8 * size as u32)) - 1;
            if value > max {
                return Err(Error::Validation(format!(
                    "value {} too large for {} bytes (max {})",
                    value, size, max
                )));
            }
        }
    }

    // Arithmetic shift keeps the sign bits, which is the two's-complement pattern
    let byte_at = |index: usize| -> u8 {
        let shift = 8 * index;
        if shift < 128 {
            ((value >> shift) & 0xFF) as u8
        } else if value < 0 {
            0xFF
        } else {
            0x00
        }
    };

    let out = (0..size)
        .map(|i| match endian {
            Endian::Little => byte_at(i),
            Endian::Big => byte_at(size - 1 - i),
        })
        .collect();

    Ok(out)
}

/// Reassemble an integer from bytes
///
/// Only the low 16 bytes (in significance order) contribute; an empty slice
/// yields zero.
pub fn bytes_to_number(bytes: &[u8], endian: Endian, signed: bool) -> i128 {
    if bytes.is_empty() {
        return 0;
    }

    let width = bytes.len().min(MAX_CHECKED_WIDTH);
    let mut value: u128 = 0;
    for significance in (0..width).rev() {
        let byte = match endian {
            Endian::Little => bytes[significance],
            Endian::Big => bytes[bytes.len() - 1 - significance],
        };
        value = (value << 8) | u128::from(byte);
    }

    let bits = 8 * width as u32;
    if signed && bits < 128 && value & (1u128 << (bits - 1)) != 0 {
        // Sign-extend into the full 128-bit width
        value |= u128::MAX << bits;
    }

    value as i128
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsigned_little_endian() {
        let bytes = number_to_bytes(0x1234, 2, Endian::Little, false).unwrap();
        assert_eq!(bytes, vec![0x34, 0x12]);
    }

    #[test]
    fn test_unsigned_big_endian() {
        let bytes = number_to_bytes(0x01020304, 4, Endian::Big, false).unwrap();
        assert_eq!(bytes, vec![0x01, 0x02, 0x03, 0x04]);
    }

    #[test]
    fn test_signed_negative_is_twos_complement() {
        assert_eq!(number_to_bytes(-1, 2, Endian::Little, true).unwrap(), vec![0xFF, 0xFF]);
        assert_eq!(number_to_bytes(-128, 1, Endian::Little, true).unwrap(), vec![0x80]);
        assert_eq!(
            number_to_bytes(-2, 4, Endian::Big, true).unwrap(),
            vec![0xFF, 0xFF, 0xFF, 0xFE]
        );
    }

    #[test]
    fn test_unsigned_bounds() {
        assert!(number_to_bytes(255, 1, Endian::Little, false).is_ok());
        assert!(matches!(
            number_to_bytes(256, 1, Endian::Little, false),
            Err(Error::Validation(_))
        ));
        assert!(matches!(
            number_to_bytes(-1, 4, Endian::Little, false),
            Err(Error::Validation(_))
        ));
    }

    #[test]
    fn test_signed_bounds() {
        assert!(number_to_bytes(127, 1, Endian::Little, true).is_ok());
        assert!(number_to_bytes(-128, 1, Endian::Little, true).is_ok());
        assert!(number_to_bytes(128, 1, Endian::Little, true).is_err());
        assert!(number_to_bytes(-129, 1, Endian::Little, true).is_err());
        assert!(number_to_bytes(i32::MIN as i128, 4, Endian::Big, true).is_ok());
        assert!(number_to_bytes(i32::MAX as i128 + 1, 4, Endian::Big, true).is_err());
    }

    #[test]
    fn test_zero_size_rejected() {
        assert!(matches!(
            number_to_bytes(0, 0, Endian::Little, false),
            Err(Error::Validation(_))
        ));
    }

    #[test]
    fn test_odd_width_and_wide_extension() {
        assert_eq!(
            number_to_bytes(0x0A0B0C, 3, Endian::Big, false).unwrap(),
            vec![0x0A, 0x0B, 0x0C]
        );
        let wide = number_to_bytes(-1, 20, Endian::Little, true).unwrap();
        assert_eq!(wide, vec![0xFF; 20]);
        let wide = number_to_bytes(1, 18, Endian::Big, false).unwrap();
        assert_eq!(wide[17], 1);
        assert!(wide[..17].iter().all(|&b| b == 0));
    }

    #[test]
    fn test_reassembly_recovers_value() {
        let cases: [(i128, usize, Endian, bool); 6] = [
            (0xBEEF, 2, Endian::Little, false),
            (-12345, 2, Endian::Big, true),
            (-1, 1, Endian::Little, true),
            (0xFFFF_FFFF, 4, Endian::Big, false),
            (i32::MIN as i128, 4, Endian::Little, true),
            (0x00AB_CDEF, 3, Endian::Little, false),
        ];
        for (value, size, endian, signed) in cases {
            let bytes = number_to_bytes(value, size, endian, signed).unwrap();
            assert_eq!(bytes_to_number(&bytes, endian, signed), value);
        }
    }

    #[test]
    fn test_bytes_to_number_unsigned_high_bit() {
        assert_eq!(bytes_to_number(&[0xFF], Endian::Little, false), 255);
        assert_eq!(bytes_to_number(&[0xFF], Endian::Little, true), -1);
        assert_eq!(bytes_to_number(&[], Endian::Big, true), 0);
    }
}
