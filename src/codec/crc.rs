//! # Table Checksum
//!
//! Reflected CRC-16 over the reversed polynomial 0xA001. With a zero seed this
//! is CRC-16/ARC, with 0xFFFF it is CRC-16/MODBUS.
//!
//! Stored records carry the checksum as a little-endian trailer:
//!
//! ```text
//! +----------------------+---------+---------+
//! | record bytes ...     | crc lo  | crc hi  |
//! +----------------------+---------+---------+
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use mm_tables::codec::crc::{crc16, stamp, unstamp};
//!
//! assert_eq!(crc16(0, b"123456789"), 0xBB3D);
//!
//! let stored = stamp(&[0x01, 0x02, 0x03]);
//! let checked = unstamp(&stored).unwrap();
//! assert!(checked.is_valid());
//! assert_eq!(checked.payload, &[0x01, 0x02, 0x03]);
//! ```

use crate::constants::{CHECKSUM_LEN, CHECKSUM_SEED, CRC16_POLY};
use crate::error::{Result, TableError};
use log::warn;

/// Calculate CRC-16 (poly 0xA001, reflected) over `data` starting from `seed`.
pub fn crc16(seed: u16, data: &[u8]) -> u16 {
    let mut crc = seed;

    for &byte in data {
        crc ^= byte as u16;
        for _ in 0..8 {
            if crc & 1 != 0 {
                crc = (crc >> 1) ^ CRC16_POLY;
            } else {
                crc >>= 1;
            }
        }
    }

    crc
}

/// Append the checksum of `record` (default seed) as a little-endian trailer.
pub fn stamp(record: &[u8]) -> Vec<u8> {
    stamp_with_seed(CHECKSUM_SEED, record)
}

/// Append the checksum of `record` computed from `seed`.
pub fn stamp_with_seed(seed: u16, record: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(record.len() + CHECKSUM_LEN);
    out.extend_from_slice(record);
    out.extend_from_slice(&crc16(seed, record).to_le_bytes());
    out
}

/// A stored record split into payload and trailer.
///
/// A mismatch does not prevent access to the payload; callers decide whether
/// to proceed or call [`Stamped::check`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stamped<'a> {
    pub payload: &'a [u8],
    pub stored: u16,
    pub calculated: u16,
}

impl<'a> Stamped<'a> {
    pub fn is_valid(&self) -> bool {
        self.stored == self.calculated
    }

    /// Promote a mismatch to [`TableError::ChecksumMismatch`].
    pub fn check(&self) -> Result<&'a [u8]> {
        if self.is_valid() {
            Ok(self.payload)
        } else {
            Err(TableError::ChecksumMismatch {
                expected: self.stored,
                calculated: self.calculated,
            })
        }
    }
}

/// Split a stamped record using the default seed.
pub fn unstamp(stored: &[u8]) -> Result<Stamped<'_>> {
    unstamp_with_seed(CHECKSUM_SEED, stored)
}

/// Split a stamped record and recompute its checksum from `seed`.
///
/// Fails only when the input is too short to hold a trailer.
pub fn unstamp_with_seed(seed: u16, stored: &[u8]) -> Result<Stamped<'_>> {
    if stored.len() < CHECKSUM_LEN {
        return Err(TableError::BufferTooSmall {
            needed: CHECKSUM_LEN,
            available: stored.len(),
        });
    }

    let (payload, trailer) = stored.split_at(stored.len() - CHECKSUM_LEN);
    let stamped = Stamped {
        payload,
        stored: u16::from_le_bytes([trailer[0], trailer[1]]),
        calculated: crc16(seed, payload),
    };

    if !stamped.is_valid() {
        warn!(
            "Checksum mismatch over {} bytes: stored 0x{:04x}, calculated 0x{:04x}",
            payload.len(),
            stamped.stored,
            stamped.calculated
        );
    }

    Ok(stamped)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_value() {
        assert_eq!(crc16(0x0000, b"123456789"), 0xBB3D);
        assert_eq!(crc16(0xFFFF, b"123456789"), 0x4B37);
    }

    #[test]
    fn test_empty_input_returns_seed() {
        assert_eq!(crc16(0x0000, &[]), 0x0000);
        assert_eq!(crc16(0x1234, &[]), 0x1234);
    }

    #[test]
    fn test_incremental() {
        let data = b"carrier table";
        let (a, b) = data.split_at(5);
        assert_eq!(crc16(crc16(0, a), b), crc16(0, data));
    }

    #[test]
    fn test_stamp_trailer_is_little_endian() {
        let stored = stamp(b"123456789");
        assert_eq!(&stored[9..], &[0x3D, 0xBB]);
    }

    #[test]
    fn test_corruption_detected() {
        let mut stored = stamp(&[0x10, 0x20, 0x30, 0x40]);
        stored[1] ^= 0x01;
        let checked = unstamp(&stored).unwrap();
        assert!(!checked.is_valid());
        assert_eq!(checked.payload, &[0x10, 0x21, 0x30, 0x40]);
        assert!(matches!(
            checked.check(),
            Err(TableError::ChecksumMismatch { .. })
        ));
    }

    #[test]
    fn test_unstamp_short_input() {
        assert!(matches!(
            unstamp(&[0x01]),
            Err(TableError::BufferTooSmall { needed: 2, available: 1 })
        ));
    }
}
