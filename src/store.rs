//! # Table Files
//!
//! Load and store table payloads on disk. A table file holds exactly the
//! payload bytes; its size is checked against the catalog from the file
//! metadata before anything is read, so a wrongly sized file is never parsed.
//!
//! Stamped files carry a trailing little-endian CRC-16 (see
//! [`crate::codec::crc`]). A checksum mismatch does not prevent loading: the
//! table is returned together with the verdict and the caller decides.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use mm_tables::store;
//! use mm_tables::table::{carrier::CarrierTable, Revision};
//! use mm_tables::constants::DLOG_MT_CARRIER_TABLE_EXP;
//!
//! let table: CarrierTable =
//!     store::load("carrier.bin", DLOG_MT_CARRIER_TABLE_EXP, Revision::Mtr2)?;
//! store::save_stamped("carrier.crc", &table)?;
//! # Ok::<(), mm_tables::TableError>(())
//! ```

use crate::codec::crc::{stamp, unstamp};
use crate::constants::CHECKSUM_LEN;
use crate::error::{Result, TableError};
use crate::table::catalog::{self, Revision};
use crate::table::DlogTable;
use crate::util::hex::format_hex_compact;
use log::{debug, info, warn};
use std::fs;
use std::path::Path;

/// A table read from a stamped file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StampedTable<T> {
    pub table: T,
    pub stored: u16,
    pub calculated: u16,
}

impl<T> StampedTable<T> {
    pub fn is_valid(&self) -> bool {
        self.stored == self.calculated
    }

    /// The table, or `ChecksumMismatch` when the trailer disagrees.
    pub fn verified(self) -> Result<T> {
        if self.is_valid() {
            Ok(self.table)
        } else {
            Err(TableError::ChecksumMismatch {
                expected: self.stored,
                calculated: self.calculated,
            })
        }
    }
}

fn read_sized(path: &Path, table_id: u8, expected: usize) -> Result<Vec<u8>> {
    let actual = fs::metadata(path)?.len() as usize;
    if actual != expected {
        warn!(
            "{}: {} bytes, table 0x{:02x} needs {}",
            path.display(),
            actual,
            table_id,
            expected
        );
        return Err(TableError::SizeMismatch {
            table: table_id,
            expected,
            actual,
        });
    }

    let bytes = fs::read(path)?;
    // The file may have changed between stat and read
    if bytes.len() != expected {
        return Err(TableError::SizeMismatch {
            table: table_id,
            expected,
            actual: bytes.len(),
        });
    }

    debug!(
        "{}: {} ...",
        path.display(),
        format_hex_compact(&bytes[..bytes.len().min(16)])
    );
    Ok(bytes)
}

/// Read a raw table payload, validating its size first.
pub fn read_table_file(path: impl AsRef<Path>, table_id: u8, revision: Revision) -> Result<Vec<u8>> {
    let path = path.as_ref();
    let expected = catalog::expected_size_of(table_id, revision)?;
    let bytes = read_sized(path, table_id, expected)?;
    info!(
        "Loaded {} ({} bytes) from {}",
        catalog::name_of(table_id)?,
        bytes.len(),
        path.display()
    );
    Ok(bytes)
}

pub fn write_table_file(path: impl AsRef<Path>, payload: &[u8]) -> Result<()> {
    let path = path.as_ref();
    fs::write(path, payload)?;
    info!("Wrote {} bytes to {}", payload.len(), path.display());
    Ok(())
}

/// Read and decode a table file.
pub fn load<T: DlogTable>(path: impl AsRef<Path>, table_id: u8, revision: Revision) -> Result<T> {
    let bytes = read_table_file(path, table_id, revision)?;
    T::decode_as(table_id, &bytes, revision)
}

pub fn save<T: DlogTable>(path: impl AsRef<Path>, table: &T) -> Result<()> {
    write_table_file(path, &table.encode())
}

/// Read and decode a file written by [`save_stamped`].
pub fn load_stamped<T: DlogTable>(
    path: impl AsRef<Path>,
    table_id: u8,
    revision: Revision,
) -> Result<StampedTable<T>> {
    let path = path.as_ref();
    let expected = catalog::expected_size_of(table_id, revision)? + CHECKSUM_LEN;
    let bytes = read_sized(path, table_id, expected)?;

    let stamped = unstamp(&bytes)?;
    if !stamped.is_valid() {
        warn!("{}: checksum mismatch, loading anyway", path.display());
    }

    Ok(StampedTable {
        table: T::decode_as(table_id, stamped.payload, revision)?,
        stored: stamped.stored,
        calculated: stamped.calculated,
    })
}

/// Encode, append the checksum and write.
pub fn save_stamped<T: DlogTable>(path: impl AsRef<Path>, table: &T) -> Result<()> {
    write_table_file(path, &stamp(&table.encode()))
}
