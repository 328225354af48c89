//! # Table Catalog
//!
//! Process-wide, immutable map from table identifier to its name and to the
//! byte size of its payload for each firmware revision.
//!
//! Some tables are stored with their identifier as a leading tag byte inside
//! the in-memory record. That byte is not part of the file or transport
//! payload, so the sizes reported here are payload sizes (record size minus
//! the tag).
//!
//! ## Usage Example
//!
//! ```rust
//! use mm_tables::constants::DLOG_MT_CARRIER_TABLE_EXP;
//! use mm_tables::table::catalog::{expected_size_of, name_of, validate};
//! use mm_tables::table::Revision;
//!
//! let size = expected_size_of(DLOG_MT_CARRIER_TABLE_EXP, Revision::Mtr2).unwrap();
//! assert!(validate(DLOG_MT_CARRIER_TABLE_EXP, Revision::Mtr2, size).is_ok());
//! assert!(validate(DLOG_MT_CARRIER_TABLE_EXP, Revision::Mtr2, size + 1).is_err());
//! println!("{}", name_of(DLOG_MT_CARRIER_TABLE_EXP).unwrap());
//! ```

use crate::constants::*;
use crate::error::{Result, TableError};
use log::{debug, warn};
use once_cell::sync::Lazy;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;

/// Firmware revision of the terminal's control PCP.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, clap::ValueEnum)]
pub enum Revision {
    /// MTR 1.x
    Mtr1,
    /// MTR 2.x
    Mtr2,
}

impl fmt::Display for Revision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Revision::Mtr1 => write!(f, "MTR 1.x"),
            Revision::Mtr2 => write!(f, "MTR 2.x"),
        }
    }
}

/// Static description of one table kind.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableInfo {
    pub id: u8,
    pub name: &'static str,
    pub description: &'static str,
    /// Payload size under MTR 1.x, if the table exists there
    pub mtr1_len: Option<usize>,
    /// Payload size under MTR 2.x, if the table exists there
    pub mtr2_len: Option<usize>,
    /// Record carries the identifier as a leading byte outside the payload
    pub tagged: bool,
}

impl TableInfo {
    const fn new(
        id: u8,
        name: &'static str,
        description: &'static str,
        mtr1_len: Option<usize>,
        mtr2_len: Option<usize>,
        tagged: bool,
    ) -> Self {
        Self {
            id,
            name,
            description,
            mtr1_len,
            mtr2_len,
            tagged,
        }
    }

    /// Payload size for `revision`.
    pub fn payload_len(&self, revision: Revision) -> Result<usize> {
        match revision {
            Revision::Mtr1 => self.mtr1_len,
            Revision::Mtr2 => self.mtr2_len,
        }
        .ok_or(TableError::UnsupportedRevision {
            table: self.id,
            revision,
        })
    }

    /// In-memory record size for `revision`, tag byte included.
    pub fn record_len(&self, revision: Revision) -> Result<usize> {
        Ok(self.payload_len(revision)? + usize::from(self.tagged))
    }
}

/// Every table this crate can load.
pub static TABLE_CATALOG: Lazy<HashMap<u8, TableInfo>> = Lazy::new(|| {
    let mut map = HashMap::new();

    map.insert(DLOG_MT_CARD_TABLE, TableInfo::new(
        DLOG_MT_CARD_TABLE, "CARD", "Card table (MTR 1.x)",
        Some(CARD_TABLE_LEN_MTR1), None, false,
    ));
    map.insert(DLOG_MT_INSTALL_PARAMS, TableInfo::new(
        DLOG_MT_INSTALL_PARAMS, "INSTSV", "Installation parameters",
        Some(INSTALL_PARAMS_LEN), Some(INSTALL_PARAMS_LEN), false,
    ));
    map.insert(DLOG_MT_CARRIER_TABLE_EXP, TableInfo::new(
        DLOG_MT_CARRIER_TABLE_EXP, "CARRIER_EXP", "Expanded carrier table",
        Some(CARRIER_TABLE_LEN - 1), Some(CARRIER_TABLE_LEN - 1), true,
    ));
    map.insert(DLOG_MT_CARD_TABLE_EXP, TableInfo::new(
        DLOG_MT_CARD_TABLE_EXP, "CARD_EXP", "Expanded card table (MTR 2.x)",
        None, Some(CARD_TABLE_LEN), false,
    ));

    for (id, name) in [
        (DLOG_MT_NPA_NXX_TABLE_1, "LCD_1"),
        (DLOG_MT_NPA_NXX_TABLE_2, "LCD_2"),
        (DLOG_MT_NPA_NXX_TABLE_3, "LCD_3"),
    ] {
        map.insert(id, TableInfo::new(
            id, name, "NPA-NXX local call determination table",
            Some(LCD_TABLE_LEN_COMPRESSED), Some(LCD_TABLE_LEN_DOUBLE_COMPRESSED), true,
        ));
    }

    map
});

/// Look up a table by identifier.
pub fn lookup(table_id: u8) -> Result<&'static TableInfo> {
    TABLE_CATALOG
        .get(&table_id)
        .ok_or(TableError::UnknownTable(table_id))
}

/// Short name of a table, e.g. `"CARRIER_EXP"`.
pub fn name_of(table_id: u8) -> Result<&'static str> {
    lookup(table_id).map(|info| info.name)
}

/// Expected payload size of a table for `revision`.
pub fn expected_size_of(table_id: u8, revision: Revision) -> Result<usize> {
    lookup(table_id)?.payload_len(revision)
}

/// Check an observed payload size against the catalog before any parsing.
///
/// The comparison is exact; a larger input is rejected just like a shorter one.
pub fn validate(table_id: u8, revision: Revision, actual: usize) -> Result<()> {
    let expected = expected_size_of(table_id, revision)?;

    if actual != expected {
        warn!(
            "{} table 0x{:02x}: expected {} bytes, got {}",
            name_of(table_id)?,
            table_id,
            expected,
            actual
        );
        return Err(TableError::SizeMismatch {
            table: table_id,
            expected,
            actual,
        });
    }

    debug!("Table 0x{table_id:02x} size {actual} OK for {revision}");
    Ok(())
}

/// All catalog entries ordered by identifier.
pub fn all_tables() -> Vec<&'static TableInfo> {
    let mut tables: Vec<_> = TABLE_CATALOG.values().collect();
    tables.sort_by_key(|info| info.id);
    tables
}
