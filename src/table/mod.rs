//! # DLOG Tables
//!
//! Fixed-layout records exchanged with the terminal. Every table type
//! implements [`DlogTable`]: decoding first validates the payload size against
//! the [`catalog`] for the requested revision and only then parses fields at
//! their fixed offsets.
//!
//! ## Usage
//!
//! ```rust
//! use mm_tables::table::{carrier::CarrierTable, DlogTable, Revision};
//!
//! let mut table = CarrierTable::default();
//! table.provision_standard();
//!
//! let payload = table.encode();
//! let decoded = CarrierTable::decode(&payload, Revision::Mtr2).unwrap();
//! assert_eq!(decoded.active_entries().count(), 10);
//! ```

pub mod card;
pub mod carrier;
pub mod catalog;
pub mod convert;
pub mod install;
pub mod layout;
pub mod lcd;

pub use catalog::{Revision, TableInfo};

use crate::error::{Result, TableError};

/// A table record with a byte-exact payload layout.
pub trait DlogTable: Sized {
    /// Validate the payload size for `revision` and parse it.
    fn decode(payload: &[u8], revision: Revision) -> Result<Self>;

    /// Decode a payload stored under `table_id`. The decoded table keeps that
    /// identifier; types that serve a single table reject any other.
    fn decode_as(table_id: u8, payload: &[u8], revision: Revision) -> Result<Self> {
        catalog::lookup(table_id)?;
        let table = Self::decode(payload, revision)?;
        if table.table_id() != table_id {
            return Err(TableError::InvalidField {
                field: "table id",
                reason: format!(
                    "0x{table_id:02x} does not hold a 0x{:02x} record",
                    table.table_id()
                ),
            });
        }
        Ok(table)
    }

    /// Payload bytes, tag byte excluded.
    fn encode(&self) -> Vec<u8>;

    fn table_id(&self) -> u8;
}
