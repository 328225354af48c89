//! # mm-tables - A Rust Crate for Payphone Terminal DLOG Tables
//!
//! The mm-tables crate decodes, validates, edits and re-encodes the fixed-layout
//! binary tables a payphone terminal exchanges with its management host.
//!
//! ## Features
//!
//! - Table catalog mapping table identifiers to names and exact record sizes per firmware revision
//! - Size validation before any field is interpreted
//! - Carrier, card, installation parameter and NPA-NXX (LCD) table codecs
//! - The three packed digit codecs used by different table fields, call type rendering and bit-flag labels
//! - Field-mapped conversion of card tables between MTR 1.x and MTR 2.x layouts
//! - CRC-16 (poly 0xA001) stamping and verification of stored records
//! - Support for logging and error handling
//!
//! ## Usage
//!
//! ```toml
//! [dependencies]
//! mm-tables = "1.0.0"
//! ```
//!
//! ```rust
//! use mm_tables::{
//!     catalog, crc16, phone_num_to_string, CarrierTable, DlogTable, Revision, TableError,
//!     DLOG_MT_CARRIER_TABLE_EXP,
//! };
//!
//! assert_eq!(catalog::expected_size_of(DLOG_MT_CARRIER_TABLE_EXP, Revision::Mtr2).unwrap(), 1102);
//! assert!(matches!(
//!     CarrierTable::decode(&[0u8; 10], Revision::Mtr2),
//!     Err(TableError::SizeMismatch { .. })
//! ));
//! assert_eq!(phone_num_to_string(&[0x40, 0x8e], 16), "408");
//! assert_eq!(crc16(0, b"123456789"), 0xbb3d);
//! ```

pub mod codec;
pub mod constants;
pub mod error;
pub mod logging;
pub mod store;
pub mod table;
pub mod util;

pub use crate::error::{Result, TableError};
pub use crate::logging::{init_logger, log_info};

pub use codec::{
    call_type_to_string, callscrn_num_to_string, crc16, decode_flags, format_flags,
    phone_num_to_string, stamp, string_to_bcd_a, unstamp, Stamped,
};
pub use constants::{
    DLOG_MT_CARD_TABLE, DLOG_MT_CARD_TABLE_EXP, DLOG_MT_CARRIER_TABLE_EXP,
    DLOG_MT_INSTALL_PARAMS, DLOG_MT_NPA_NXX_TABLE_1, DLOG_MT_NPA_NXX_TABLE_2,
    DLOG_MT_NPA_NXX_TABLE_3,
};
pub use table::{
    card::{CardEntry, CardTable},
    carrier::{CarrierEntry, CarrierTable},
    catalog,
    convert::convert_card_table,
    install::InstallParams,
    lcd::{LcdTable, NxxEncoding},
    DlogTable, Revision, TableInfo,
};
