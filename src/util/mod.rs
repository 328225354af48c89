//! # Utility Modules
//!
//! Helpers shared by the library and the command line tool.

pub mod hex;

pub use hex::{dump_hex, encode_hex, format_hex_compact, parse_hex, HexError};
