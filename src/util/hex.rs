//! # Hex Encoding/Decoding Utilities
//!
//! Hex helpers for inspecting table payloads and for writing test fixtures.
//!
//! ## Usage
//!
//! ```rust
//! use mm_tables::util::hex::{dump_hex, parse_hex, format_hex_compact};
//!
//! let data = parse_hex("40 8e 00 01").unwrap();
//! assert_eq!(format_hex_compact(&data), "40 8e 00 01");
//!
//! // Offset, bytes and ASCII gutter, 16 bytes per line
//! println!("{}", dump_hex(&data));
//! ```

use thiserror::Error;

/// Errors that can occur during hex parsing
#[derive(Error, Debug, Clone, PartialEq)]
pub enum HexError {
    #[error("Odd number of hex characters: {0}")]
    OddLength(usize),

    #[error("Empty hex string")]
    EmptyString,

    #[error("Hex decoding error: {0}")]
    DecodeError(String),
}

const BYTES_PER_LINE: usize = 16;

/// Encode bytes to a lowercase hex string.
pub fn encode_hex(data: &[u8]) -> String {
    hex::encode(data)
}

/// Parse whitespace separated hex, e.g. `"40 8e\n00 01"`.
pub fn parse_hex(input: &str) -> Result<Vec<u8>, HexError> {
    let cleaned: String = input.chars().filter(|c| !c.is_whitespace()).collect();

    if cleaned.is_empty() {
        return Err(HexError::EmptyString);
    }

    if cleaned.len() % 2 != 0 {
        return Err(HexError::OddLength(cleaned.len()));
    }

    hex::decode(&cleaned).map_err(|e| HexError::DecodeError(e.to_string()))
}

/// Bytes as "40 8e 00 01", for log lines.
pub fn format_hex_compact(data: &[u8]) -> String {
    data.iter()
        .map(|b| format!("{b:02x}"))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Multi-line dump: decimal offset, 16 comma separated bytes, then the
/// printable characters with `.` for everything outside 0x20..0x7f.
pub fn dump_hex(data: &[u8]) -> String {
    let mut out = String::new();

    for (line, chunk) in data.chunks(BYTES_PER_LINE).enumerate() {
        if line > 0 {
            out.push('\n');
        }
        out.push_str(&format!("{:03}: ", line * BYTES_PER_LINE));

        for byte in chunk {
            out.push_str(&format!("{byte:02x}, "));
        }
        out.push_str(&"    ".repeat(BYTES_PER_LINE - chunk.len()));

        out.extend(chunk.iter().map(|&b| {
            if (0x20..0x7f).contains(&b) {
                b as char
            } else {
                '.'
            }
        }));
    }

    out
}
