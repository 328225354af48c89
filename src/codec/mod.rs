//! Field-level codecs shared by all tables: the record checksum, packed digit
//! strings and bit-flag rendering.

pub mod crc;
pub mod digits;
pub mod flags;

pub use crc::{crc16, stamp, unstamp, Stamped};
pub use digits::{
    call_type_to_string, callscrn_num_to_string, phone_num_to_string, string_to_bcd_a,
};
pub use flags::{decode_flags, format_flags};
