//! # Packed Digit Codecs
//!
//! Phone-number-like fields store two 4-bit digit codes per byte, high nibble
//! first. Different table fields use different conventions and the codecs here
//! are NOT interchangeable:
//!
//! | Function | Direction | Digit `0` | Stops at |
//! |----------|-----------|-----------|----------|
//! | [`phone_num_to_string`] | decode | nibble 0x0 | nibble 0xE, capacity |
//! | [`string_to_bcd_a`] | encode | nibble 0xA | input end, buffer full |
//! | [`callscrn_num_to_string`] | decode | nibble 0xA | capacity only |
//!
//! `capacity` mirrors a C-style destination buffer: one slot is reserved for a
//! terminator, so at most `capacity - 1` characters are produced.
//!
//! The call-type byte renderer lives here as well since it shares the
//! bounded-destination contract.

use crate::error::{Result, TableError};

/// Nibble ending a terminator-delimited number.
pub const DIGIT_END_MARKER: u8 = 0x0E;

/// Nibble used for the digit `0` by [`string_to_bcd_a`].
pub const DIGIT_ZERO_SENTINEL: u8 = 0x0A;

/// Translation table for call-screening numbers.
pub const CALLSCRN_DIGITS: [char; 16] = [
    '\0', '1', '2', '3', '4', '5', '6', '7', '8', '9', '0', 'B', 'C', 'D', 'E', 'F',
];

/// Call type (low nibble of CALLTYP).
pub const CALL_TYPE_LABELS: [&str; 16] = [
    "Incoming",
    "Unanswered",
    "Abandoned",
    "Local",
    "Intra-LATA",
    "Inter-LATA",
    "International",
    "Operator",
    "Zero+",
    "1-800",
    "Directory Assistance",
    "Denied",
    "Unassigned",
    "Unassigned2",
    "e-Purse",
    "Unknown",
];

/// Payment type (high nibble of CALLTYP).
pub const PAYMENT_TYPE_LABELS: [&str; 16] = [
    "Unused0",
    "Unused1",
    "No Charge",
    "Coin",
    "Credit Card",
    "Calling Card",
    "Cash Card",
    "Inmate",
    "Mondex",
    "Visa Stored Value",
    "Smart City",
    "Proton",
    "UndefinedC",
    "UndefinedD",
    "UndefinedE",
    "UndefinedF",
];

fn nibbles(buf: &[u8]) -> impl Iterator<Item = u8> + '_ {
    buf.iter().flat_map(|&b| [b >> 4, b & 0x0F])
}

/// Decode a number terminated by nibble 0xE.
///
/// Nibble `v` becomes `'0' + v`. Nibbles 0xA..=0xF other than 0xE are not
/// special-cased and yield the characters following `'9'` in ASCII.
pub fn phone_num_to_string(num: &[u8], capacity: usize) -> String {
    let max_digits = capacity.saturating_sub(1);

    nibbles(num)
        .take_while(|&n| n != DIGIT_END_MARKER)
        .take(max_digits)
        .map(|n| (b'0' + n) as char)
        .collect()
}

/// Encode a digit string into `out`, writing `'0'` as nibble 0xA.
///
/// `out` is zero-filled first. Returns the number of input characters consumed,
/// which is bounded by `out.len() * 2`.
pub fn string_to_bcd_a(digits: &str, out: &mut [u8]) -> usize {
    out.fill(0);

    let mut consumed = 0;
    for (i, c) in digits.bytes().take(out.len() * 2).enumerate() {
        let code = if c == b'0' {
            DIGIT_ZERO_SENTINEL
        } else {
            c.wrapping_sub(b'0') & 0x0F
        };

        if i % 2 == 0 {
            out[i / 2] = code << 4;
        } else {
            out[i / 2] |= code;
        }
        consumed += 1;
    }

    consumed
}

/// Decode a call-screening number through [`CALLSCRN_DIGITS`].
///
/// Every nibble maps to a character, including nibble 0 which maps to NUL.
pub fn callscrn_num_to_string(num: &[u8], capacity: usize) -> String {
    let max_digits = capacity.saturating_sub(1);

    nibbles(num)
        .take(max_digits)
        .map(|n| CALLSCRN_DIGITS[n as usize])
        .collect()
}

/// Render a CALLTYP byte as `"<call type> <payment type>"`.
///
/// Fails with [`TableError::BufferTooSmall`] when the rendered text is longer
/// than `capacity`; nothing is produced in that case.
pub fn call_type_to_string(call_type: u8, capacity: usize) -> Result<String> {
    let call = CALL_TYPE_LABELS[(call_type & 0x0F) as usize];
    let payment = PAYMENT_TYPE_LABELS[(call_type >> 4) as usize];
    let needed = call.len() + payment.len() + 1;

    if needed > capacity {
        return Err(TableError::BufferTooSmall {
            needed,
            available: capacity,
        });
    }

    Ok(format!("{call} {payment}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_phone_num_stops_at_marker() {
        assert_eq!(phone_num_to_string(&[0x40, 0x8E, 0x12], 16), "408");
        assert_eq!(phone_num_to_string(&[0xE1, 0x23], 16), "");
    }

    #[test]
    fn test_phone_num_capacity_reserves_terminator() {
        assert_eq!(phone_num_to_string(&[0x12, 0x34, 0x56], 4), "123");
        assert_eq!(phone_num_to_string(&[0x12, 0x34], 0), "");
        assert_eq!(phone_num_to_string(&[0x12, 0x34], 1), "");
    }

    #[test]
    fn test_phone_num_does_not_special_case_a() {
        // 0xA is only meaningful to the zero-sentinel encoder
        assert_eq!(phone_num_to_string(&[0x1A, 0xBE], 16), "1:;");
    }

    #[test]
    fn test_bcd_a_zero_sentinel() {
        let mut out = [0xFFu8; 1];
        assert_eq!(string_to_bcd_a("0", &mut out), 1);
        assert_eq!(out, [0xA0]);

        assert_eq!(string_to_bcd_a("12", &mut out), 2);
        assert_eq!(out, [0x12]);

        assert_eq!(string_to_bcd_a("10", &mut out), 2);
        assert_eq!(out, [0x1A]);
    }

    #[test]
    fn test_bcd_a_truncates_to_buffer() {
        let mut out = [0u8; 2];
        assert_eq!(string_to_bcd_a("4085551212", &mut out), 4);
        assert_eq!(out, [0x4A, 0x85]);
    }

    #[test]
    fn test_bcd_a_zero_fills() {
        let mut out = [0xFFu8; 3];
        assert_eq!(string_to_bcd_a("123", &mut out), 3);
        assert_eq!(out, [0x12, 0x30, 0x00]);
    }

    #[test]
    fn test_callscrn_lut() {
        assert_eq!(CALLSCRN_DIGITS.len(), 16);
        assert_eq!(callscrn_num_to_string(&[0xA0], 3), "0\0");
        assert_eq!(callscrn_num_to_string(&[0xEB], 3), "EB");
        assert_eq!(callscrn_num_to_string(&[0x18, 0x00], 16), "18\0\0");
    }

    #[test]
    fn test_call_type() {
        assert_eq!(call_type_to_string(0x43, 32).unwrap(), "Local Credit Card");
        assert_eq!(call_type_to_string(0x43, 17).unwrap(), "Local Credit Card");
        assert!(matches!(
            call_type_to_string(0x43, 16),
            Err(TableError::BufferTooSmall { needed: 17, available: 16 })
        ));
        assert_eq!(call_type_to_string(0x30, 64).unwrap(), "Incoming Coin");
    }

    proptest! {
        #[test]
        fn prop_callscrn_total(num in proptest::collection::vec(any::<u8>(), 0..16)) {
            let decoded = callscrn_num_to_string(&num, usize::MAX);
            prop_assert_eq!(decoded.chars().count(), num.len() * 2);
        }

        #[test]
        fn prop_call_type_total(byte in any::<u8>()) {
            prop_assert!(call_type_to_string(byte, 64).is_ok());
        }
    }
}
