//! Bit-flag rendering against ordered label tables.

/// Return the labels whose bit is set in `bits`, bit 0 first.
///
/// Bits without a corresponding label are ignored.
pub fn decode_flags(bits: u8, labels: &[&'static str]) -> Vec<&'static str> {
    labels
        .iter()
        .take(8)
        .enumerate()
        .filter(|(i, _)| bits & (1u8 << *i) != 0)
        .map(|(_, label)| *label)
        .collect()
}

/// Render set flags joined with `" | "`, as shown in table reports.
pub fn format_flags(bits: u8, labels: &[&'static str]) -> String {
    decode_flags(bits, labels).join(" | ")
}
