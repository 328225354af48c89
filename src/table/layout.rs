//! # Entry Layouts
//!
//! Declarative field tables for the per-revision record entries. Each field is
//! `(name, offset, len, default)`; the revision converter maps target fields
//! from same-named source fields, and the card decoder reads fields through
//! the same tables so offsets are written down exactly once.

use crate::constants::*;
use crate::table::catalog::Revision;
use std::ops::Range;

/// One fixed-width field inside an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpan {
    pub name: &'static str,
    pub offset: usize,
    pub len: usize,
    /// Fill byte when the field has no source during conversion
    pub default: u8,
}

impl FieldSpan {
    const fn new(name: &'static str, offset: usize, len: usize) -> Self {
        Self {
            name,
            offset,
            len,
            default: 0,
        }
    }

    pub fn range(&self) -> Range<usize> {
        self.offset..self.offset + self.len
    }
}

/// Layout of a table made of `entry_count` identical entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntryLayout {
    pub table_id: u8,
    pub revision: Revision,
    pub entry_count: usize,
    pub fields: &'static [FieldSpan],
}

impl EntryLayout {
    /// Size of one entry; fields are contiguous and ordered.
    pub fn entry_len(&self) -> usize {
        self.fields
            .iter()
            .map(|f| f.offset + f.len)
            .max()
            .unwrap_or(0)
    }

    pub fn table_len(&self) -> usize {
        self.entry_len() * self.entry_count
    }

    pub fn field(&self, name: &str) -> Option<&'static FieldSpan> {
        self.fields.iter().find(|f| f.name == name)
    }
}

static CARD_FIELDS_MTR1: [FieldSpan; 10] = [
    FieldSpan::new("pan_start", 0, PAN_LEN),
    FieldSpan::new("pan_end", 3, PAN_LEN),
    FieldSpan::new("standard_cd", 6, 1),
    FieldSpan::new("vfy_flags", 7, 1),
    FieldSpan::new("p_exp_date", 8, 1),
    FieldSpan::new("p_init_date", 9, 1),
    FieldSpan::new("p_disc_data", 10, 1),
    FieldSpan::new("svc_code", 11, SERVICE_CODE_LEN),
    FieldSpan::new("ref_num", 31, 1),
    FieldSpan::new("carrier_ref", 32, 1),
];

static CARD_FIELDS_MTR2: [FieldSpan; 13] = [
    FieldSpan::new("pan_start", 0, PAN_LEN),
    FieldSpan::new("pan_end", 3, PAN_LEN),
    FieldSpan::new("standard_cd", 6, 1),
    FieldSpan::new("vfy_flags", 7, 1),
    FieldSpan::new("p_exp_date", 8, 1),
    FieldSpan::new("p_init_date", 9, 1),
    FieldSpan::new("p_disc_data", 10, 1),
    FieldSpan::new("svc_code", 11, SERVICE_CODE_LEN),
    FieldSpan::new("ref_num", 31, 1),
    FieldSpan::new("carrier_ref", 32, 1),
    FieldSpan::new("control_info", 33, 1),
    FieldSpan::new("bank_info", 34, 1),
    FieldSpan::new("lang_code", 35, 1),
];

/// CARD, MTR 1.x: 20 entries of 33 bytes.
pub static CARD_LAYOUT_MTR1: EntryLayout = EntryLayout {
    table_id: DLOG_MT_CARD_TABLE,
    revision: Revision::Mtr1,
    entry_count: CCARD_MAX_MTR1,
    fields: &CARD_FIELDS_MTR1,
};

/// CARD_EXP, MTR 2.x: 32 entries of 36 bytes.
pub static CARD_LAYOUT_MTR2: EntryLayout = EntryLayout {
    table_id: DLOG_MT_CARD_TABLE_EXP,
    revision: Revision::Mtr2,
    entry_count: CCARD_MAX,
    fields: &CARD_FIELDS_MTR2,
};

/// Card table layout for a revision.
pub fn card_layout(revision: Revision) -> &'static EntryLayout {
    match revision {
        Revision::Mtr1 => &CARD_LAYOUT_MTR1,
        Revision::Mtr2 => &CARD_LAYOUT_MTR2,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_card_layouts_match_constants() {
        assert_eq!(CARD_LAYOUT_MTR1.entry_len(), CARD_ENTRY_LEN_MTR1);
        assert_eq!(CARD_LAYOUT_MTR2.entry_len(), CARD_ENTRY_LEN);
        assert_eq!(CARD_LAYOUT_MTR1.table_len(), CARD_TABLE_LEN_MTR1);
        assert_eq!(CARD_LAYOUT_MTR2.table_len(), CARD_TABLE_LEN);
    }

    #[test]
    fn test_fields_are_contiguous() {
        for layout in [&CARD_LAYOUT_MTR1, &CARD_LAYOUT_MTR2] {
            let mut next = 0;
            for field in layout.fields {
                assert_eq!(field.offset, next, "{} in {:?}", field.name, layout.revision);
                next += field.len;
            }
        }
    }

    #[test]
    fn test_mtr1_lacks_extended_fields() {
        assert!(CARD_LAYOUT_MTR1.field("control_info").is_none());
        assert!(CARD_LAYOUT_MTR1.field("lang_code").is_none());
        assert_eq!(CARD_LAYOUT_MTR2.field("lang_code").unwrap().range(), 35..36);
    }
}
