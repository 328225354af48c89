//! # Card Tables (CARD / CARD_EXP)
//!
//! Credit card PAN ranges and validation rules. MTR 1.x terminals use the CARD
//! table (0x16) with 20 entries of 33 bytes; MTR 2.x terminals use the
//! expanded CARD_EXP table (0x86) with 32 entries of 36 bytes that append
//! `control_info`, `bank_info` and `lang_code` to each entry.
//!
//! Field offsets come from [`crate::table::layout`], the same tables that drive
//! the revision converter.

use crate::codec::flags::decode_flags;
use crate::constants::*;
use crate::error::Result;
use crate::table::catalog::{self, Revision};
use crate::table::convert::convert_entries;
use crate::table::layout::{card_layout, EntryLayout};
use crate::table::DlogTable;
use bitflags::bitflags;
use log::debug;
use serde::Serialize;
use std::fmt;

/// Standard card type names indexed by `standard_cd & 0x0f`.
pub const STANDARD_CARD_LABELS: [&str; 16] = [
    "Undefd", "MOD 10", "ANSI  ", "ABA   ", "CBA   ", "BOC   ", "ANSI59", "CCITT ",
    "PINOFF", "HELLO ", "SMCARD", "Resv'd", "SCGPM4", "SCPCOS", "SCMPCO", "PROTON",
];

/// Verification flag names, bit 0 first.
pub const VERIFY_FLAG_LABELS: [&str; 8] = [
    "MOD10 IND ",
    "NCCVAL IND",
    "CALLING CD",
    "IMMED AUTH",
    "SVC CD VAL",
    "PROMPT PIN",
    "TELCO PIN ",
    "ACCS ROUTE",
];

bitflags! {
    /// Card verification flags (`vfy_flags`)
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct VerifyFlags: u8 {
        /// Mod 10 check when adding a card number to the hotlist
        const MOD10_IND                 = 1 << 0;
        /// Host must validate before the terminal permits the call
        const NCCVAL_IND                = 1 << 1;
        /// Set when the card is NOT a calling card
        const CALLING_CARD_IND          = 1 << 2;
        /// Authorize immediately after card withdrawal
        const IMMEDIATE_AUTH_IND        = 1 << 3;
        /// Positive service code validation
        const SERVICE_CD_VALIDATION_IND = 1 << 4;
        const PROMPT_FOR_PIN            = 1 << 5;
        const PROMPT_FOR_TELCO_PIN      = 1 << 6;
        /// Route to ACCS instead of the management host
        const ACCS_ROUTING              = 1 << 7;
    }
}

/// Standard card type (`standard_cd`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[repr(u8)]
pub enum StandardCard {
    Undefined = 0,
    Mod10,
    Ansi,
    Aba,
    Cba,
    Boc,
    Ansi59,
    Ccitt,
    PinOff,
    Hello,
    SmartCard,
    Reserved,
    ScGpm416,
    ScPcos,
    ScMpcos,
    Proton,
}

impl StandardCard {
    pub fn from_code(code: u8) -> Self {
        match code & 0x0f {
            0 => Self::Undefined,
            1 => Self::Mod10,
            2 => Self::Ansi,
            3 => Self::Aba,
            4 => Self::Cba,
            5 => Self::Boc,
            6 => Self::Ansi59,
            7 => Self::Ccitt,
            8 => Self::PinOff,
            9 => Self::Hello,
            10 => Self::SmartCard,
            11 => Self::Reserved,
            12 => Self::ScGpm416,
            13 => Self::ScPcos,
            14 => Self::ScMpcos,
            _ => Self::Proton,
        }
    }

    pub fn label(self) -> &'static str {
        STANDARD_CARD_LABELS[self as usize]
    }
}

/// Interpretation of the 20-byte service code area, selected by card type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum ServiceCode {
    /// Magstripe credit cards
    CreditCard {
        svc_code: [u16; SVC_CODE_MAX],
        spill_string: [u8; SPILL_STRING_LEN],
        term_char: u8,
        discount_index: u8,
    },
    /// Smart cards
    SmartCard {
        check_digits: [u8; SC_CHECK_DIGIT_LEN],
        check_value: [u8; SC_CHECK_VALUE_LEN],
        manufacturer: [u8; SC_MANUF_LEN],
        discount_index: u8,
    },
    Raw([u8; SERVICE_CODE_LEN]),
}

impl ServiceCode {
    pub fn parse(standard: StandardCard, raw: &[u8; SERVICE_CODE_LEN]) -> Self {
        match standard {
            StandardCard::Ansi
            | StandardCard::Aba
            | StandardCard::Cba
            | StandardCard::Boc
            | StandardCard::Ansi59
            | StandardCard::Ccitt => {
                let mut svc_code = [0u16; SVC_CODE_MAX];
                for (code, pair) in svc_code.iter_mut().zip(raw.chunks_exact(2)) {
                    *code = u16::from_le_bytes([pair[0], pair[1]]);
                }
                let spill_at = SVC_CODE_MAX * 2;
                let mut spill_string = [0u8; SPILL_STRING_LEN];
                spill_string.copy_from_slice(&raw[spill_at..spill_at + SPILL_STRING_LEN]);

                ServiceCode::CreditCard {
                    svc_code,
                    spill_string,
                    term_char: raw[spill_at + SPILL_STRING_LEN],
                    discount_index: raw[spill_at + SPILL_STRING_LEN + 1],
                }
            }
            StandardCard::SmartCard => {
                let mut check_digits = [0u8; SC_CHECK_DIGIT_LEN];
                let mut check_value = [0u8; SC_CHECK_VALUE_LEN];
                let mut manufacturer = [0u8; SC_MANUF_LEN];
                let (digits, rest) = raw.split_at(SC_CHECK_DIGIT_LEN);
                let (value, rest) = rest.split_at(SC_CHECK_VALUE_LEN);
                let (manuf, rest) = rest.split_at(SC_MANUF_LEN);
                check_digits.copy_from_slice(digits);
                check_value.copy_from_slice(value);
                manufacturer.copy_from_slice(manuf);

                ServiceCode::SmartCard {
                    check_digits,
                    check_value,
                    manufacturer,
                    discount_index: rest[0],
                }
            }
            _ => ServiceCode::Raw(*raw),
        }
    }
}

/// One card table entry. Fields beyond the MTR 1.x layout are zero for
/// MTR 1.x tables and are not encoded there.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CardEntry {
    pub pan_start: [u8; PAN_LEN],
    pub pan_end: [u8; PAN_LEN],
    pub standard_cd: u8,
    pub vfy_flags: u8,
    pub p_exp_date: u8,
    pub p_init_date: u8,
    pub p_disc_data: u8,
    pub svc_code: [u8; SERVICE_CODE_LEN],
    pub ref_num: u8,
    /// Cross reference into the carrier table
    pub carrier_ref: u8,
    pub control_info: u8,
    pub bank_info: u8,
    pub lang_code: u8,
}

fn field_bytes<'a>(entry: &'a [u8], layout: &EntryLayout, name: &str) -> &'a [u8] {
    match layout.field(name) {
        Some(f) => &entry[f.range()],
        None => &[],
    }
}

impl CardEntry {
    fn read(entry: &[u8], layout: &EntryLayout) -> Self {
        let field = |name: &str| field_bytes(entry, layout, name);
        let byte = |name: &str| field_bytes(entry, layout, name).first().copied().unwrap_or(0);

        let mut card = CardEntry {
            standard_cd: byte("standard_cd"),
            vfy_flags: byte("vfy_flags"),
            p_exp_date: byte("p_exp_date"),
            p_init_date: byte("p_init_date"),
            p_disc_data: byte("p_disc_data"),
            ref_num: byte("ref_num"),
            carrier_ref: byte("carrier_ref"),
            control_info: byte("control_info"),
            bank_info: byte("bank_info"),
            lang_code: byte("lang_code"),
            ..Default::default()
        };
        card.pan_start.copy_from_slice(field("pan_start"));
        card.pan_end.copy_from_slice(field("pan_end"));
        card.svc_code.copy_from_slice(field("svc_code"));
        card
    }

    fn write(&self, entry: &mut [u8], layout: &EntryLayout) {
        for field in layout.fields {
            let value: &[u8] = match field.name {
                "pan_start" => &self.pan_start,
                "pan_end" => &self.pan_end,
                "standard_cd" => std::slice::from_ref(&self.standard_cd),
                "vfy_flags" => std::slice::from_ref(&self.vfy_flags),
                "p_exp_date" => std::slice::from_ref(&self.p_exp_date),
                "p_init_date" => std::slice::from_ref(&self.p_init_date),
                "p_disc_data" => std::slice::from_ref(&self.p_disc_data),
                "svc_code" => &self.svc_code,
                "ref_num" => std::slice::from_ref(&self.ref_num),
                "carrier_ref" => std::slice::from_ref(&self.carrier_ref),
                "control_info" => std::slice::from_ref(&self.control_info),
                "bank_info" => std::slice::from_ref(&self.bank_info),
                "lang_code" => std::slice::from_ref(&self.lang_code),
                _ => &[],
            };
            let dst = &mut entry[field.range()];
            dst.fill(field.default);
            let n = value.len().min(dst.len());
            dst[..n].copy_from_slice(&value[..n]);
        }
    }

    /// Entries with no card type are empty slots.
    pub fn is_unused(&self) -> bool {
        self.standard_cd == 0
    }

    pub fn standard(&self) -> StandardCard {
        StandardCard::from_code(self.standard_cd)
    }

    pub fn verify_flags(&self) -> VerifyFlags {
        VerifyFlags::from_bits_retain(self.vfy_flags)
    }

    /// Verification flag names with the inverted calling-card bit normalised,
    /// so "CALLING CD" is listed when the card IS a calling card.
    pub fn verify_flag_labels(&self) -> Vec<&'static str> {
        decode_flags(
            self.vfy_flags ^ VerifyFlags::CALLING_CARD_IND.bits(),
            &VERIFY_FLAG_LABELS,
        )
    }

    /// The service code view follows the whole `standard_cd` byte. Codes with
    /// high bits set keep their label but show the raw bytes.
    pub fn service_code(&self) -> ServiceCode {
        if self.standard_cd > 0x0f {
            return ServiceCode::Raw(self.svc_code);
        }
        ServiceCode::parse(self.standard(), &self.svc_code)
    }

    /// PAN range as `"start - end"` in hex.
    pub fn pan_range(&self) -> String {
        format!(
            "{} - {}",
            hex::encode(self.pan_start),
            hex::encode(self.pan_end)
        )
    }
}

/// Decoded card table in one firmware revision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CardTable {
    pub revision: Revision,
    pub entries: Vec<CardEntry>,
}

impl CardTable {
    /// Empty table for `revision`.
    pub fn new(revision: Revision) -> Self {
        Self {
            revision,
            entries: vec![CardEntry::default(); card_layout(revision).entry_count],
        }
    }

    pub fn layout(&self) -> &'static EntryLayout {
        card_layout(self.revision)
    }

    /// Configured entries with their slot index.
    pub fn active_entries(&self) -> impl Iterator<Item = (usize, &CardEntry)> {
        self.entries
            .iter()
            .enumerate()
            .filter(|(_, entry)| !entry.is_unused())
    }

    /// Point entry `index` at a carrier. Out of range indices are ignored.
    pub fn set_carrier_ref(&mut self, index: usize, carrier_ref: u8) {
        if let Some(entry) = self.entries.get_mut(index) {
            entry.carrier_ref = carrier_ref;
        }
    }

    /// Clear `flags` on every entry, e.g. to route all cards to the host
    /// instead of ACCS.
    pub fn clear_verify_flags(&mut self, flags: VerifyFlags) {
        for entry in &mut self.entries {
            entry.vfy_flags &= !flags.bits();
        }
    }

    pub fn set_verify_flags(&mut self, flags: VerifyFlags) {
        for entry in &mut self.entries {
            entry.vfy_flags |= flags.bits();
        }
    }

    /// Re-map into another revision's layout; see [`crate::table::convert`].
    pub fn convert(&self, revision: Revision) -> CardTable {
        let target = card_layout(revision);
        let bytes = convert_entries(&self.encode(), self.layout(), target);
        Self::from_layout(&bytes, target)
    }

    fn from_layout(payload: &[u8], layout: &EntryLayout) -> Self {
        let entries = payload
            .chunks_exact(layout.entry_len())
            .take(layout.entry_count)
            .map(|chunk| CardEntry::read(chunk, layout))
            .collect();

        CardTable {
            revision: layout.revision,
            entries,
        }
    }
}

impl DlogTable for CardTable {
    fn decode(payload: &[u8], revision: Revision) -> Result<Self> {
        let layout = card_layout(revision);
        catalog::validate(layout.table_id, revision, payload.len())?;

        let table = Self::from_layout(payload, layout);
        debug!(
            "Decoded {} card table: {} of {} entries in use",
            revision,
            table.active_entries().count(),
            layout.entry_count
        );
        Ok(table)
    }

    fn encode(&self) -> Vec<u8> {
        let layout = self.layout();
        let mut out = vec![0u8; layout.table_len()];
        for (chunk, entry) in out
            .chunks_exact_mut(layout.entry_len())
            .zip(&self.entries)
        {
            entry.write(chunk, layout);
        }
        out
    }

    fn table_id(&self) -> u8 {
        self.layout().table_id
    }
}

impl fmt::Display for CardTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "+------+-----------------+--------+-----+---------+-----+---------------+")?;
        writeln!(f, "| Idx  | PAN St - End    | STD CD | Vfy | Carrier | Ref | P exp ini dis |")?;
        writeln!(f, "+------+-----------------+--------+-----+---------+-----+---------------+")?;

        for (i, c) in self.active_entries() {
            writeln!(
                f,
                "|  {:2}  | {} | {} | x{:02x} |   0x{:02x}  | x{:02x} | P x{:02x} x{:02x} x{:02x} | {}",
                i,
                c.pan_range(),
                c.standard().label(),
                c.vfy_flags,
                c.carrier_ref,
                c.ref_num,
                c.p_exp_date,
                c.p_init_date,
                c.p_disc_data,
                c.verify_flag_labels().join(" | "),
            )?;

            match c.service_code() {
                ServiceCode::CreditCard {
                    svc_code,
                    spill_string,
                    term_char,
                    discount_index,
                } => {
                    let codes: Vec<String> = svc_code.iter().map(|c| format!("{c:04x}")).collect();
                    writeln!(
                        f,
                        "|      | Service Codes: {} Spill: {} TC:{:02x} DI:{:02x}",
                        codes.join(","),
                        hex::encode(spill_string),
                        term_char,
                        discount_index
                    )?;
                }
                ServiceCode::SmartCard {
                    check_digits,
                    check_value,
                    manufacturer,
                    discount_index,
                } => {
                    writeln!(
                        f,
                        "|      | Ck Digits: {} Ck Value: {} Manufacturer: {} Discount Index: {:02x}",
                        hex::encode(check_digits),
                        hex::encode(check_value),
                        hex::encode(manufacturer),
                        discount_index
                    )?;
                }
                ServiceCode::Raw(raw) => {
                    writeln!(f, "|      | Service Codes: {}", hex::encode(raw))?;
                }
            }

            if self.revision == Revision::Mtr2 {
                writeln!(
                    f,
                    "|      | Control: x{:02x} Bank: x{:02x} Lang: x{:02x}",
                    c.control_info, c.bank_info, c.lang_code
                )?;
            }
            writeln!(f, "+------+-----------------+--------+-----+---------+-----+---------------+")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TableError;

    fn visa_entry() -> CardEntry {
        let mut svc_code = [0u8; SERVICE_CODE_LEN];
        svc_code[..4].copy_from_slice(&[0x01, 0x02, 0x03, 0x04]);
        svc_code[10] = b'S';
        svc_code[18] = 0x3f;
        svc_code[19] = 0x07;

        CardEntry {
            pan_start: [0x40, 0x00, 0x00],
            pan_end: [0x49, 0x99, 0x99],
            standard_cd: StandardCard::Aba as u8,
            vfy_flags: (VerifyFlags::MOD10_IND | VerifyFlags::ACCS_ROUTING).bits(),
            svc_code,
            ref_num: 0x11,
            carrier_ref: 0x02,
            control_info: 0x80,
            bank_info: 0x01,
            lang_code: 0x02,
            ..Default::default()
        }
    }

    #[test]
    fn test_entry_offsets() {
        let mut table = CardTable::new(Revision::Mtr2);
        table.entries[1] = visa_entry();
        let bytes = table.encode();
        assert_eq!(bytes.len(), CARD_TABLE_LEN);

        let e = &bytes[CARD_ENTRY_LEN..2 * CARD_ENTRY_LEN];
        assert_eq!(&e[0..3], &[0x40, 0x00, 0x00]);
        assert_eq!(&e[3..6], &[0x49, 0x99, 0x99]);
        assert_eq!(e[6], 3);
        assert_eq!(e[7], 0x81);
        assert_eq!(e[11], 0x01);
        assert_eq!(e[31], 0x11);
        assert_eq!(e[32], 0x02);
        assert_eq!(&e[33..36], &[0x80, 0x01, 0x02]);

        let decoded = CardTable::decode(&bytes, Revision::Mtr2).unwrap();
        assert_eq!(decoded, table);
    }

    #[test]
    fn test_mtr1_drops_extended_fields() {
        let mut table = CardTable::new(Revision::Mtr1);
        table.entries[0] = visa_entry();
        let decoded = CardTable::decode(&table.encode(), Revision::Mtr1).unwrap();
        assert_eq!(decoded.entries[0].carrier_ref, 0x02);
        assert_eq!(decoded.entries[0].control_info, 0);
        assert_eq!(decoded.entries[0].lang_code, 0);
    }

    #[test]
    fn test_service_code_views() {
        let entry = visa_entry();
        match entry.service_code() {
            ServiceCode::CreditCard {
                svc_code,
                spill_string,
                term_char,
                discount_index,
            } => {
                assert_eq!(svc_code[0], 0x0201);
                assert_eq!(svc_code[1], 0x0403);
                assert_eq!(spill_string[0], b'S');
                assert_eq!(term_char, 0x3f);
                assert_eq!(discount_index, 0x07);
            }
            other => panic!("unexpected {other:?}"),
        }

        let smart = CardEntry {
            standard_cd: StandardCard::SmartCard as u8,
            svc_code: [0x5a; SERVICE_CODE_LEN],
            ..Default::default()
        };
        assert!(matches!(
            smart.service_code(),
            ServiceCode::SmartCard { discount_index: 0x5a, .. }
        ));

        let mod10 = CardEntry {
            standard_cd: StandardCard::Mod10 as u8,
            ..Default::default()
        };
        assert!(matches!(mod10.service_code(), ServiceCode::Raw(_)));

        let flagged = CardEntry {
            standard_cd: 0x12,
            ..entry
        };
        assert_eq!(flagged.standard(), StandardCard::Ansi);
        assert_eq!(flagged.service_code(), ServiceCode::Raw(flagged.svc_code));
    }

    #[test]
    fn test_calling_card_bit_inverted_for_display() {
        let entry = CardEntry {
            vfy_flags: 0,
            ..Default::default()
        };
        assert_eq!(entry.verify_flag_labels(), vec!["CALLING CD"]);

        let not_calling = CardEntry {
            vfy_flags: VerifyFlags::CALLING_CARD_IND.bits(),
            ..Default::default()
        };
        assert!(not_calling.verify_flag_labels().is_empty());
    }

    #[test]
    fn test_route_to_host() {
        let mut table = CardTable::new(Revision::Mtr1);
        table.entries[0] = visa_entry();
        table.clear_verify_flags(VerifyFlags::ACCS_ROUTING);
        assert_eq!(table.entries[0].verify_flags(), VerifyFlags::MOD10_IND);

        table.set_carrier_ref(0, 0x09);
        table.set_carrier_ref(99, 0x09);
        assert_eq!(table.entries[0].carrier_ref, 0x09);
    }

    #[test]
    fn test_convert_typed() {
        let mut table = CardTable::new(Revision::Mtr2);
        table.entries[0] = visa_entry();
        table.entries[25] = visa_entry();

        let mtr1 = table.convert(Revision::Mtr1);
        assert_eq!(mtr1.revision, Revision::Mtr1);
        assert_eq!(mtr1.entries.len(), CCARD_MAX_MTR1);
        assert_eq!(mtr1.active_entries().count(), 1);
        assert_eq!(mtr1.entries[0].pan_end, [0x49, 0x99, 0x99]);
        assert_eq!(mtr1.entries[0].lang_code, 0);
        assert_eq!(mtr1.table_id(), DLOG_MT_CARD_TABLE);
    }

    #[test]
    fn test_wrong_revision_size() {
        let bytes = CardTable::new(Revision::Mtr1).encode();
        assert!(matches!(
            CardTable::decode(&bytes, Revision::Mtr2),
            Err(TableError::SizeMismatch { expected: 1152, actual: 660, .. })
        ));
    }

    #[test]
    fn test_standard_labels() {
        assert_eq!(StandardCard::from_code(0x1a).label(), "SMCARD");
        assert_eq!(StandardCard::Proton.label(), "PROTON");
    }
}
