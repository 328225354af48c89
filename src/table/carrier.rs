//! # Expanded Carrier Table (CARRIER_EXP)
//!
//! The carrier table configures up to 33 call-routing carriers. The in-memory
//! record starts with the table identifier as a tag byte which is not part of
//! the payload exchanged with the terminal:
//!
//! ```text
//! tag:u8 | defaults:[u8; 9] | carrier:[CarrierEntry; 33] | spare:[u8; 4]
//! ```
//!
//! Each entry is 33 bytes:
//!
//! ```text
//! carrier_ref:u8 carrier_num:u16le valid_cards:u32le display_prompt:[u8; 20]
//! control_byte2:u8 control_byte:u8 fgb_timer:u16le international_accept_flags:u8
//! call_entry:u8
//! ```
//!
//! The spare region is carried through decode/encode untouched.

use crate::codec::flags::decode_flags;
use crate::constants::*;
use crate::error::{Result, TableError};
use crate::table::catalog::{self, Revision};
use crate::table::DlogTable;
use bitflags::bitflags;
use bytes::{BufMut, BytesMut};
use log::debug;
use nom::{
    bytes::complete::take,
    multi::count,
    number::complete::{le_u16, le_u32, le_u8},
    IResult,
};
use serde::Serialize;
use std::fmt;

/// Default carrier selector names, in table order.
pub const DEFAULT_CARRIER_LABELS: [&str; DEFAULT_CARRIERS_MAX] = [
    "PIC Inter-LATA carrier",
    "Coin Inter-LATA carrier",
    "Creditcard Inter-LATA carrier",
    "PIC Intra-LATA carrier",
    "Coin Intra-LATA carrier",
    "Creditcard Intra-LATA carrier",
    "PIC Local carrier",
    "Coin Local carrier",
    "Creditcard Local carrier",
];

/// Control byte bit names, bit 0 first.
pub const CONTROL_BYTE_LABELS: [&str; 8] = [
    "CARCD101XXXX",
    "SPEC_PROMPT",
    "COIN_CASH_CD",
    "ALT_BONG_TMO",
    "DLY_AFT_BONG",
    "INTRA_TO_LEC",
    "OUTDIAL_STR",
    "FEAT_GROUP_B",
];

/// Control byte 2 bit names, bit 0 first.
pub const CONTROL_BYTE2_LABELS: [&str; 8] = [
    "FGB_PROMPT",
    "RM_PFX_LCL",
    "RM_PFX_INTRA",
    "RM_PFX_INTER",
    "RM_PFX_INT'L",
    "RM_PFX_DA",
    "RM_PFX_1800",
    "CB2_SPARE",
];

bitflags! {
    /// Carrier control byte
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct ControlByte: u8 {
        const CARD_101XXXX             = 1 << 0;
        const USE_SPEC_DISPLAY_PROMPT  = 1 << 1;
        const ACCEPTS_COIN_CASH_CARDS  = 1 << 2;
        const ALT_BONG_TIMEOUT         = 1 << 3;
        const DELAY_AFTER_BONG         = 1 << 4;
        const INTRALATA_TO_LEC         = 1 << 5;
        const OUTDIAL_STRING           = 1 << 6;
        const FEATURE_GROUP_B          = 1 << 7;
    }
}

bitflags! {
    /// Carrier control byte 2
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct ControlByte2: u8 {
        const FGB_PROMPT                   = 1 << 0;
        const REM_CARRIER_PREFIX_LOCAL     = 1 << 1;
        const REM_CARRIER_PREFIX_INTRALATA = 1 << 2;
        const REM_CARRIER_PREFIX_INTERLATA = 1 << 3;
        const REM_CARRIER_PREFIX_INTL      = 1 << 4;
        const REM_CARRIER_PREFIX_DA        = 1 << 5;
        const REM_CARRIER_PREFIX_1800      = 1 << 6;
        const SPARE                        = 1 << 7;
    }
}

impl ControlByte2 {
    /// Strip the carrier prefix for every call category.
    pub const REM_CARRIER_PREFIX_ALL: Self = Self::from_bits_retain(
        Self::REM_CARRIER_PREFIX_LOCAL.bits()
            | Self::REM_CARRIER_PREFIX_INTRALATA.bits()
            | Self::REM_CARRIER_PREFIX_INTERLATA.bits()
            | Self::REM_CARRIER_PREFIX_INTL.bits()
            | Self::REM_CARRIER_PREFIX_DA.bits()
            | Self::REM_CARRIER_PREFIX_1800.bits(),
    );
}

/// One carrier definition.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CarrierEntry {
    pub carrier_ref: u8,
    pub carrier_num: u16,
    pub valid_cards: u32,
    pub display_prompt: [u8; DISPLAY_PROMPT_LEN],
    pub control_byte2: u8,
    pub control_byte: u8,
    pub fgb_timer: u16,
    pub international_accept_flags: u8,
    pub call_entry: u8,
}

impl CarrierEntry {
    /// Entry as provisioned by the standard template.
    pub fn standard(carrier_ref: u8, prompt: &str) -> Self {
        let mut entry = Self {
            carrier_ref,
            valid_cards: 0x0000_3fff,
            control_byte2: ControlByte2::REM_CARRIER_PREFIX_ALL.bits(),
            control_byte: (ControlByte::USE_SPEC_DISPLAY_PROMPT
                | ControlByte::ACCEPTS_COIN_CASH_CARDS)
                .bits(),
            fgb_timer: 500,
            ..Self::default()
        };
        entry.set_display_prompt(prompt);
        entry
    }

    /// A slot that was never configured: no reference, no call entry and a
    /// non-printable prompt. Such slots are skipped in reports.
    pub fn is_unused(&self) -> bool {
        self.display_prompt[0] < 0x20 && self.carrier_ref == 0 && self.call_entry == 0
    }

    /// Prompt text as shown on the terminal, or blanks when the prompt is not
    /// printable.
    pub fn display_prompt_string(&self) -> String {
        if self.display_prompt[0] >= 0x20 {
            self.display_prompt.iter().map(|&b| b as char).collect()
        } else {
            " ".repeat(DISPLAY_PROMPT_LEN)
        }
    }

    /// Store `prompt` space padded, truncated to the field width.
    pub fn set_display_prompt(&mut self, prompt: &str) {
        self.display_prompt = [b' '; DISPLAY_PROMPT_LEN];
        for (dst, src) in self.display_prompt.iter_mut().zip(prompt.bytes()) {
            *dst = src;
        }
    }

    pub fn control(&self) -> ControlByte {
        ControlByte::from_bits_retain(self.control_byte)
    }

    pub fn control2(&self) -> ControlByte2 {
        ControlByte2::from_bits_retain(self.control_byte2)
    }

    /// Names of the set control byte 2 bits followed by the control byte bits.
    pub fn flag_labels(&self) -> Vec<&'static str> {
        let mut labels = decode_flags(self.control_byte2, &CONTROL_BYTE2_LABELS);
        labels.extend(decode_flags(self.control_byte, &CONTROL_BYTE_LABELS));
        labels
    }

    fn write(&self, buf: &mut BytesMut) {
        buf.put_u8(self.carrier_ref);
        buf.put_u16_le(self.carrier_num);
        buf.put_u32_le(self.valid_cards);
        buf.put_slice(&self.display_prompt);
        buf.put_u8(self.control_byte2);
        buf.put_u8(self.control_byte);
        buf.put_u16_le(self.fgb_timer);
        buf.put_u8(self.international_accept_flags);
        buf.put_u8(self.call_entry);
    }
}

fn parse_carrier_entry(input: &[u8]) -> IResult<&[u8], CarrierEntry> {
    let (input, carrier_ref) = le_u8(input)?;
    let (input, carrier_num) = le_u16(input)?;
    let (input, valid_cards) = le_u32(input)?;
    let (input, prompt) = take(DISPLAY_PROMPT_LEN)(input)?;
    let (input, control_byte2) = le_u8(input)?;
    let (input, control_byte) = le_u8(input)?;
    let (input, fgb_timer) = le_u16(input)?;
    let (input, international_accept_flags) = le_u8(input)?;
    let (input, call_entry) = le_u8(input)?;

    let mut display_prompt = [0u8; DISPLAY_PROMPT_LEN];
    display_prompt.copy_from_slice(prompt);

    Ok((
        input,
        CarrierEntry {
            carrier_ref,
            carrier_num,
            valid_cards,
            display_prompt,
            control_byte2,
            control_byte,
            fgb_timer,
            international_accept_flags,
            call_entry,
        },
    ))
}

fn parse_carrier_table(input: &[u8]) -> IResult<&[u8], CarrierTable> {
    let (input, defaults) = take(DEFAULT_CARRIERS_MAX)(input)?;
    let (input, carriers) = count(parse_carrier_entry, CARRIER_TABLE_MAX_CARRIERS)(input)?;
    let (input, spare) = take(CARRIER_TABLE_SPARE_LEN)(input)?;

    let mut table = CarrierTable {
        carriers,
        ..Default::default()
    };
    table.defaults.copy_from_slice(defaults);
    table.spare.copy_from_slice(spare);

    Ok((input, table))
}

/// Decoded carrier table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CarrierTable {
    pub defaults: [u8; DEFAULT_CARRIERS_MAX],
    pub carriers: Vec<CarrierEntry>,
    pub spare: [u8; CARRIER_TABLE_SPARE_LEN],
}

impl Default for CarrierTable {
    fn default() -> Self {
        Self {
            defaults: [0; DEFAULT_CARRIERS_MAX],
            carriers: vec![CarrierEntry::default(); CARRIER_TABLE_MAX_CARRIERS],
            spare: [0; CARRIER_TABLE_SPARE_LEN],
        }
    }
}

impl CarrierTable {
    /// Configured entries with their slot index.
    pub fn active_entries(&self) -> impl Iterator<Item = (usize, &CarrierEntry)> {
        self.carriers
            .iter()
            .enumerate()
            .filter(|(_, entry)| !entry.is_unused())
    }

    pub fn replace_entry(&mut self, index: usize, entry: CarrierEntry) -> Result<()> {
        let slot = self
            .carriers
            .get_mut(index)
            .ok_or_else(|| TableError::InvalidField {
                field: "carrier index",
                reason: format!("{index} outside 0-{}", CARRIER_TABLE_MAX_CARRIERS - 1),
            })?;
        *slot = entry;
        Ok(())
    }

    pub fn reset_defaults(&mut self) {
        self.defaults = [0; DEFAULT_CARRIERS_MAX];
    }

    /// Decode a full record whose first byte is the table tag.
    pub fn from_record(record: &[u8], revision: Revision) -> Result<Self> {
        match record.split_first() {
            Some((&DLOG_MT_CARRIER_TABLE_EXP, payload)) => Self::decode(payload, revision),
            Some((&tag, _)) => {
                catalog::lookup(tag)?;
                Err(TableError::InvalidField {
                    field: "tag",
                    reason: format!(
                        "0x{tag:02x} is not a carrier record (0x{DLOG_MT_CARRIER_TABLE_EXP:02x})"
                    ),
                })
            }
            None => Err(TableError::SizeMismatch {
                table: DLOG_MT_CARRIER_TABLE_EXP,
                expected: CARRIER_TABLE_LEN,
                actual: 0,
            }),
        }
    }

    /// Clear the default carrier selectors and install carriers C0..C9 in the
    /// first ten slots. Remaining slots are left as they are.
    pub fn provision_standard(&mut self) {
        const PROMPTS: [&str; 10] = [
            "C0 PIC  Inter-LATA",
            "C1 Coin Inter-LATA",
            "C2 Card Inter-LATA",
            "C3 PIC  Intra-LATA",
            "C4 Coin Intra-LATA",
            "C5 Card Intra-LATA",
            "C6 PIC  Local",
            "C7 Coin Local",
            "C8 Card Local",
            "CARRIER 9",
        ];

        self.reset_defaults();
        for (i, (slot, prompt)) in self.carriers.iter_mut().zip(PROMPTS).enumerate() {
            *slot = CarrierEntry::standard(i as u8, prompt);
        }
    }

    /// Record bytes including the leading tag byte.
    pub fn to_record(&self) -> Vec<u8> {
        let mut record = Vec::with_capacity(CARRIER_TABLE_LEN);
        record.push(DLOG_MT_CARRIER_TABLE_EXP);
        record.extend_from_slice(&self.encode());
        record
    }
}

impl DlogTable for CarrierTable {
    fn decode(payload: &[u8], revision: Revision) -> Result<Self> {
        catalog::validate(DLOG_MT_CARRIER_TABLE_EXP, revision, payload.len())?;

        let (_, table) = parse_carrier_table(payload)?;

        debug!(
            "Decoded carrier table: {} of {} slots configured",
            table.active_entries().count(),
            CARRIER_TABLE_MAX_CARRIERS
        );
        Ok(table)
    }

    fn encode(&self) -> Vec<u8> {
        let mut buf = BytesMut::with_capacity(CARRIER_TABLE_LEN - 1);
        buf.put_slice(&self.defaults);
        for entry in self.carriers.iter().take(CARRIER_TABLE_MAX_CARRIERS) {
            entry.write(&mut buf);
        }
        for _ in self.carriers.len()..CARRIER_TABLE_MAX_CARRIERS {
            CarrierEntry::default().write(&mut buf);
        }
        buf.put_slice(&self.spare);
        buf.to_vec()
    }

    fn table_id(&self) -> u8 {
        DLOG_MT_CARRIER_TABLE_EXP
    }
}

impl fmt::Display for CarrierTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Default Carriers:")?;
        for (i, (label, value)) in DEFAULT_CARRIER_LABELS.iter().zip(self.defaults).enumerate() {
            writeln!(f, "\t{i} {label:<29} = 0x{value:02x} ({value:3})")?;
        }

        writeln!(f, "+----+------+--------+-------------+----------------------+------+------+---------+-------+------------+--------------+")?;
        writeln!(f, "|  # | Ref  | Number | Valid Cards | Display Prompt       |  CB2 |  CB  | FGB Tmr | Int'l | Call Entry | CB2/CB Flags |")?;
        writeln!(f, "+----+------+--------+-------------+----------------------+------+------+---------+-------+------------+--------------+")?;

        for (i, c) in self.active_entries() {
            writeln!(
                f,
                "| {:2} | 0x{:02x} | 0x{:04x} |  0x{:08x} | {} | 0x{:02x} | 0x{:02x} |  {:5}  |  0x{:02x} | 0x{:02x}   {:3} | {}",
                i,
                c.carrier_ref,
                c.carrier_num,
                c.valid_cards,
                c.display_prompt_string(),
                c.control_byte2,
                c.control_byte,
                c.fgb_timer,
                c.international_accept_flags,
                c.call_entry,
                c.call_entry,
                c.flag_labels().join(" | "),
            )?;
        }

        writeln!(f, "+----+------+--------+-------------+----------------------+------+------+---------+-------+------------+--------------+")?;
        write!(f, "Spare:")?;
        for b in self.spare {
            write!(f, " 0x{b:02x}")?;
        }
        writeln!(f)
    }
}
