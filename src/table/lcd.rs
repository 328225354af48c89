//! # NPA-NXX Local Call Determination Tables (LCD_1..LCD_3)
//!
//! Each table classifies every exchange (NXX 200..=999) of one area code
//! (NPA). The payload begins with the NPA as three packed digits closed by an
//! end-marker nibble, e.g. NPA 408 is `40 8E`, followed by one rate class
//! per NXX in one of three encodings:
//!
//! | Encoding | Bits per NXX | Payload |
//! |----------|--------------|---------|
//! | uncompressed | 8 | 802 |
//! | compressed | 4, high nibble first | 402 |
//! | double-compressed | 2, MSB first | 202 |
//!
//! MTR 2.x terminals expect the double-compressed form, MTR 1.x the
//! compressed form.

use crate::codec::digits::phone_num_to_string;
use crate::constants::*;
use crate::error::{Result, TableError};
use crate::table::catalog::{self, Revision};
use crate::table::DlogTable;
use log::debug;
use serde::Serialize;
use std::fmt;

/// Short report symbols per rate class.
pub const RATE_SYMBOLS: [&str; 16] = [
    " L ", " ? ", "$LD", " - ", "$$$", "  5", "  6", "  7", "  8", "  9", " 10", " 11",
    " 12", " 13", " 14", " 15",
];

pub fn rate_label(class: u8) -> &'static str {
    match class {
        0 => "Local",
        1 => "Unknown",
        2 => "Intra-LATA toll",
        3 => "Invalid",
        4 => "Inter-LATA toll",
        _ => "Reserved",
    }
}

/// Packing of the per-NXX rate classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum NxxEncoding {
    Uncompressed,
    Compressed,
    DoubleCompressed,
}

impl NxxEncoding {
    pub fn for_revision(revision: Revision) -> Self {
        match revision {
            Revision::Mtr1 => NxxEncoding::Compressed,
            Revision::Mtr2 => NxxEncoding::DoubleCompressed,
        }
    }

    pub fn payload_len(self) -> usize {
        match self {
            NxxEncoding::Uncompressed => LCD_TABLE_LEN,
            NxxEncoding::Compressed => LCD_TABLE_LEN_COMPRESSED,
            NxxEncoding::DoubleCompressed => LCD_TABLE_LEN_DOUBLE_COMPRESSED,
        }
    }

    pub fn from_payload_len(len: usize) -> Option<Self> {
        [
            NxxEncoding::Uncompressed,
            NxxEncoding::Compressed,
            NxxEncoding::DoubleCompressed,
        ]
        .into_iter()
        .find(|e| e.payload_len() == len)
    }

    /// Largest class value the encoding can hold.
    pub fn max_class(self) -> u8 {
        match self {
            NxxEncoding::Uncompressed => 0xff,
            NxxEncoding::Compressed => 0x0f,
            NxxEncoding::DoubleCompressed => 0x03,
        }
    }

    /// Byte index, mask and shift of NXX slot `i` (0 = NXX 200).
    fn locate(self, i: usize) -> (usize, u8, u8) {
        match self {
            NxxEncoding::Uncompressed => (i, 0xff, 0),
            NxxEncoding::Compressed => {
                if i % 2 == 0 {
                    (i / 2, 0xf0, 4)
                } else {
                    (i / 2, 0x0f, 0)
                }
            }
            NxxEncoding::DoubleCompressed => {
                let group = (i % 4) as u8;
                (i / 4, 0xc0 >> (group * 2), 6 - group * 2)
            }
        }
    }
}

/// Decoded NPA-NXX table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LcdTable {
    pub table_id: u8,
    pub npa: u16,
    pub encoding: NxxEncoding,
    /// Rate class for NXX 200..=999
    classes: Vec<u8>,
}

fn decode_npa(header: &[u8]) -> Result<u16> {
    if !(0x20..=0x99).contains(&header[0]) {
        return Err(TableError::InvalidField {
            field: "NPA",
            reason: format!("first byte 0x{:02x} outside 200-999", header[0]),
        });
    }

    let check_digit = header[1] & 0x0f;
    if check_digit != NPA_TERMINATOR {
        return Err(TableError::InvalidField {
            field: "NPA",
            reason: format!("check digit 0x{check_digit:x}, expected 0xe"),
        });
    }

    let digits = phone_num_to_string(header, 4);
    match digits.parse::<u16>() {
        Ok(npa) if digits.len() == 3 => Ok(npa),
        _ => Err(TableError::InvalidField {
            field: "NPA",
            reason: format!("not three decimal digits: {digits:?}"),
        }),
    }
}

/// Only LCD_1..LCD_3 hold NPA-NXX records.
fn check_lcd_id(table_id: u8) -> Result<()> {
    catalog::lookup(table_id)?;
    if !(DLOG_MT_NPA_NXX_TABLE_1..=DLOG_MT_NPA_NXX_TABLE_3).contains(&table_id) {
        return Err(TableError::InvalidField {
            field: "table id",
            reason: format!("0x{table_id:02x} is not an NPA-NXX table"),
        });
    }
    Ok(())
}

fn encode_npa(npa: u16) -> [u8; NPA_LEN] {
    let d = [(npa / 100 % 10) as u8, (npa / 10 % 10) as u8, (npa % 10) as u8];
    [(d[0] << 4) | d[1], (d[2] << 4) | NPA_TERMINATOR]
}

impl LcdTable {
    /// Table for `npa` with every NXX classified local.
    pub fn new(table_id: u8, npa: u16, encoding: NxxEncoding) -> Result<Self> {
        check_lcd_id(table_id)?;
        if !(200..=999).contains(&npa) {
            return Err(TableError::InvalidField {
                field: "NPA",
                reason: format!("{npa} outside 200-999"),
            });
        }

        Ok(Self {
            table_id,
            npa,
            encoding,
            classes: vec![0; NXX_COUNT],
        })
    }

    /// Decode with the encoding mandated for `revision`.
    pub fn decode_table(table_id: u8, payload: &[u8], revision: Revision) -> Result<Self> {
        check_lcd_id(table_id)?;
        catalog::validate(table_id, revision, payload.len())?;
        Self::parse(table_id, payload, NxxEncoding::for_revision(revision))
    }

    /// Decode whichever of the three encodings matches the payload size.
    pub fn detect(table_id: u8, payload: &[u8]) -> Result<Self> {
        check_lcd_id(table_id)?;
        let encoding = NxxEncoding::from_payload_len(payload.len()).ok_or(
            TableError::SizeMismatch {
                table: table_id,
                expected: LCD_TABLE_LEN_DOUBLE_COMPRESSED,
                actual: payload.len(),
            },
        )?;
        Self::parse(table_id, payload, encoding)
    }

    fn parse(table_id: u8, payload: &[u8], encoding: NxxEncoding) -> Result<Self> {
        let (header, data) = payload.split_at(NPA_LEN);
        let npa = decode_npa(header)?;

        let classes = (0..NXX_COUNT)
            .map(|i| {
                let (index, mask, shift) = encoding.locate(i);
                (data[index] & mask) >> shift
            })
            .collect();

        debug!("Decoded NPA {npa} table 0x{table_id:02x} ({encoding:?})");
        Ok(Self {
            table_id,
            npa,
            encoding,
            classes,
        })
    }

    /// Rate class of `nxx`, `None` outside 200..=999.
    pub fn class_of(&self, nxx: u16) -> Option<u8> {
        nxx.checked_sub(NXX_FIRST)
            .and_then(|i| self.classes.get(i as usize))
            .copied()
    }

    pub fn set_class(&mut self, nxx: u16, class: u8) -> Result<()> {
        if class > self.encoding.max_class() {
            return Err(TableError::InvalidField {
                field: "rate class",
                reason: format!("{class} does not fit {:?}", self.encoding),
            });
        }

        let slot = nxx
            .checked_sub(NXX_FIRST)
            .and_then(|i| self.classes.get_mut(i as usize))
            .ok_or(TableError::InvalidField {
                field: "NXX",
                reason: format!("{nxx} outside {NXX_FIRST}-{NXX_LAST}"),
            })?;
        *slot = class;
        Ok(())
    }

    /// Re-pack into another encoding. Classes wider than the target are clamped.
    pub fn with_encoding(&self, encoding: NxxEncoding) -> Self {
        Self {
            encoding,
            classes: self
                .classes
                .iter()
                .map(|&c| c.min(encoding.max_class()))
                .collect(),
            ..self.clone()
        }
    }
}

impl DlogTable for LcdTable {
    /// Decodes as LCD_1; use [`DlogTable::decode_as`] for LCD_2 and LCD_3.
    fn decode(payload: &[u8], revision: Revision) -> Result<Self> {
        Self::decode_table(DLOG_MT_NPA_NXX_TABLE_1, payload, revision)
    }

    fn decode_as(table_id: u8, payload: &[u8], revision: Revision) -> Result<Self> {
        Self::decode_table(table_id, payload, revision)
    }

    fn encode(&self) -> Vec<u8> {
        let mut out = vec![0u8; self.encoding.payload_len()];
        out[..NPA_LEN].copy_from_slice(&encode_npa(self.npa));

        let data = &mut out[NPA_LEN..];
        for (i, &class) in self.classes.iter().enumerate() {
            let (index, mask, shift) = self.encoding.locate(i);
            data[index] = (data[index] & !mask) | ((class << shift) & mask);
        }
        out
    }

    fn table_id(&self) -> u8 {
        self.table_id
    }
}

impl fmt::Display for LcdTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, &class) in self.classes.iter().enumerate() {
            let nxx = NXX_FIRST as usize + i;
            if nxx % 200 == 0 {
                if nxx != NXX_FIRST as usize {
                    writeln!(f)?;
                }
                writeln!(f, "+---------------------------------------------------------------------+")?;
                writeln!(f, "| NPA-NXX |  0  |  1  |  2  |  3  |  4  |  5  |  6  |  7  |  8  |  9  |")?;
                write!(f, "+---------+-----+-----+-----+-----+-----+-----+-----+-----+-----+-----+")?;
            }
            if nxx % 10 == 0 {
                write!(f, "\n| {:03}-{:02}x |", self.npa, nxx / 10)?;
            }
            match RATE_SYMBOLS.get(class as usize) {
                Some(symbol) => write!(f, " {symbol} |")?,
                None => write!(f, " {class:3} |")?,
            }
        }
        writeln!(f)?;
        writeln!(f, "+---------------------------------------------------------------------+")
    }
}
