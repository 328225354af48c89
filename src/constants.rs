//! DLOG Table Constants
//!
//! Table identifiers, record geometry and field widths for the tables exchanged
//! between a Millennium terminal and its management host.

// ----------------------------------------------------------------------------
// Table identifiers
// ----------------------------------------------------------------------------

/// Card table, MTR 1.x layout
pub const DLOG_MT_CARD_TABLE: u8 = 0x16;

/// Installation parameters (INSTSV)
pub const DLOG_MT_INSTALL_PARAMS: u8 = 0x1f;

/// Expanded carrier table
pub const DLOG_MT_CARRIER_TABLE_EXP: u8 = 0x85;

/// Expanded card table, MTR 2.x layout
pub const DLOG_MT_CARD_TABLE_EXP: u8 = 0x86;

/// NPA-NXX rate tables
pub const DLOG_MT_NPA_NXX_TABLE_1: u8 = 0x88;
pub const DLOG_MT_NPA_NXX_TABLE_2: u8 = 0x89;
pub const DLOG_MT_NPA_NXX_TABLE_3: u8 = 0x8a;

// ----------------------------------------------------------------------------
// Checksum
// ----------------------------------------------------------------------------

/// Reversed CRC-16 polynomial
pub const CRC16_POLY: u16 = 0xA001;

/// Seed used when stamping and verifying stored records
pub const CHECKSUM_SEED: u16 = 0x0000;

/// Width of the little-endian checksum trailer
pub const CHECKSUM_LEN: usize = 2;

// ----------------------------------------------------------------------------
// Carrier table
// ----------------------------------------------------------------------------

pub const DEFAULT_CARRIERS_MAX: usize = 9;
pub const CARRIER_TABLE_MAX_CARRIERS: usize = 33;
pub const CARRIER_TABLE_SPARE_LEN: usize = 4;
pub const DISPLAY_PROMPT_LEN: usize = 20;

/// carrier_ref + carrier_num + valid_cards + prompt + cb2 + cb + fgb_timer + intl + call_entry
pub const CARRIER_ENTRY_LEN: usize = 1 + 2 + 4 + DISPLAY_PROMPT_LEN + 1 + 1 + 2 + 1 + 1;

/// Record size including the leading tag byte.
pub const CARRIER_TABLE_LEN: usize = 1
    + DEFAULT_CARRIERS_MAX
    + CARRIER_TABLE_MAX_CARRIERS * CARRIER_ENTRY_LEN
    + CARRIER_TABLE_SPARE_LEN;

// ----------------------------------------------------------------------------
// Card table
// ----------------------------------------------------------------------------

pub const CCARD_MAX: usize = 32;
pub const CCARD_MAX_MTR1: usize = 20;

pub const PAN_LEN: usize = 3;
pub const SERVICE_CODE_LEN: usize = 20;
pub const SVC_CODE_MAX: usize = 5;
pub const SPILL_STRING_LEN: usize = 8;
pub const SC_CHECK_DIGIT_LEN: usize = 6;
pub const SC_CHECK_VALUE_LEN: usize = 8;
pub const SC_MANUF_LEN: usize = 5;

pub const CARD_ENTRY_LEN_MTR1: usize = 2 * PAN_LEN + 5 + SERVICE_CODE_LEN + 2;
pub const CARD_ENTRY_LEN: usize = CARD_ENTRY_LEN_MTR1 + 3;

pub const CARD_TABLE_LEN_MTR1: usize = CCARD_MAX_MTR1 * CARD_ENTRY_LEN_MTR1;
pub const CARD_TABLE_LEN: usize = CCARD_MAX * CARD_ENTRY_LEN;

// ----------------------------------------------------------------------------
// Installation parameters
// ----------------------------------------------------------------------------

pub const INSTALL_PARAMS_LEN: usize = 45;

// ----------------------------------------------------------------------------
// NPA-NXX (LCD) tables
// ----------------------------------------------------------------------------

pub const NPA_LEN: usize = 2;
pub const NXX_FIRST: u16 = 200;
pub const NXX_LAST: u16 = 999;
pub const NXX_COUNT: usize = (NXX_LAST - NXX_FIRST + 1) as usize;

/// Payload sizes (tag byte excluded) for the three NXX encodings.
pub const LCD_TABLE_LEN: usize = NPA_LEN + NXX_COUNT;
pub const LCD_TABLE_LEN_COMPRESSED: usize = NPA_LEN + NXX_COUNT / 2;
pub const LCD_TABLE_LEN_DOUBLE_COMPRESSED: usize = NPA_LEN + NXX_COUNT / 4;

/// Nibble closing the NPA header.
pub const NPA_TERMINATOR: u8 = 0x0E;
