//! Tests for the card tables and the revision converter.

use mm_tables::constants::*;
use mm_tables::table::card::{StandardCard, VerifyFlags};
use mm_tables::table::convert::convert_entries;
use mm_tables::table::layout::{card_layout, CARD_LAYOUT_MTR1, CARD_LAYOUT_MTR2};
use mm_tables::{convert_card_table, CardEntry, CardTable, DlogTable, Revision, TableError};
use proptest::prelude::*;

fn sample_entry(seed: u8) -> CardEntry {
    CardEntry {
        pan_start: [0x37, seed, 0x00],
        pan_end: [0x37, seed, 0x99],
        standard_cd: StandardCard::Ansi as u8,
        vfy_flags: VerifyFlags::CALLING_CARD_IND.bits(),
        p_exp_date: 0x0b,
        p_init_date: 0x0c,
        p_disc_data: 0x0d,
        svc_code: [seed; SERVICE_CODE_LEN],
        ref_num: seed,
        carrier_ref: 0x03,
        control_info: 0xc0,
        bank_info: 0xb0,
        lang_code: 0x01,
    }
}

#[test]
fn test_table_ids_per_revision() {
    assert_eq!(CardTable::new(Revision::Mtr1).table_id(), DLOG_MT_CARD_TABLE);
    assert_eq!(CardTable::new(Revision::Mtr2).table_id(), DLOG_MT_CARD_TABLE_EXP);
    assert_eq!(CardTable::new(Revision::Mtr1).entries.len(), CCARD_MAX_MTR1);
    assert_eq!(CardTable::new(Revision::Mtr2).entries.len(), CCARD_MAX);
}

#[test]
fn test_decode_rejects_other_revision_size() {
    let mtr1 = CardTable::new(Revision::Mtr1).encode();
    assert!(matches!(
        CardTable::decode(&mtr1, Revision::Mtr2),
        Err(TableError::SizeMismatch { expected: 1152, actual: 660, .. })
    ));
}

#[test]
fn test_unused_entries_skipped() {
    let mut table = CardTable::new(Revision::Mtr2);
    table.entries[5] = sample_entry(5);
    table.entries[31] = sample_entry(31);

    let decoded = CardTable::decode(&table.encode(), Revision::Mtr2).unwrap();
    let slots: Vec<usize> = decoded.active_entries().map(|(i, _)| i).collect();
    assert_eq!(slots, vec![5, 31]);
}

#[test]
fn test_verify_flag_editing() {
    let mut table = CardTable::new(Revision::Mtr2);
    table.entries[0] = sample_entry(0);
    table.set_verify_flags(VerifyFlags::ACCS_ROUTING | VerifyFlags::MOD10_IND);
    assert!(table.entries[0].verify_flags().contains(VerifyFlags::ACCS_ROUTING));

    table.clear_verify_flags(VerifyFlags::ACCS_ROUTING);
    assert!(table
        .entries
        .iter()
        .all(|e| !e.verify_flags().contains(VerifyFlags::ACCS_ROUTING)));
    assert!(table.entries[0].verify_flags().contains(VerifyFlags::MOD10_IND));

    table.set_carrier_ref(0, 0x09);
    table.set_carrier_ref(99, 0x09);
    assert_eq!(table.entries[0].carrier_ref, 0x09);
}

#[test]
fn test_calling_card_indicator_inverted() {
    // Bit set: not a calling card
    let entry = sample_entry(1);
    assert!(!entry.verify_flag_labels().contains(&"CALLING CD"));

    let calling = CardEntry {
        vfy_flags: 0,
        ..sample_entry(1)
    };
    assert_eq!(calling.verify_flag_labels(), vec!["CALLING CD"]);
}

#[test]
fn test_convert_same_revision_is_identity() {
    let mut table = CardTable::new(Revision::Mtr1);
    table.entries[3] = sample_entry(3);
    let bytes = table.encode();

    assert_eq!(convert_card_table(&bytes, Revision::Mtr1, Revision::Mtr1).unwrap(), bytes);
    assert_eq!(table.convert(Revision::Mtr1).encode(), bytes);
}

#[test]
fn test_narrowing_drops_extended_bytes() {
    let mut table = CardTable::new(Revision::Mtr2);
    for i in 0..CCARD_MAX {
        table.entries[i] = sample_entry(i as u8 + 1);
    }
    let src = table.encode();
    let out = convert_card_table(&src, Revision::Mtr2, Revision::Mtr1).unwrap();
    assert_eq!(out.len(), CARD_TABLE_LEN_MTR1);

    // control_info and bank_info values never appear in the output
    assert!(!out.contains(&0xc0));
    assert!(!out.contains(&0xb0));
    assert!(src.contains(&0xc0));

    // Surplus entries beyond 20 are gone
    let narrowed = CardTable::decode(&out, Revision::Mtr1).unwrap();
    assert_eq!(narrowed.entries.len(), CCARD_MAX_MTR1);
    assert_eq!(narrowed.entries[19].ref_num, 20);
    assert_eq!(narrowed.entries[19].control_info, 0);
}

#[test]
fn test_narrow_then_widen_is_lossy() {
    let mut table = CardTable::new(Revision::Mtr2);
    table.entries[0] = sample_entry(7);
    table.entries[25] = sample_entry(25);

    let back = table.convert(Revision::Mtr1).convert(Revision::Mtr2);
    assert_ne!(back, table);
    assert_eq!(back.entries[0].pan_start, table.entries[0].pan_start);
    assert_eq!(back.entries[0].bank_info, 0);
    assert!(back.entries[25].is_unused());
}

#[test]
fn test_layouts_drive_conversion() {
    assert_eq!(card_layout(Revision::Mtr1), &CARD_LAYOUT_MTR1);
    let widened = convert_entries(&[], &CARD_LAYOUT_MTR1, &CARD_LAYOUT_MTR2);
    assert_eq!(widened, vec![0u8; CARD_TABLE_LEN]);
}

#[test]
fn test_report_shows_active_entries() {
    let mut table = CardTable::new(Revision::Mtr2);
    table.entries[2] = sample_entry(2);
    let report = table.to_string();
    assert!(report.contains("370200 - 370299"));
    assert!(report.contains("ANSI"));
    assert!(report.contains("Bank: xb0"));
}

proptest! {
    #[test]
    fn prop_widening_preserves_mtr1_bytes(src in proptest::collection::vec(any::<u8>(), CARD_TABLE_LEN_MTR1)) {
        let out = convert_card_table(&src, Revision::Mtr1, Revision::Mtr2).unwrap();
        prop_assert_eq!(out.len(), CARD_TABLE_LEN);
        for i in 0..CCARD_MAX_MTR1 {
            let s = &src[i * CARD_ENTRY_LEN_MTR1..(i + 1) * CARD_ENTRY_LEN_MTR1];
            let d = &out[i * CARD_ENTRY_LEN..(i + 1) * CARD_ENTRY_LEN];
            prop_assert_eq!(&d[..CARD_ENTRY_LEN_MTR1], s);
            prop_assert_eq!(&d[CARD_ENTRY_LEN_MTR1..], &[0u8, 0, 0][..]);
        }
    }

    #[test]
    fn prop_mtr2_decode_encode_exact(src in proptest::collection::vec(any::<u8>(), CARD_TABLE_LEN)) {
        let table = CardTable::decode(&src, Revision::Mtr2).unwrap();
        prop_assert_eq!(table.encode(), src);
    }
}
