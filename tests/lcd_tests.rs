//! Tests for the NPA-NXX local call determination tables.

use mm_tables::constants::*;
use mm_tables::table::lcd::rate_label;
use mm_tables::{DlogTable, LcdTable, NxxEncoding, Revision, TableError};
use proptest::prelude::*;

fn header(npa: [u8; 2], encoding: NxxEncoding) -> Vec<u8> {
    let mut payload = vec![0u8; encoding.payload_len()];
    payload[..2].copy_from_slice(&npa);
    payload
}

#[test]
fn test_revision_selects_encoding() {
    let mtr1 = header([0x40, 0x8e], NxxEncoding::Compressed);
    let mtr2 = header([0x40, 0x8e], NxxEncoding::DoubleCompressed);

    assert_eq!(LcdTable::decode(&mtr1, Revision::Mtr1).unwrap().encoding, NxxEncoding::Compressed);
    assert_eq!(
        LcdTable::decode(&mtr2, Revision::Mtr2).unwrap().encoding,
        NxxEncoding::DoubleCompressed
    );
    assert!(matches!(
        LcdTable::decode(&mtr1, Revision::Mtr2),
        Err(TableError::SizeMismatch { expected: 202, actual: 402, .. })
    ));
}

#[test]
fn test_detect_all_encodings() {
    for encoding in [
        NxxEncoding::Uncompressed,
        NxxEncoding::Compressed,
        NxxEncoding::DoubleCompressed,
    ] {
        let table = LcdTable::detect(DLOG_MT_NPA_NXX_TABLE_3, &header([0x61, 0x3e], encoding)).unwrap();
        assert_eq!(table.encoding, encoding);
        assert_eq!(table.npa, 613);
        assert_eq!(table.table_id(), DLOG_MT_NPA_NXX_TABLE_3);
    }

    assert!(matches!(
        LcdTable::detect(0x42, &header([0x61, 0x3e], NxxEncoding::Compressed)),
        Err(TableError::UnknownTable(0x42))
    ));
}

#[test]
fn test_invalid_npa_headers() {
    for npa in [[0x19, 0x9e], [0xa0, 0x0e], [0x40, 0x80], [0x40, 0x8f]] {
        let payload = header(npa, NxxEncoding::DoubleCompressed);
        assert!(
            matches!(
                LcdTable::decode(&payload, Revision::Mtr2),
                Err(TableError::InvalidField { field: "NPA", .. })
            ),
            "{npa:02x?}"
        );
    }
}

#[test]
fn test_double_compressed_bit_order() {
    let mut payload = header([0x40, 0x8e], NxxEncoding::DoubleCompressed);
    // NXX 996..999 in the last byte
    payload[LCD_TABLE_LEN_DOUBLE_COMPRESSED - 1] = 0b00_01_10_11;
    let table = LcdTable::decode(&payload, Revision::Mtr2).unwrap();

    assert_eq!(table.class_of(996), Some(0));
    assert_eq!(table.class_of(997), Some(1));
    assert_eq!(table.class_of(998), Some(2));
    assert_eq!(table.class_of(999), Some(3));
    assert_eq!(rate_label(table.class_of(998).unwrap()), "Intra-LATA toll");
}

#[test]
fn test_compressed_high_nibble_first() {
    let mut payload = header([0x40, 0x8e], NxxEncoding::Compressed);
    payload[NPA_LEN] = 0x4f;
    let table = LcdTable::decode(&payload, Revision::Mtr1).unwrap();
    assert_eq!(table.class_of(200), Some(4));
    assert_eq!(table.class_of(201), Some(15));
    assert_eq!(rate_label(4), "Inter-LATA toll");
    assert_eq!(rate_label(15), "Reserved");
}

#[test]
fn test_build_and_encode() {
    let mut table = LcdTable::new(DLOG_MT_NPA_NXX_TABLE_2, 212, NxxEncoding::DoubleCompressed).unwrap();
    table.set_class(555, 2).unwrap();
    table.set_class(999, 3).unwrap();

    let bytes = table.encode();
    assert_eq!(&bytes[..2], &[0x21, 0x2e]);
    assert_eq!(bytes.len(), 202);

    let back = LcdTable::decode_table(DLOG_MT_NPA_NXX_TABLE_2, &bytes, Revision::Mtr2).unwrap();
    assert_eq!(back, table);

    assert!(LcdTable::new(DLOG_MT_NPA_NXX_TABLE_2, 99, NxxEncoding::Compressed).is_err());
}

#[test]
fn test_report_grid() {
    let mut table = LcdTable::new(DLOG_MT_NPA_NXX_TABLE_1, 408, NxxEncoding::Compressed).unwrap();
    table.set_class(201, 2).unwrap();
    let report = table.to_string();

    assert!(report.contains("| 408-20x |  L  | $LD |"));
    assert!(report.contains("| 408-99x |"));
    assert_eq!(report.matches("NPA-NXX").count(), 4);
}

proptest! {
    #[test]
    fn prop_double_compressed_exact(data in proptest::collection::vec(any::<u8>(), 200)) {
        let mut payload = vec![0x40, 0x8e];
        payload.extend(data);
        let table = LcdTable::decode(&payload, Revision::Mtr2).unwrap();
        prop_assert_eq!(table.encode(), payload);
    }

    #[test]
    fn prop_set_class_reads_back(nxx in 200u16..=999, class in 0u8..16) {
        let mut table = LcdTable::new(DLOG_MT_NPA_NXX_TABLE_1, 408, NxxEncoding::Compressed).unwrap();
        table.set_class(nxx, class).unwrap();
        let back = LcdTable::detect(DLOG_MT_NPA_NXX_TABLE_1, &table.encode()).unwrap();
        prop_assert_eq!(back.class_of(nxx), Some(class));
    }
}
