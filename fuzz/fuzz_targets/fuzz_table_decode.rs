#![no_main]

use libfuzzer_sys::fuzz_target;
use mm_tables::catalog;
use mm_tables::{
    convert_card_table, unstamp, CardTable, CarrierTable, DlogTable, InstallParams, LcdTable,
    Revision,
};

fn decode_all(payload: &[u8], revision: Revision) {
    let _ = CarrierTable::decode(payload, revision);
    let _ = CardTable::decode(payload, revision);
    let _ = InstallParams::decode(payload, revision);
    let _ = LcdTable::decode(payload, revision);
}

fuzz_target!(|data: &[u8]| {
    // Arbitrary sizes must be rejected by the validator, never panic
    decode_all(data, Revision::Mtr1);
    decode_all(data, Revision::Mtr2);

    if let Ok(stamped) = unstamp(data) {
        let _ = stamped.check();
    }

    // Resize to every catalog size so the field parsers see arbitrary content
    for info in catalog::all_tables() {
        for revision in [Revision::Mtr1, Revision::Mtr2] {
            let Ok(len) = info.payload_len(revision) else {
                continue;
            };
            let mut sized = data.to_vec();
            sized.resize(len, 0);
            decode_all(&sized, revision);
            let _ = LcdTable::detect(info.id, &sized);

            if let Ok(table) = CarrierTable::decode(&sized, revision) {
                assert_eq!(table.encode(), sized);
            }
            if let Ok(table) = CardTable::decode(&sized, revision) {
                assert_eq!(table.encode(), sized);
                let _ = table.to_string();
            }
            let _ = convert_card_table(&sized, revision, Revision::Mtr1);
            let _ = convert_card_table(&sized, revision, Revision::Mtr2);
        }
    }
});
