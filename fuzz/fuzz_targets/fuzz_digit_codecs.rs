#![no_main]

use libfuzzer_sys::fuzz_target;
use mm_tables::{
    call_type_to_string, callscrn_num_to_string, decode_flags, phone_num_to_string,
    string_to_bcd_a,
};

const LABELS: [&str; 8] = ["0", "1", "2", "3", "4", "5", "6", "7"];

fuzz_target!(|data: &[u8]| {
    let capacity = data.first().copied().unwrap_or(0) as usize;

    let _ = phone_num_to_string(data, capacity);
    let _ = callscrn_num_to_string(data, capacity);

    if let Ok(text) = std::str::from_utf8(data) {
        let mut out = vec![0u8; capacity / 4];
        let consumed = string_to_bcd_a(text, &mut out);
        assert!(consumed <= out.len() * 2);
    }

    for &byte in data.iter().take(16) {
        let _ = call_type_to_string(byte, capacity);
        assert_eq!(decode_flags(byte, &LABELS).len(), byte.count_ones() as usize);
    }
});
