#![no_main]

use animlock_wire::{AckFields, ACK_FIELDS_LEN};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    match AckFields::parse(data) {
        Ok(fields) => {
            assert!(data.len() >= ACK_FIELDS_LEN);
            let header = fields.to_header();
            let reparsed = AckFields::parse(&header).expect("rebuilt header parses");
            assert_eq!(reparsed.action_id, fields.action_id);
            assert_eq!(
                reparsed.animation_lock.to_bits(),
                fields.animation_lock.to_bits()
            );
        }
        Err(_) => assert!(data.len() < ACK_FIELDS_LEN),
    }
});
