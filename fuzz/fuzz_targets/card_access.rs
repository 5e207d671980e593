#![no_main]

use libfuzzer_sys::fuzz_target;
use mrtd_channel::definitions::CardAccess;

fuzz_target!(|data: &[u8]| {
    if let Ok(card_access) = CardAccess::from_der(data) {
        let _ = card_access.to_der_canonical();
    }
});
