#![no_main]

use libfuzzer_sys::fuzz_target;
use script_tree::{BatchSerial, Script};

fuzz_target!(|data: &[u8]| {
    let Ok(xml) = std::str::from_utf8(data) else {
        return;
    };
    let Ok(script) = Script::from_xml_with_serial(xml, BatchSerial::fixed(0)) else {
        return;
    };
    // every loaded script flattens, and saving then reloading changes nothing
    let flat = script.flatten().expect("loaded scripts have ids");
    assert_eq!(flat.ledger.reconstruct(&flat.text), Some(flat.text.clone()));
    let again = Script::from_xml_with_serial(&script.to_xml(), BatchSerial::fixed(1))
        .expect("serialized output reloads");
    assert_eq!(again.flatten().expect("ids kept"), flat);
});
