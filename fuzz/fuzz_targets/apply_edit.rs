#![no_main]

use libfuzzer_sys::fuzz_target;
use script_tree::{BatchSerial, Script};

const SCRIPT: &str = r#"<cscr version="1.0">
  <transition desc="Fade In" readable="_tag_desc" />
  <monologue desc="Intro" readable="_tag_desc_body">Hello there</monologue>
  <clip start="0" end="10" readable="Cold open">cold</clip>
  <monologue readable="_body">Bye</monologue>
</cscr>"#;

fuzz_target!(|data: (u16, u8, bool, String)| {
    let (at, len, deleting, inserted) = data;
    let mut script =
        Script::from_xml_with_serial(SCRIPT, BatchSerial::fixed(0)).expect("fixture loads");
    let flat = script.flatten().expect("ids assigned");
    let mut ledger = flat.ledger.clone();
    let chars: Vec<char> = flat.text.chars().collect();
    let at = usize::from(at) % (chars.len() + 1);

    let (text, last, new) = if deleting {
        let end = (at + usize::from(len)).min(chars.len());
        let text: String = chars[..at].iter().chain(&chars[end..]).collect();
        (text, end, at)
    } else {
        let text: String = chars[..at]
            .iter()
            .copied()
            .chain(inserted.chars())
            .chain(chars[at..].iter().copied())
            .collect();
        (text, at, at + inserted.chars().count())
    };

    let before = (script.clone(), ledger.clone());
    match script.apply_edit(&mut ledger, last, new, &text) {
        // the fixture's spans tile the whole text, so they still do after an edit
        Ok(_) => assert_eq!(ledger.reconstruct(&text), Some(text.clone())),
        Err(_) => assert_eq!((script, ledger), before),
    }
});
