use script_tree::{
    BatchSerial, EditError, Node, OffsetLedger, Script, assign_ids, find_node_by_id, flatten,
};

const SCRIPT: &str = r#"<cscr version="1.0">
  <title>Pilot</title>
  <transition desc="Fade In" readable="_tag_desc" />
  <monologue desc="Intro" readable="_tag_desc_body">Hello there</monologue>
  <section>
    <clip start="0" end="900" readable="Cold open">cold</clip>
    <monologue desc="Outro" readable="_desc_body">Bye</monologue>
  </section>
</cscr>
"#;

fn load() -> Script {
    Script::from_xml_with_serial(SCRIPT, BatchSerial::fixed(3)).expect("loads")
}

fn splice(text: &str, from: usize, to: usize, with: &str) -> String {
    let a = text.char_indices().nth(from).map_or(text.len(), |(i, _)| i);
    let b = text.char_indices().nth(to).map_or(text.len(), |(i, _)| i);
    format!("{}{with}{}", &text[..a], &text[b..])
}

fn assert_in_sync(script: &Script, text: &str, ledger: &OffsetLedger) {
    let fresh = script.flatten().expect("ids assigned");
    assert_eq!(fresh.text, text);
    assert_eq!(&fresh.ledger, ledger);
}

#[test]
fn flatten_round_trip() {
    let flat = load().flatten().expect("ids assigned");
    assert_eq!(flat.ledger.reconstruct(&flat.text), Some(flat.text.clone()));
    assert_eq!(
        flat.text,
        "[Transition - Fade In]\n\n[Monologue - Intro]\n\nHello there\n\nCold open\n[Outro]\n\nBye\n\n"
    );
}

#[test]
fn identity_assignment_is_idempotent() {
    let script = load();
    let mut root = script.root().clone();
    assert_eq!(assign_ids(&mut root, BatchSerial::fixed(99)), 0);
    assert_eq!(&root, script.root());
}

#[test]
fn edits_keep_ledger_equal_to_a_fresh_flatten() {
    let mut script = load();
    let flat = script.flatten().expect("ids assigned");
    let (mut text, mut ledger) = (flat.text, flat.ledger);

    // type into the intro body
    let at = ledger.get("monologue3-3").expect("intro").body_start + 5;
    text = splice(&text, at, at, ",");
    script
        .apply_edit(&mut ledger, at, at + 1, &text)
        .expect("typed");
    assert_in_sync(&script, &text, &ledger);

    // delete two characters from the outro
    let start = ledger.get("monologue6-3").expect("outro").body_start;
    text = splice(&text, start + 1, start + 3, "");
    script
        .apply_edit(&mut ledger, start + 3, start + 1, &text)
        .expect("deleted");
    assert_in_sync(&script, &text, &ledger);
    assert_eq!(
        script.lookup("monologue6-3").and_then(Node::text),
        Some("B")
    );

    // multi-char paste into the literal caption
    let caption = *ledger.get("clip5-3").expect("clip");
    text = splice(&text, caption.body_start, caption.body_start, "The ");
    script
        .apply_edit(&mut ledger, caption.body_start, caption.body_start + 4, &text)
        .expect("pasted");
    assert_in_sync(&script, &text, &ledger);
    assert_eq!(
        script.get_property("clip5-3", "readable"),
        Ok(Some("The Cold open"))
    );
    assert_eq!(script.get_property("clip5-3", "content"), Ok(Some("cold")));
}

#[test]
fn edits_outside_bodies_are_rejected_and_change_nothing() {
    let mut script = load();
    let flat = script.flatten().expect("ids assigned");
    let mut ledger = flat.ledger;
    let header = ledger.get("monologue3-3").expect("intro").header_range();
    let before = (script.clone(), ledger.clone());

    // header.start itself belongs to the empty transition body in front of it
    for pos in [header.start + 1, header.start + 3, header.end - 1] {
        let text = splice(&flat.text, pos, pos, "x");
        assert_eq!(
            script.apply_edit(&mut ledger, pos, pos + 1, &text),
            Err(EditError::NoTargetSection { position: pos })
        );
        assert_eq!((script.clone(), ledger.clone()), before);
    }
}

#[test]
fn zero_length_body_takes_the_insertion() {
    let mut root = Node::new("cscr")
        .with_child(
            Node::new("transition")
                .with_attr("desc", "Cut")
                .with_attr("readable", "_tag_desc"),
        )
        .with_child(
            Node::new("monologue")
                .with_attr("readable", "_body")
                .with_text("Next"),
        );
    assign_ids(&mut root, BatchSerial::fixed(0));
    let flat = flatten(&root).expect("ids assigned");
    let mut ledger = flat.ledger;
    let empty = *ledger.get("transition1-0").expect("transition");
    assert_eq!(empty.body_len(), 0);

    let text = splice(&flat.text, empty.body_start, empty.body_start, "slow");
    let outcome = script_tree::apply_edit(
        &mut root,
        &mut ledger,
        empty.body_start,
        empty.body_start + 4,
        &text,
    )
    .expect("empty body grows");
    assert_eq!(outcome.node_id, "transition1-0");
    assert_eq!(
        find_node_by_id(&root, "transition1-0").and_then(Node::text),
        Some("slow")
    );
    let next = ledger.get("monologue2-0").expect("monologue");
    assert_eq!(next.header_start(), empty.body_start + 4);
}

#[test]
fn duplicate_ids_in_a_file_edit_their_own_node() {
    let xml = r#"<cscr version="1.0">
  <monologue id="dup" readable="_body">First</monologue>
  <monologue id="dup" readable="_body">Second</monologue>
</cscr>"#;
    let mut script = Script::from_xml_with_serial(xml, BatchSerial::fixed(4)).expect("loads");
    let flat = script.flatten().expect("ids assigned");
    let (second_id, at) = flat
        .ledger
        .iter()
        .nth(1)
        .map(|(id, e)| (id.to_string(), e.body_start))
        .expect("two bodies");
    assert_ne!(second_id, "dup");

    let mut ledger = flat.ledger;
    let text = splice(&flat.text, at, at, "X");
    let outcome = script
        .apply_edit(&mut ledger, at, at + 1, &text)
        .expect("inside the second body");
    assert_eq!(outcome.node_id, second_id);

    let texts: Vec<Option<&str>> = script.root().children().iter().map(Node::text).collect();
    assert_eq!(texts, [Some("First"), Some("XSecond")]);
    assert_in_sync(&script, &text, &ledger);
}
