use criterion::{BatchSize, Criterion, black_box, criterion_group, criterion_main};
use script_tree::{BatchSerial, Node, Script, apply_edit, assign_ids, flatten, parse_tree};

const SMALL_SECTIONS: usize = 16;
const LARGE_SECTIONS: usize = 5_000;

fn make_script(sections: usize) -> Node {
    let mut root = Node::new("cscr").with_attr("version", "1.0");
    for i in 0..sections {
        root = root
            .with_child(
                Node::new("transition")
                    .with_attr("desc", format!("Cut {i}"))
                    .with_attr("readable", "_tag_desc"),
            )
            .with_child(
                Node::new("monologue")
                    .with_attr("desc", format!("Part {i}"))
                    .with_attr("readable", "_tag_desc_body")
                    .with_text("Lorem ipsum dolor sit amet, consectetur adipiscing elit."),
            )
            .with_child(
                Node::new("clip")
                    .with_attr("start", "0")
                    .with_attr("end", "1000")
                    .with_attr("readable", "B-roll"),
            );
    }
    assign_ids(&mut root, BatchSerial::fixed(1));
    root
}

fn bench_flatten_small(c: &mut Criterion) {
    let root = make_script(SMALL_SECTIONS);
    c.bench_function("bench_flatten_small", |b| {
        b.iter(|| black_box(flatten(black_box(&root))));
    });
}

fn bench_flatten_large(c: &mut Criterion) {
    let root = make_script(LARGE_SECTIONS);
    c.bench_function("bench_flatten_large", |b| {
        b.iter(|| black_box(flatten(black_box(&root))));
    });
}

fn bench_edit_first_body_large(c: &mut Criterion) {
    // Worst case for the shift: every later entry moves.
    let root = make_script(LARGE_SECTIONS);
    let flat = flatten(&root).expect("ids assigned");
    let (_, first) = flat
        .ledger
        .iter()
        .find(|(_, e)| e.body_len() > 0)
        .expect("a body");
    let at = first.body_start;
    let mut text = flat.text.clone();
    let byte = text.char_indices().nth(at).map_or(text.len(), |(i, _)| i);
    text.insert(byte, 'x');

    c.bench_function("bench_edit_first_body_large", |b| {
        b.iter_batched(
            || (root.clone(), flat.ledger.clone()),
            |(mut root, mut ledger)| {
                black_box(apply_edit(&mut root, &mut ledger, at, at + 1, &text).is_ok());
            },
            BatchSize::LargeInput,
        );
    });
}

fn bench_load_large(c: &mut Criterion) {
    let xml = Script::from_xml_with_serial(
        &script_tree::tree_to_xml(&make_script(LARGE_SECTIONS)),
        BatchSerial::fixed(1),
    )
    .expect("loads")
    .to_xml();
    c.bench_function("bench_load_large", |b| {
        b.iter(|| black_box(parse_tree(black_box(&xml)).is_ok()));
    });
}

criterion_group!(
    benches,
    bench_flatten_small,
    bench_flatten_large,
    bench_edit_first_body_large,
    bench_load_large
);
criterion_main!(benches);
