use script_tree::{BodySource, Node, resolve};
use serde::Deserialize;
use std::fs;
use std::path::Path;

#[derive(Debug, Deserialize)]
struct CaseFile {
    case: Vec<Case>,
}

#[derive(Debug, Deserialize)]
struct Case {
    name: String,
    tag: String,
    desc: Option<String>,
    text: Option<String>,
    readable: Option<String>,
    header: Option<String>,
    body: Option<String>,
    source: Option<String>,
}

fn load_cases() -> Vec<Case> {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/readable_cases.toml");
    let content = fs::read_to_string(&path)
        .unwrap_or_else(|err| panic!("failed to read fixture {path:?}: {err}"));
    let file: CaseFile =
        toml::from_str(&content).unwrap_or_else(|err| panic!("bad fixture {path:?}: {err}"));
    assert!(!file.case.is_empty(), "fixture {path:?} has no cases");
    file.case
}

fn source(name: &str) -> BodySource {
    match name {
        "text" => BodySource::Text,
        "literal" => BodySource::Literal,
        "none" => BodySource::None,
        other => panic!("unknown body source {other:?}"),
    }
}

fn node(case: &Case) -> Node {
    let mut node = Node::new(case.tag.as_str());
    if let Some(desc) = &case.desc {
        node = node.with_attr("desc", desc.as_str());
    }
    if let Some(readable) = &case.readable {
        node = node.with_attr("readable", readable.as_str());
    }
    if let Some(text) = &case.text {
        node = node.with_text(text.as_str());
    }
    node
}

#[test]
fn readable_fixture_table() {
    for case in load_cases() {
        let resolved = resolve(&node(&case));
        match (&case.readable, resolved) {
            (None, None) => {}
            (None, Some(r)) => panic!("{}: expected no rendering, got {r:?}", case.name),
            (Some(_), None) => panic!("{}: expected a rendering", case.name),
            (Some(_), Some(r)) => {
                assert_eq!(Some(&r.header), case.header.as_ref(), "{}: header", case.name);
                assert_eq!(Some(&r.body), case.body.as_ref(), "{}: body", case.name);
                let expected = case.source.as_deref().map(source);
                assert_eq!(Some(r.source), expected, "{}: source", case.name);
            }
        }
    }
}
