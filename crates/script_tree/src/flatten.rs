use crate::error::FlattenError;
use crate::ledger::{OffsetEntry, OffsetLedger};
use crate::readable::resolve;
use crate::traverse::preorder;
use crate::types::Node;
use tools::char_len;

/// Flat text of a script plus the span of every readable node in it.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Flattened {
    pub text: String,
    pub ledger: OffsetLedger,
}

/// Render the tree into one flat text buffer, recording each readable
/// node's header and body span.
///
/// Readability is per node: children of an unreadable node are still
/// rendered. A node without an id aborts the whole pass.
pub fn flatten(root: &Node) -> Result<Flattened, FlattenError> {
    let mut text = String::new();
    let mut ledger = OffsetLedger::new();
    let mut position = 0usize;

    for (index, node) in preorder(root).enumerate() {
        let Some(id) = node.id() else {
            return Err(FlattenError::MissingIdentity {
                tag: node.tag().to_string(),
                index,
            });
        };
        let Some(readable) = resolve(node) else {
            continue;
        };

        let header_len = char_len(&readable.header);
        let body_len = char_len(&readable.body);
        let body_start = position + header_len;
        let body_end = body_start + body_len;
        text.push_str(&readable.header);
        text.push_str(&readable.body);
        ledger.push(
            id.to_string(),
            OffsetEntry {
                header_len,
                body_start,
                body_end,
                source: readable.source,
            },
        );
        position = body_end;
    }

    log::debug!(
        target: "script.flatten",
        "flattened {} readable nodes into {position} chars",
        ledger.len()
    );
    Ok(Flattened { text, ledger })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::readable::BodySource;
    use crate::traverse::{BatchSerial, assign_ids};

    fn script() -> Node {
        let mut root = Node::new("cscr")
            .with_child(Node::new("title").with_text("Untitled"))
            .with_child(
                Node::new("transition")
                    .with_attr("desc", "Fade In")
                    .with_attr("readable", "_tag_desc"),
            )
            .with_child(
                Node::new("monologue")
                    .with_attr("desc", "Intro")
                    .with_attr("readable", "_tag_desc_body")
                    .with_text("Hello"),
            )
            .with_child(Node::new("section").with_child(
                Node::new("clip").with_attr("readable", "Cold open").with_text("ignored"),
            ));
        assign_ids(&mut root, BatchSerial::fixed(1));
        root
    }

    #[test]
    fn flattens_in_document_order() {
        let flat = flatten(&script()).expect("ids assigned");
        assert_eq!(
            flat.text,
            "[Transition - Fade In]\n\n[Monologue - Intro]\n\nHello\n\nCold open\n"
        );
        let entries: Vec<(&str, OffsetEntry)> =
            flat.ledger.iter().map(|(id, e)| (id, *e)).collect();
        assert_eq!(
            entries,
            vec![
                (
                    "transition2-1",
                    OffsetEntry {
                        header_len: 24,
                        body_start: 24,
                        body_end: 24,
                        source: BodySource::None
                    }
                ),
                (
                    "monologue3-1",
                    OffsetEntry {
                        header_len: 21,
                        body_start: 45,
                        body_end: 52,
                        source: BodySource::Text
                    }
                ),
                (
                    "clip5-1",
                    OffsetEntry {
                        header_len: 0,
                        body_start: 52,
                        body_end: 62,
                        source: BodySource::Literal
                    }
                ),
            ]
        );
    }

    #[test]
    fn ledger_reconstructs_flat_text() {
        let flat = flatten(&script()).expect("ids assigned");
        assert_eq!(flat.ledger.reconstruct(&flat.text), Some(flat.text.clone()));
    }

    #[test]
    fn flatten_is_deterministic() {
        let root = script();
        assert_eq!(flatten(&root), flatten(&root));
    }

    #[test]
    fn missing_id_aborts() {
        let root = Node::new("cscr")
            .with_attr("id", "root")
            .with_child(Node::new("monologue").with_attr("readable", "_body"));
        assert_eq!(
            flatten(&root),
            Err(FlattenError::MissingIdentity {
                tag: "monologue".into(),
                index: 1
            })
        );
    }

    #[test]
    fn offsets_count_chars_not_bytes() {
        let mut root = Node::new("monologue")
            .with_attr("desc", "Café")
            .with_attr("readable", "_desc_body")
            .with_text("Ünïcødé 😊");
        assign_ids(&mut root, BatchSerial::fixed(0));
        let flat = flatten(&root).expect("ids assigned");
        let (_, entry) = flat.ledger.iter().next().expect("one entry");
        assert_eq!(entry.header_len, 8);
        assert_eq!(entry.body_range(), 8..19);
        assert_eq!(tools::slice_chars(&flat.text, 8, 19), Some("Ünïcødé 😊\n\n"));
    }
}
