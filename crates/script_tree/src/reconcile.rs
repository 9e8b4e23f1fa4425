//! Write coalesced text edits back into the tree without re-flattening.

use crate::error::EditError;
use crate::ledger::{OffsetEntry, OffsetLedger};
use crate::readable::BodySource;
use crate::traverse::find_node_by_id_mut;
use crate::types::{Node, READABLE_ATTR};
use tools::slice_chars;

/// What a successful edit changed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EditOutcome {
    pub node_id: String,
    /// The node's new content, without the body separator.
    pub text: String,
    pub span: OffsetEntry,
}

/// Apply one coalesced edit of the flat text.
///
/// `last_cursor` and `new_cursor` bracket the edit in the buffer before and
/// after it happened; their difference is the net change in length.
/// `full_text` is the whole buffer after the edit. The body that owns
/// `last_cursor` absorbs the change, every later span shifts, and the edited
/// body is written back into its node. A rejected edit changes nothing.
pub fn apply_edit(
    root: &mut Node,
    ledger: &mut OffsetLedger,
    last_cursor: usize,
    new_cursor: usize,
    full_text: &str,
) -> Result<EditOutcome, EditError> {
    let reject = EditError::NoTargetSection {
        position: last_cursor,
    };
    let index = ledger.locate(last_cursor, new_cursor)?;
    let (node_id, entry) = ledger
        .iter()
        .nth(index)
        .map(|(id, e)| (id.to_string(), *e))
        .ok_or(reject.clone())?;
    let delta = new_cursor as isize - last_cursor as isize;
    let new_end = entry.body_end.saturating_add_signed(delta);

    let Some(body) = slice_chars(full_text, entry.body_start, new_end) else {
        log::debug!(
            target: "script.reconcile",
            "span {}..{new_end} of {node_id} is outside the edited text",
            entry.body_start
        );
        return Err(reject);
    };
    let content = strip_separator(body, entry.source).to_string();
    let Some(node) = find_node_by_id_mut(root, &node_id) else {
        log::warn!(target: "script.reconcile", "ledger names {node_id}, which is not in the tree");
        return Err(reject);
    };

    match entry.source {
        BodySource::Literal => {
            if content.starts_with('_') {
                log::warn!(
                    target: "script.reconcile",
                    "caption of {node_id} now reads as readable instructions"
                );
            }
            node.set_attr(READABLE_ATTR.to_string(), content.clone());
        }
        BodySource::Text | BodySource::None => node.set_text(Some(content.clone())),
    }

    let span = ledger.apply_delta(last_cursor, new_cursor)?;
    Ok(EditOutcome {
        node_id: span.node_id,
        text: content,
        span: span.entry,
    })
}

/// Drop the separator the flattener appended to a body. If the user already
/// deleted part of it, at most one trailing line break is removed.
fn strip_separator(body: &str, source: BodySource) -> &str {
    let separator = source.separator();
    if separator.is_empty() {
        return body;
    }
    body.strip_suffix(separator)
        .or_else(|| body.strip_suffix('\n'))
        .unwrap_or(body)
}
