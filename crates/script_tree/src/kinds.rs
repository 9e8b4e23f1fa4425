//! Element kinds and per-kind validation.
//!
//! Each known tag maps to a validator through a static lookup table. Unknown tags
//! are accepted as [`ElementKind::Other`] so newer documents still load.

use crate::error::ValidationError;
use crate::tokenizer::is_valid_name;
use crate::types::Node;

pub const SCRIPT_TAG: &str = "cscr";
pub const TITLE_TAG: &str = "title";
pub const TRANSITION_TAG: &str = "transition";
pub const MONOLOGUE_TAG: &str = "monologue";
pub const CLIP_TAG: &str = "clip";

const DEFAULT_CLIP_TITLE: &str = "untitled clip";
const DEFAULT_TITLE: &str = "Untitled";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ElementKind {
    Script,
    Title,
    Transition,
    Monologue,
    Clip,
    Other,
}

type Validator = fn(Vec<(String, String)>, Option<String>) -> Result<Node, ValidationError>;

const KIND_TABLE: &[(&str, ElementKind, Validator)] = &[
    (SCRIPT_TAG, ElementKind::Script, build_script as Validator),
    (TITLE_TAG, ElementKind::Title, build_title as Validator),
    (TRANSITION_TAG, ElementKind::Transition, build_transition as Validator),
    (MONOLOGUE_TAG, ElementKind::Monologue, build_monologue as Validator),
    (CLIP_TAG, ElementKind::Clip, build_clip as Validator),
];

impl ElementKind {
    pub fn of(tag: &str) -> Self {
        KIND_TABLE
            .iter()
            .find(|(name, _, _)| *name == tag)
            .map(|(_, kind, _)| *kind)
            .unwrap_or(ElementKind::Other)
    }
}

/// Build a node of kind `tag` from raw attributes and content, applying the
/// kind's validation rules.
pub fn build_element(
    tag: &str,
    attributes: Vec<(String, String)>,
    content: Option<String>,
) -> Result<Node, ValidationError> {
    if tag.is_empty() {
        return Err(ValidationError::EmptyTag);
    }
    check_name(tag)?;
    for (name, _) in &attributes {
        check_name(name)?;
    }
    match KIND_TABLE.iter().find(|(name, _, _)| *name == tag) {
        Some((_, _, validate)) => validate(attributes, content),
        None => Ok(plain(tag, attributes, content)),
    }
}

fn plain(tag: &str, attributes: Vec<(String, String)>, content: Option<String>) -> Node {
    let mut node = Node::with_attributes(tag, attributes);
    node.set_text(content);
    node
}

fn build_script(
    attributes: Vec<(String, String)>,
    content: Option<String>,
) -> Result<Node, ValidationError> {
    Ok(plain(SCRIPT_TAG, attributes, content))
}

fn build_title(
    attributes: Vec<(String, String)>,
    content: Option<String>,
) -> Result<Node, ValidationError> {
    let content = content
        .filter(|c| !c.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_TITLE.to_string());
    Ok(plain(TITLE_TAG, attributes, Some(content)))
}

fn build_transition(
    attributes: Vec<(String, String)>,
    content: Option<String>,
) -> Result<Node, ValidationError> {
    Ok(plain(TRANSITION_TAG, attributes, content))
}

fn build_monologue(
    attributes: Vec<(String, String)>,
    content: Option<String>,
) -> Result<Node, ValidationError> {
    Ok(plain(MONOLOGUE_TAG, attributes, content))
}

/// Clips reference a span of the video source in milliseconds. The clip
/// title travels as a `title` attribute on creation and is stored as the
/// element text.
fn build_clip(
    mut attributes: Vec<(String, String)>,
    content: Option<String>,
) -> Result<Node, ValidationError> {
    clip_bounds(&attributes)?;

    let title = match attributes.iter().position(|(k, _)| k == "title") {
        Some(pos) => Some(attributes.remove(pos).1),
        None => None,
    };
    let text = title
        .or(content)
        .unwrap_or_else(|| DEFAULT_CLIP_TITLE.to_string());
    Ok(plain(CLIP_TAG, attributes, Some(text)))
}

pub(crate) fn check_name(name: &str) -> Result<(), ValidationError> {
    if is_valid_name(name) {
        Ok(())
    } else {
        Err(ValidationError::InvalidName(name.to_string()))
    }
}

/// Re-check an existing node against its kind's attribute rules.
pub(crate) fn check_node(node: &Node) -> Result<(), ValidationError> {
    match ElementKind::of(node.tag()) {
        ElementKind::Clip => clip_bounds(node.attributes()).map(|_| ()),
        _ => Ok(()),
    }
}

/// Re-check `node` after its `property` changed. Only properties a kind
/// constrains are checked, so a node loaded with a bad bound can still be
/// renamed or retitled.
pub(crate) fn check_property(node: &Node, property: &str) -> Result<(), ValidationError> {
    match (ElementKind::of(node.tag()), property) {
        (ElementKind::Clip, "start" | "end") => check_node(node),
        _ => Ok(()),
    }
}

fn clip_bounds(attributes: &[(String, String)]) -> Result<(u64, u64), ValidationError> {
    let start = bound(attributes, "start")?;
    let end = bound(attributes, "end")?;
    if end < start {
        return Err(ValidationError::InvertedBounds {
            tag: CLIP_TAG,
            start,
            end,
        });
    }
    Ok((start, end))
}

fn bound(attributes: &[(String, String)], name: &'static str) -> Result<u64, ValidationError> {
    let raw = attributes
        .iter()
        .find(|(k, _)| k == name)
        .map(|(_, v)| v.as_str())
        .ok_or(ValidationError::MissingAttribute {
            tag: CLIP_TAG,
            attribute: name,
        })?;
    raw.trim()
        .parse::<u64>()
        .map_err(|_| ValidationError::InvalidBound {
            tag: CLIP_TAG,
            attribute: name,
            value: raw.to_string(),
        })
}
