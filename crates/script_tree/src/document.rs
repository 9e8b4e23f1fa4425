use crate::error::{EditError, FlattenError, LoadError, PropertyError, SaveError};
use crate::flatten::{Flattened, flatten};
use crate::kinds::{
    MONOLOGUE_TAG, SCRIPT_TAG, TITLE_TAG, TRANSITION_TAG, build_element, check_name, check_node,
    check_property,
};
use crate::ledger::OffsetLedger;
use crate::readable::outline_label;
use crate::reconcile::{EditOutcome, apply_edit};
use crate::serialize::to_xml;
use crate::tokenizer::tokenize;
use crate::traverse::{
    BatchSerial, assign_ids, depth_of, find_node_by_id, find_node_by_id_mut, index_tree, preorder,
    remove_node_by_id,
};
use crate::tree_builder::{MAX_DEPTH, build_tree};
use crate::types::{DESC_ATTR, ID_ATTR, Node, READABLE_ATTR};
use crate::version::FormatVersion;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Attribute on the root element carrying the format version.
pub const VERSION_ATTR: &str = "version";
/// Id of the root element in documents created from scratch.
pub const ROOT_ID: &str = "cscr_root";
/// Property name addressing a node's tag.
pub const TAG_PROPERTY: &str = "tag";
/// Property name addressing a node's text.
pub const CONTENT_PROPERTY: &str = "content";

const STARTER_INTRO: &str = "Welcome to Contenta, the wonderful content creation tool for video \
essays and other scripted media.\nDon't mind the dust... We are still putting things into their \
proper places. Feel free to look around, and try to break something.";
const STARTER_CONCLUSION: &str = "We hope this was a rewarding experience. Please come back \
another time to continue your creative journey!";

/// One row of the document outline.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OutlineEntry {
    pub id: String,
    pub label: String,
    pub tag: String,
    /// Nesting below the root, 0 for the root's own children.
    pub depth: usize,
}

/// A loaded `.cscr` script: the root element and everything below it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Script {
    root: Node,
}

impl Script {
    /// Read and parse a script file, requiring the current format version.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        Self::load_requiring(path, FormatVersion::CURRENT)
    }

    pub fn load_requiring(
        path: impl AsRef<Path>,
        required: FormatVersion,
    ) -> Result<Self, LoadError> {
        let path = path.as_ref();
        let xml = fs::read_to_string(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let script = Self::from_xml_with(&xml, required, BatchSerial::now())?;
        log::info!(target: "script.load", "loaded {}", path.display());
        Ok(script)
    }

    pub fn from_xml(xml: &str) -> Result<Self, LoadError> {
        Self::from_xml_with(xml, FormatVersion::CURRENT, BatchSerial::now())
    }

    /// Parse with an explicit id batch serial, for reproducible ids.
    pub fn from_xml_with_serial(xml: &str, serial: BatchSerial) -> Result<Self, LoadError> {
        Self::from_xml_with(xml, FormatVersion::CURRENT, serial)
    }

    /// Parse, gate on `required`, then assign ids to every node lacking one.
    /// Nothing is returned unless all three steps succeed.
    pub fn from_xml_with(
        xml: &str,
        required: FormatVersion,
        serial: BatchSerial,
    ) -> Result<Self, LoadError> {
        let mut root = build_tree(tokenize(xml)?)?;
        if root.tag() != SCRIPT_TAG {
            log::warn!(target: "script.load", "root element is <{}>, expected <{SCRIPT_TAG}>", root.tag());
        }

        let found = match root.attr(VERSION_ATTR) {
            Some(raw) => raw
                .parse::<FormatVersion>()
                .map_err(|_| LoadError::InvalidVersion(raw.to_string()))?,
            None => FormatVersion::UNVERSIONED,
        };
        if !found.satisfies(required) {
            return Err(LoadError::IncompatibleVersion { found, required });
        }

        assign_ids(&mut root, serial);
        for node in preorder(&root) {
            if let Err(err) = check_node(node) {
                log::warn!(target: "script.load", "<{}> {}: {err}", node.tag(), node.id().unwrap_or("?"));
            }
        }
        Ok(Self { root })
    }

    /// The starter document shown when no file is opened.
    pub fn new_empty() -> Self {
        let mut root = Node::new(SCRIPT_TAG)
            .with_attr(VERSION_ATTR, FormatVersion::CURRENT.to_string())
            .with_attr(ID_ATTR, ROOT_ID)
            .with_child(Node::new(TITLE_TAG).with_text("Untitled"))
            .with_child(
                Node::new(TRANSITION_TAG)
                    .with_attr(DESC_ATTR, "Fade In")
                    .with_attr(READABLE_ATTR, "_tag_desc"),
            )
            .with_child(
                Node::new(MONOLOGUE_TAG)
                    .with_attr(DESC_ATTR, "Intro")
                    .with_attr(READABLE_ATTR, "_tag_desc_body")
                    .with_text(STARTER_INTRO),
            )
            .with_child(
                Node::new(MONOLOGUE_TAG)
                    .with_attr(DESC_ATTR, "Conclusion")
                    .with_attr(READABLE_ATTR, "_tag_desc_body")
                    .with_text(STARTER_CONCLUSION),
            );
        assign_ids(&mut root, BatchSerial::now());
        Self { root }
    }

    /// Serialize and write to `path`. The document is written to a sibling
    /// temp file first and renamed into place.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), SaveError> {
        let path = path.as_ref();
        let io_err = |source| SaveError::Io {
            path: path.to_path_buf(),
            source,
        };
        let mut tmp_name = path.as_os_str().to_owned();
        tmp_name.push(".tmp");
        let tmp = Path::new(&tmp_name);

        fs::write(tmp, self.to_xml()).map_err(io_err)?;
        if let Err(source) = fs::rename(tmp, path) {
            let _ = fs::remove_file(tmp);
            return Err(io_err(source));
        }
        log::info!(target: "script.load", "saved {}", path.display());
        Ok(())
    }

    pub fn to_xml(&self) -> String {
        to_xml(&self.root)
    }

    pub fn root(&self) -> &Node {
        &self.root
    }

    pub fn flatten(&self) -> Result<Flattened, FlattenError> {
        flatten(&self.root)
    }

    /// Reconcile one coalesced edit of this script's flat text, see
    /// [`crate::apply_edit`].
    pub fn apply_edit(
        &mut self,
        ledger: &mut OffsetLedger,
        last_cursor: usize,
        new_cursor: usize,
        full_text: &str,
    ) -> Result<EditOutcome, EditError> {
        apply_edit(&mut self.root, ledger, last_cursor, new_cursor, full_text)
    }

    /// The document's declared format version; `0.0` when absent or unreadable.
    pub fn version(&self) -> FormatVersion {
        self.root
            .attr(VERSION_ATTR)
            .and_then(|v| v.parse().ok())
            .unwrap_or(FormatVersion::UNVERSIONED)
    }

    pub fn lookup(&self, id: &str) -> Option<&Node> {
        find_node_by_id(&self.root, id)
    }

    pub fn lookup_mut(&mut self, id: &str) -> Option<&mut Node> {
        find_node_by_id_mut(&mut self.root, id)
    }

    pub fn index(&self) -> HashMap<&str, &Node> {
        index_tree(&self.root)
    }

    /// Read `tag`, `content` or any attribute of the node with `id`.
    pub fn get_property(&self, id: &str, name: &str) -> Result<Option<&str>, PropertyError> {
        let node = self
            .lookup(id)
            .ok_or_else(|| PropertyError::UnknownNode(id.to_string()))?;
        Ok(match name {
            TAG_PROPERTY => Some(node.tag()),
            CONTENT_PROPERTY => node.text(),
            _ => node.attr(name),
        })
    }

    /// Set `content` or an attribute of the node with `id`. The tag and the id
    /// are fixed. Clips are re-checked so their bounds stay valid.
    pub fn set_property(
        &mut self,
        id: &str,
        name: &str,
        value: impl Into<String>,
    ) -> Result<(), PropertyError> {
        if name == TAG_PROPERTY || name == ID_ATTR {
            return Err(PropertyError::Immutable(name.to_string()));
        }
        if name != CONTENT_PROPERTY {
            check_name(name)?;
        }
        let node = self
            .lookup_mut(id)
            .ok_or_else(|| PropertyError::UnknownNode(id.to_string()))?;

        let mut updated = node.clone();
        if name == CONTENT_PROPERTY {
            updated.set_text(Some(value.into()));
        } else {
            updated.set_attr(name.to_string(), value.into());
        }
        check_property(&updated, name)?;
        *node = updated;
        log::debug!(target: "script.load", "set {name} on {id}");
        Ok(())
    }

    /// Create a validated element, append it to `parent_id` and return its new id.
    pub fn add_element(
        &mut self,
        parent_id: &str,
        tag: &str,
        content: Option<String>,
        attributes: Vec<(String, String)>,
    ) -> Result<String, PropertyError> {
        let mut node = build_element(tag, attributes, content)?;
        // ids are always generated for new elements
        node.remove_attr(ID_ATTR);
        let depth = depth_of(&self.root, parent_id)
            .ok_or_else(|| PropertyError::UnknownNode(parent_id.to_string()))?;
        if depth >= MAX_DEPTH {
            return Err(PropertyError::TooDeep { max: MAX_DEPTH });
        }
        let parent = self
            .lookup_mut(parent_id)
            .ok_or_else(|| PropertyError::UnknownNode(parent_id.to_string()))?;
        parent.children_mut().push(node);
        let position = parent.children().len() - 1;

        assign_ids(&mut self.root, BatchSerial::now());
        let id = self
            .lookup(parent_id)
            .and_then(|p| p.children().get(position))
            .and_then(Node::id)
            .map(str::to_string)
            .ok_or_else(|| PropertyError::UnknownNode(parent_id.to_string()))?;
        log::debug!(target: "script.load", "added <{tag}> {id} under {parent_id}");
        Ok(id)
    }

    /// Remove the node with `id` and its subtree.
    pub fn drop_element(&mut self, id: &str) -> Result<Node, PropertyError> {
        if self.root.id() == Some(id) {
            return Err(PropertyError::RootRemoval);
        }
        let removed = remove_node_by_id(&mut self.root, id)
            .ok_or_else(|| PropertyError::UnknownNode(id.to_string()))?;
        log::debug!(target: "script.load", "dropped <{}> {id}", removed.tag());
        Ok(removed)
    }

    pub fn title(&self) -> Option<&str> {
        self.root
            .children()
            .iter()
            .find(|c| c.tag() == TITLE_TAG)
            .and_then(Node::text)
    }

    /// Change the title, creating the title element if the document has none.
    pub fn set_title(&mut self, title: impl Into<String>) {
        let title = title.into();
        let children = self.root.children_mut();
        match children.iter_mut().find(|c| c.tag() == TITLE_TAG) {
            Some(node) => node.set_text(Some(title)),
            None => {
                children.insert(0, Node::new(TITLE_TAG).with_text(title));
                assign_ids(&mut self.root, BatchSerial::now());
            }
        }
    }

    /// Everything below the root except title elements, in document order.
    pub fn outline(&self) -> Vec<OutlineEntry> {
        fn walk(node: &Node, depth: usize, out: &mut Vec<OutlineEntry>) {
            for child in node.children() {
                if child.tag() == TITLE_TAG {
                    continue;
                }
                out.push(OutlineEntry {
                    id: child.id().unwrap_or_default().to_string(),
                    label: outline_label(child),
                    tag: child.tag().to_string(),
                    depth,
                });
                walk(child, depth + 1, out);
            }
        }

        let mut out = Vec::new();
        walk(&self.root, 0, &mut out);
        out
    }
}

impl Default for Script {
    fn default() -> Self {
        Self::new_empty()
    }
}
