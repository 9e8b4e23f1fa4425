pub mod document;
pub mod error;
pub mod flatten;
pub mod kinds;
pub mod ledger;
pub mod readable;
pub mod reconcile;
pub mod traverse;
pub mod version;

mod entities;
mod serialize;
mod tokenizer;
mod tree_builder;
mod types;

pub use document::{OutlineEntry, Script};
pub use error::{
    EditError, FlattenError, LoadError, ParseError, ParseErrorCode, PropertyError, SaveError,
    ValidationError,
};
pub use flatten::{Flattened, flatten};
pub use kinds::{ElementKind, build_element};
pub use ledger::{OffsetEntry, OffsetLedger, ShiftedSpan};
pub use readable::{BodySource, Readable, ReadableSpec, outline_label, resolve};
pub use reconcile::{EditOutcome, apply_edit};
pub use traverse::{BatchSerial, assign_ids, find_node_by_id, preorder};
pub use types::{DESC_ATTR, ID_ATTR, Node, READABLE_ATTR};
pub use version::FormatVersion;

/// Parse `.cscr` XML into a bare tree: no version gate, no id assignment.
pub fn parse_tree(xml: &str) -> Result<Node, ParseError> {
    tree_builder::build_tree(tokenizer::tokenize(xml)?)
}

/// Serialize a tree the way [`Script::save`] writes it.
pub fn tree_to_xml(root: &Node) -> String {
    serialize::to_xml(root)
}
