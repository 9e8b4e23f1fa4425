//! Error types for loading, flattening, editing and mutating scripts.

use crate::version::FormatVersion;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ParseErrorCode {
    UnexpectedEof,
    UnterminatedTag,
    MismatchedEndTag,
    UnmatchedEndTag,
    TextOutsideRoot,
    MultipleRoots,
    MissingRoot,
    TooDeep,
}

/// Structural XML read failure, `position` is a byte offset into the source.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("malformed script at byte {position}: {code:?}")]
pub struct ParseError {
    pub code: ParseErrorCode,
    pub position: usize,
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("could not read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error("incompatible version: {found}. Requires {required} or higher")]
    IncompatibleVersion {
        found: FormatVersion,
        required: FormatVersion,
    },
    #[error("unreadable version attribute {0:?}")]
    InvalidVersion(String),
}

#[derive(Debug, Error)]
pub enum SaveError {
    #[error("could not write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Invariant violations found while flattening. These are programming faults.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum FlattenError {
    #[error("<{tag}> at pre-order index {index} has no id")]
    MissingIdentity { tag: String, index: usize },
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum EditError {
    #[error("edit at {position} does not fall inside any readable body")]
    NoTargetSection { position: usize },
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("element tag is empty")]
    EmptyTag,
    #[error("{0:?} is not a valid element or attribute name")]
    InvalidName(String),
    #[error("<{tag}> requires a `{attribute}` attribute")]
    MissingAttribute {
        tag: &'static str,
        attribute: &'static str,
    },
    #[error("<{tag}> `{attribute}` must be a non-negative integer, got {value:?}")]
    InvalidBound {
        tag: &'static str,
        attribute: &'static str,
        value: String,
    },
    #[error("<{tag}> ends at {end} before it starts at {start}")]
    InvertedBounds {
        tag: &'static str,
        start: u64,
        end: u64,
    },
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum PropertyError {
    #[error("no element with id {0:?}")]
    UnknownNode(String),
    #[error("`{0}` cannot be changed once set")]
    Immutable(String),
    #[error("the root element cannot be removed")]
    RootRemoval,
    #[error("elements cannot nest deeper than {max} levels")]
    TooDeep { max: usize },
    #[error(transparent)]
    Invalid(#[from] ValidationError),
}
