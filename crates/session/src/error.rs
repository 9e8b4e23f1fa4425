use script_tree::{FlattenError, LoadError, PropertyError, SaveError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Load(#[from] LoadError),
    #[error(transparent)]
    Save(#[from] SaveError),
    #[error(transparent)]
    Flatten(#[from] FlattenError),
    #[error(transparent)]
    Property(#[from] PropertyError),
    #[error("change at {position} removing {removed} chars runs past the end of the text ({len} chars)")]
    ChangeOutOfRange {
        position: usize,
        removed: usize,
        len: usize,
    },
}
