//! Structural errors for the block layout.

use st_blocks::{LoopKind, NodeKind};
use thiserror::Error;

pub type LayoutResult<T> = Result<T, LayoutError>;

/// A malformed or inconsistent topology. None of these can occur for a tree
/// built from the stock loop types; infallible accessors panic on them.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LayoutError {
    #[error("{kind} has no children")]
    MissingChildren { kind: LoopKind },

    #[error("{what} not found in layout")]
    NotFound { what: NodeKind },

    #[error("No loop or block named {name:?}")]
    UnknownName { name: String },

    #[error("{kind} appears more than once in the layout")]
    DuplicateKind { kind: NodeKind },

    #[error("Index entry for {kind} does not reference the tree instance")]
    IdentityMismatch { kind: NodeKind },
}
