//! Errors surfaced by the response engine.

use st_blocks::BlockError;
use st_core::CoreError;
use st_layout::LayoutError;
use thiserror::Error;

pub type ResponseResult<T> = Result<T, ResponseError>;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ResponseError {
    /// An imported plant grid cannot be reconciled with the working grid.
    /// The store is left untouched.
    #[error(
        "{plant} response {source_path} does not overlap or exactly match the working frequencies"
    )]
    FrequencyIncompatible {
        plant: &'static str,
        source_path: String,
    },

    #[error("No {what} response available")]
    MissingResponse { what: &'static str },

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Block(#[from] BlockError),

    #[error(transparent)]
    Layout(#[from] LayoutError),
}
