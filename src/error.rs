//! Error types for puzzle construction, file loading and the solver bridge.

use thiserror::Error;

use crate::board::Label;

/// Reasons a puzzle definition is rejected at construction.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PuzzleError {
    /// The board (or goal pattern) has no rows or no columns.
    #[error("board has no cells")]
    EmptyBoard,
    /// A row's length differs from the first row's.
    #[error("row {row} has {found} cells, expected {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        found: usize,
    },
    /// Board and goal pattern dimensions differ.
    #[error("board is {}x{} but goal pattern is {}x{}", .board.0, .board.1, .goal.0, .goal.1)]
    ShapeMismatch {
        board: (usize, usize),
        goal: (usize, usize),
    },
    /// A label's cells do not form a single 4-connected region.
    #[error("block {label} is split into {regions} disconnected regions")]
    DisconnectedBlock { label: Label, regions: usize },
    /// The empty label ended up with a canonical class of its own.
    ///
    /// Checked after the catalog is built. Class ids skip the empty label,
    /// so a well-formed build never returns this.
    #[error("empty label {0} cannot be assigned a block class")]
    EmptyLabelClassified(Label),
}

/// Errors from reading puzzle or solution files.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("line {line}: {message}")]
    Parse { line: usize, message: String },
    #[error("invalid puzzle: {0}")]
    Puzzle(#[from] PuzzleError),
}

impl LoadError {
    pub(crate) fn parse(line: usize, message: impl Into<String>) -> Self {
        LoadError::Parse {
            line,
            message: message.into(),
        }
    }
}

/// Failures of an alternate solver. All of them are recovered by falling back
/// to the built-in engine.
#[derive(Error, Debug)]
pub enum BridgeError {
    /// The alternate implementation cannot be reached (missing executable...).
    #[error("alternate solver unavailable: {0}")]
    Unavailable(String),
    /// The alternate ran but reported a failure.
    #[error("alternate solver failed: {0}")]
    Failed(String),
    /// The alternate's reply could not be decoded.
    #[error("malformed alternate solver reply: {0}")]
    Protocol(#[from] serde_json::Error),
}
