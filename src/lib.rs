//! Sliding-Block Puzzle Solver Library
//!
//! Models Klotski-style puzzles (rigid rectilinear blocks sliding one cell at
//! a time on a fixed grid) and searches for a short sequence of slides that
//! brings the board into a goal pattern with weighted A*.

pub mod board;
pub mod bridge;
pub mod catalog;
pub mod error;
pub mod geometry;
pub mod heuristic;
pub mod input;
pub mod persistence;
pub mod presets;
pub mod puzzle;
pub mod solver;
pub mod state;

pub use board::{Board, Label};
pub use bridge::{AlternateLimits, AlternateOutcome, AlternateSolver, ExternalSolver};
pub use error::{BridgeError, LoadError, PuzzleError};
pub use puzzle::{new_puzzle, Backend, Puzzle, SolutionResult, SolveReport};
pub use solver::{AbortReason, CancelToken, SearchStats, SolveConfig};
pub use state::{Action, State};
