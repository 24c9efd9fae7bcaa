//! Built-in puzzle layouts.
//!
//! Each layout is a 5x4 or 5x5 board with 0 as the empty label. Block labels
//! are arbitrary; only their shapes matter to the search.

use crate::board::Label;
use crate::error::PuzzleError;
use crate::puzzle::{new_puzzle, Puzzle};

/// A named board and goal pattern.
pub struct Preset {
    pub name: &'static str,
    pub description: &'static str,
    pub board: &'static [&'static [Label]],
    pub goal: &'static [&'static [Label]],
}

impl Preset {
    /// Builds a fresh puzzle for this layout.
    pub fn puzzle(&self) -> Result<Puzzle, PuzzleError> {
        new_puzzle(to_rows(self.board), to_rows(self.goal), 0)
    }
}

fn to_rows(grid: &[&[Label]]) -> Vec<Vec<Label>> {
    grid.iter().map(|row| row.to_vec()).collect()
}

/// The big square has to reach the bottom-centre exit.
const EXIT_GOAL: &[&[Label]] = &[
    &[0, 0, 0, 0],
    &[0, 0, 0, 0],
    &[0, 0, 0, 0],
    &[0, 1, 1, 0],
    &[0, 1, 1, 0],
];

/// Four vertical dominoes, one horizontal, four unit squares.
pub const CLASSIC: Preset = Preset {
    name: "classic",
    description: "four vertical dominoes around a horizontal one",
    board: &[
        &[10, 1, 1, 2],
        &[10, 1, 1, 2],
        &[3, 4, 4, 5],
        &[3, 6, 7, 5],
        &[8, 0, 0, 9],
    ],
    goal: EXIT_GOAL,
};

/// Horizontal dominoes stacked under the big square.
pub const STACKED: Preset = Preset {
    name: "stacked",
    description: "horizontal dominoes stacked under the big square",
    board: &[
        &[10, 1, 1, 2],
        &[3, 1, 1, 4],
        &[3, 5, 5, 4],
        &[6, 7, 7, 8],
        &[0, 9, 9, 0],
    ],
    goal: EXIT_GOAL,
};

/// The big square is sealed inside a rigid frame: unsolvable.
pub const BOXED: Preset = Preset {
    name: "boxed",
    description: "big square sealed inside a frame (no solution)",
    board: &[
        &[9, 9, 9, 9, 0],
        &[9, 1, 1, 9, 0],
        &[9, 1, 1, 9, 0],
        &[9, 9, 9, 9, 0],
        &[0, 0, 0, 0, 5],
    ],
    goal: &[
        &[0, 0, 0, 0, 0],
        &[0, 0, 0, 0, 0],
        &[0, 0, 0, 0, 0],
        &[0, 1, 1, 0, 0],
        &[0, 1, 1, 0, 0],
    ],
};

/// All built-in layouts.
pub const PRESETS: &[Preset] = &[CLASSIC, STACKED, BOXED];

/// Looks up a preset by name.
pub fn find(name: &str) -> Option<&'static Preset> {
    PRESETS.iter().find(|preset| preset.name == name)
}
