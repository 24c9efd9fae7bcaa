//! Distance estimate from a board to the goal.
//!
//! For every label the terminal test checks, take the Manhattan distance
//! between its first cell (row-major) on the board and its first cell in the
//! goal pattern, and sum them. Labels missing from the board contribute zero.
//!
//! The estimate is used as guidance only. Once the search scales it by its
//! weight it is no longer admissible.

use crate::board::Board;
use crate::state::Goal;

/// Sum of reference-cell Manhattan distances over the goal's target labels.
pub fn manhattan(goal: &Goal, board: &Board) -> u32 {
    goal.targets()
        .iter()
        .filter_map(|&(label, (goal_row, goal_col))| {
            board
                .first_cell_of(label)
                .map(|(row, col)| (row - goal_row).unsigned_abs() + (col - goal_col).unsigned_abs())
        })
        .sum()
}
