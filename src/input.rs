//! Pointer-drag to move translation for a rendering front end.
//!
//! A front end draws the board as square cells and reports a drag as two
//! pixel positions. The drag's dominant axis and sign pick the direction, the
//! start position picks the block, and short drags are ignored.

use crate::board::{Board, Label};
use crate::state::Action;

/// Drags shorter than this (in pixels, along the dominant axis) are ignored.
pub const DEFAULT_DRAG_THRESHOLD: f32 = 40.0;

/// A pointer drag in pixel space, `x` to the right and `y` down.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DragGesture {
    pub start: (f32, f32),
    pub end: (f32, f32),
}

/// Maps a pixel position to a (row, col) cell, if it lies on the board.
pub fn pixel_to_cell(board: &Board, cell_size: f32, (x, y): (f32, f32)) -> Option<(usize, usize)> {
    if cell_size <= 0.0 || x < 0.0 || y < 0.0 {
        return None;
    }
    let col = (x / cell_size) as usize;
    let row = (y / cell_size) as usize;
    (row < board.rows() && col < board.cols()).then_some((row, col))
}

/// Unit direction (dr, dc) of a drag, or `None` when it is too short.
pub fn drag_direction(gesture: &DragGesture, threshold: f32) -> Option<(i32, i32)> {
    let dx = gesture.end.0 - gesture.start.0;
    let dy = gesture.end.1 - gesture.start.1;

    if dx.abs() > dy.abs() {
        (dx.abs() > threshold).then(|| (0, dx.signum() as i32))
    } else {
        (dy.abs() > threshold).then(|| (dy.signum() as i32, 0))
    }
}

/// Turns a drag into the slide it requests: the block under the drag's start
/// point, moved one cell along the drag's dominant axis.
///
/// Returns `None` for short drags, drags starting off the board or on an
/// empty cell. Legality of the slide itself is left to `Puzzle::apply_move`.
pub fn drag_to_move(
    board: &Board,
    empty: Label,
    cell_size: f32,
    threshold: f32,
    gesture: &DragGesture,
) -> Option<Action> {
    let (dr, dc) = drag_direction(gesture, threshold)?;
    let (row, col) = pixel_to_cell(board, cell_size, gesture.start)?;
    let label = board[(row, col)];
    (label != empty).then_some(Action::new(label, dr, dc))
}
