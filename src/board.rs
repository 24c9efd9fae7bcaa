//! Board representation for sliding-block puzzles.
//!
//! The board is a flat row-major array of cell labels. One label is reserved
//! for empty cells; every other label names the block covering that cell.

use std::fmt;
use std::ops::Index;

use crate::error::PuzzleError;
use crate::geometry::Coord;

/// A cell label: either the puzzle's empty label or a block identifier.
pub type Label = u8;

/// A fixed-size grid of cell labels.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Board {
    rows: usize,
    cols: usize,
    cells: Vec<Label>,
}

/// Converts (row, col) coordinates to a linear cell index.
#[inline(always)]
pub const fn coord_to_idx(cols: usize, row: usize, col: usize) -> usize {
    row * cols + col
}

/// Converts a linear cell index to (row, col) coordinates.
#[inline(always)]
pub const fn idx_to_coord(cols: usize, cell_index: usize) -> Coord {
    ((cell_index / cols) as i32, (cell_index % cols) as i32)
}

impl Board {
    /// Builds a board from rows of labels, rejecting empty or ragged input.
    pub fn new(rows: Vec<Vec<Label>>) -> Result<Self, PuzzleError> {
        let cols = rows.first().map_or(0, Vec::len);
        if rows.is_empty() || cols == 0 {
            return Err(PuzzleError::EmptyBoard);
        }

        let mut cells = Vec::with_capacity(rows.len() * cols);
        for (row, values) in rows.iter().enumerate() {
            if values.len() != cols {
                return Err(PuzzleError::RaggedRow {
                    row,
                    expected: cols,
                    found: values.len(),
                });
            }
            cells.extend_from_slice(values);
        }

        Ok(Self {
            rows: rows.len(),
            cols,
            cells,
        })
    }

    /// Builds a board from a row-major cell slice of known dimensions.
    pub(crate) fn from_cells(rows: usize, cols: usize, cells: Vec<Label>) -> Self {
        debug_assert_eq!(rows * cols, cells.len());
        Self { rows, cols, cells }
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// (rows, cols)
    #[inline]
    pub fn dims(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    /// Row-major view of every cell.
    #[inline]
    pub fn cells(&self) -> &[Label] {
        &self.cells
    }

    /// Returns the label at `(row, col)`, or `None` when out of bounds.
    pub fn get(&self, row: usize, col: usize) -> Option<Label> {
        (row < self.rows && col < self.cols).then(|| self.cells[coord_to_idx(self.cols, row, col)])
    }

    /// Linear index of a signed coordinate, or `None` when it falls off the board.
    #[inline]
    pub fn index_of(&self, (row, col): Coord) -> Option<usize> {
        if row < 0 || col < 0 || row as usize >= self.rows || col as usize >= self.cols {
            None
        } else {
            Some(coord_to_idx(self.cols, row as usize, col as usize))
        }
    }

    /// Copies the board back out as nested rows.
    pub fn to_rows(&self) -> Vec<Vec<Label>> {
        self.cells.chunks(self.cols).map(<[Label]>::to_vec).collect()
    }

    /// Cell indices occupied by `label`, in row-major order.
    pub fn cells_of(&self, label: Label) -> Vec<usize> {
        self.cells
            .iter()
            .enumerate()
            .filter(|&(_, &cell)| cell == label)
            .map(|(idx, _)| idx)
            .collect()
    }

    /// First cell (row-major) holding `label`.
    pub fn first_cell_of(&self, label: Label) -> Option<Coord> {
        self.cells
            .iter()
            .position(|&cell| cell == label)
            .map(|idx| idx_to_coord(self.cols, idx))
    }

    /// Sorted multiset of non-empty labels, one entry per occupied cell.
    pub fn label_multiset(&self, empty: Label) -> Vec<Label> {
        let mut labels: Vec<Label> = self.cells.iter().copied().filter(|&l| l != empty).collect();
        labels.sort_unstable();
        labels
    }
}

impl Index<(usize, usize)> for Board {
    type Output = Label;

    fn index(&self, (row, col): (usize, usize)) -> &Label {
        &self.cells[coord_to_idx(self.cols, row, col)]
    }
}

/// Formats a board as a human-readable grid.
///
/// Labels are right-aligned to the widest label; empty cells show as '.'.
pub fn format_board(board: &Board, empty: Label) -> String {
    let width = board
        .cells
        .iter()
        .filter(|&&label| label != empty)
        .map(|label| label.to_string().len())
        .max()
        .unwrap_or(1);

    let mut output = String::new();
    for row in board.cells.chunks(board.cols) {
        let line: Vec<String> = row
            .iter()
            .map(|&label| {
                if label == empty {
                    format!("{:>width$}", '.')
                } else {
                    format!("{:>width$}", label)
                }
            })
            .collect();
        output.push_str(&line.join(" "));
        output.push('\n');
    }

    output
}

impl fmt::Display for Board {
    /// Plain rendering with every label printed, including empty ones.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.cells.chunks(self.cols) {
            let line: Vec<String> = row.iter().map(Label::to_string).collect();
            writeln!(f, "{}", line.join(" "))?;
        }
        Ok(())
    }
}
