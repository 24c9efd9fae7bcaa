//! Search states, unit slides and move generation.
//!
//! A [`State`] is a board snapshot plus its canonical signature. Equality and
//! hashing look only at the signature, so boards that differ by which of two
//! same-shaped blocks sits where are the same state.

use std::fmt;
use std::hash::{Hash, Hasher};

use crate::board::{idx_to_coord, Board, Label};
use crate::catalog::BlockCatalog;
use crate::error::PuzzleError;
use crate::geometry::{is_unit_step, Coord, DIRECTIONS};

/// A single unit slide of one block.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Action {
    pub label: Label,
    pub dr: i32,
    pub dc: i32,
}

impl Action {
    pub const fn new(label: Label, dr: i32, dc: i32) -> Self {
        Self { label, dr, dc }
    }

    /// The slide that undoes this one.
    pub const fn inverse(self) -> Self {
        Self::new(self.label, -self.dr, -self.dc)
    }

    pub fn direction_name(&self) -> &'static str {
        match (self.dr, self.dc) {
            (0, -1) => "left",
            (0, 1) => "right",
            (-1, 0) => "up",
            (1, 0) => "down",
            _ => "invalid",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.label, self.direction_name())
    }
}

/// Goal pattern plus the cells the terminal test examines.
#[derive(Clone, Debug)]
pub struct Goal {
    pattern: Board,
    /// Indices of cells whose goal label is not empty.
    region: Vec<usize>,
    /// Distinct goal labels inside the region, each with its first cell.
    targets: Vec<(Label, Coord)>,
}

impl Goal {
    pub fn new(pattern: Board, empty: Label) -> Self {
        let region: Vec<usize> = pattern
            .cells()
            .iter()
            .enumerate()
            .filter(|&(_, &label)| label != empty)
            .map(|(idx, _)| idx)
            .collect();

        let mut targets: Vec<(Label, Coord)> = Vec::new();
        for &idx in &region {
            let label = pattern.cells()[idx];
            if !targets.iter().any(|&(seen, _)| seen == label) {
                if let Some(cell) = pattern.first_cell_of(label) {
                    targets.push((label, cell));
                }
            }
        }

        Self {
            pattern,
            region,
            targets,
        }
    }

    #[inline]
    pub fn pattern(&self) -> &Board {
        &self.pattern
    }

    /// Cell indices inside the goal region mask.
    #[inline]
    pub fn region(&self) -> &[usize] {
        &self.region
    }

    /// Labels the terminal test checks, with their reference cell in the pattern.
    #[inline]
    pub fn targets(&self) -> &[(Label, Coord)] {
        &self.targets
    }

    /// Whether every masked cell of `board` matches the pattern.
    pub fn is_satisfied_by(&self, board: &Board) -> bool {
        let pattern = self.pattern.cells();
        let cells = board.cells();
        self.region.iter().all(|&idx| cells[idx] == pattern[idx])
    }
}

/// Everything derived once from a puzzle definition and shared by all states.
#[derive(Clone, Debug)]
pub struct Rules {
    empty: Label,
    catalog: BlockCatalog,
    goal: Goal,
}

impl Rules {
    /// Validates a puzzle definition and derives its catalog and goal mask.
    pub fn new(board: &Board, goal_pattern: Board, empty: Label) -> Result<Self, PuzzleError> {
        if board.dims() != goal_pattern.dims() {
            return Err(PuzzleError::ShapeMismatch {
                board: board.dims(),
                goal: goal_pattern.dims(),
            });
        }

        let catalog = BlockCatalog::build(board, empty)?;
        Ok(Self {
            empty,
            catalog,
            goal: Goal::new(goal_pattern, empty),
        })
    }

    #[inline]
    pub fn empty(&self) -> Label {
        self.empty
    }

    #[inline]
    pub fn catalog(&self) -> &BlockCatalog {
        &self.catalog
    }

    #[inline]
    pub fn goal(&self) -> &Goal {
        &self.goal
    }
}

/// A board snapshot and its canonical signature. Never mutated once built.
#[derive(Clone, Debug)]
pub struct State {
    board: Board,
    signature: Box<[Label]>,
}

impl State {
    pub fn new(rules: &Rules, board: Board) -> Self {
        let signature = rules.catalog.signature(&board);
        Self { board, signature }
    }

    #[inline]
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Canonical-pattern grid, row-major.
    #[inline]
    pub fn signature(&self) -> &[Label] {
        &self.signature
    }

    pub fn is_terminal(&self, rules: &Rules) -> bool {
        rules.goal.is_satisfied_by(&self.board)
    }

    /// Slides `label` one cell by `(dr, dc)`.
    ///
    /// Returns `None` when the slide is not legal: unknown label, not a unit
    /// step, off the board, or blocked by another block.
    pub fn slide(&self, rules: &Rules, label: Label, dr: i32, dc: i32) -> Option<State> {
        if label == rules.empty || !is_unit_step(dr, dc) {
            return None;
        }
        let cells = self.board.cells_of(label);
        if cells.is_empty() {
            return None;
        }
        self.slide_cells(rules, label, &cells, dr, dc)
    }

    /// Slide with the block's current cells already known.
    fn slide_cells(
        &self,
        rules: &Rules,
        label: Label,
        cells: &[usize],
        dr: i32,
        dc: i32,
    ) -> Option<State> {
        let cols = self.board.cols();
        let current = self.board.cells();

        let mut destinations = Vec::with_capacity(cells.len());
        for &idx in cells {
            let (row, col) = idx_to_coord(cols, idx);
            let dest = self.board.index_of((row + dr, col + dc))?;
            // the block's own cells count as free: the whole block moves at once
            if current[dest] != rules.empty && current[dest] != label {
                return None;
            }
            destinations.push(dest);
        }

        let mut next = current.to_vec();
        for &idx in cells {
            next[idx] = rules.empty;
        }
        for &dest in &destinations {
            next[dest] = label;
        }

        let board = Board::from_cells(self.board.rows(), cols, next);
        Some(State::new(rules, board))
    }

    /// Cell indices of every catalogued block, indexed by catalog slot.
    fn block_positions(&self, catalog: &BlockCatalog) -> Vec<Vec<usize>> {
        let mut positions: Vec<Vec<usize>> = catalog
            .blocks()
            .iter()
            .map(|block| Vec::with_capacity(block.cell_count()))
            .collect();
        for (idx, &label) in self.board.cells().iter().enumerate() {
            if let Some(slot) = catalog.slot_of(label) {
                positions[slot].push(idx);
            }
        }
        positions
    }

    /// Lazily yields every legal slide from this state.
    ///
    /// Blocks come in catalog order, directions in [`DIRECTIONS`] order.
    pub fn enumerate_moves<'a>(
        &'a self,
        rules: &'a Rules,
    ) -> impl Iterator<Item = (Action, State)> + 'a {
        let positions = self.block_positions(&rules.catalog);
        rules
            .catalog
            .blocks()
            .iter()
            .zip(positions)
            .flat_map(move |(block, cells)| {
                let label = block.label;
                DIRECTIONS.into_iter().filter_map(move |(dr, dc)| {
                    self.slide_cells(rules, label, &cells, dr, dc)
                        .map(|next| (Action::new(label, dr, dc), next))
                })
            })
    }
}

impl PartialEq for State {
    fn eq(&self, other: &Self) -> bool {
        self.signature == other.signature
    }
}

impl Eq for State {}

impl Hash for State {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.signature.hash(state);
    }
}
