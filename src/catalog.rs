//! Block catalog and shape canonicalization.
//!
//! Built once from the initial board. Every block's shape is its cell set
//! normalized to the bounding-box origin; blocks with identical shapes share
//! one canonical class. Rewriting a board through the label→class table gives
//! a signature in which same-shaped blocks are interchangeable, so boards that
//! only permute those blocks collapse into one search node.

use rustc_hash::FxHashMap;

use crate::board::{idx_to_coord, Board, Label};
use crate::error::PuzzleError;
use crate::geometry::{count_regions, normalize_to_origin, Coord};

/// Number of distinct label values.
const LABEL_SPACE: usize = Label::MAX as usize + 1;

/// One block of the initial board.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BlockInfo {
    pub label: Label,
    /// Cell offsets relative to the block's bounding-box origin, sorted.
    pub shape: Vec<Coord>,
    /// Canonical class shared by every block with this shape.
    pub class: Label,
}

impl BlockInfo {
    #[inline]
    pub fn cell_count(&self) -> usize {
        self.shape.len()
    }
}

/// Immutable catalog of the blocks on a puzzle's board.
#[derive(Clone, Debug)]
pub struct BlockCatalog {
    empty: Label,
    /// Blocks in ascending label order.
    blocks: Vec<BlockInfo>,
    /// label → canonical class. The empty label maps to itself.
    class_of: [Label; LABEL_SPACE],
    /// label → position in `blocks`.
    slot_of: [Option<u8>; LABEL_SPACE],
}

impl BlockCatalog {
    /// Builds the catalog from an initial board.
    ///
    /// Fails if a block's cells are not one connected region.
    pub fn build(board: &Board, empty: Label) -> Result<Self, PuzzleError> {
        let mut cells_by_label: FxHashMap<Label, Vec<Coord>> = FxHashMap::default();
        for (idx, &label) in board.cells().iter().enumerate() {
            if label != empty {
                cells_by_label
                    .entry(label)
                    .or_default()
                    .push(idx_to_coord(board.cols(), idx));
            }
        }

        let mut labels: Vec<Label> = cells_by_label.keys().copied().collect();
        labels.sort_unstable();

        let mut class_of = [0; LABEL_SPACE];
        for (label, class) in class_of.iter_mut().enumerate() {
            *class = label as Label;
        }
        let mut slot_of = [None; LABEL_SPACE];

        let mut class_by_shape: FxHashMap<Vec<Coord>, Label> = FxHashMap::default();
        let mut next_class = ClassIds::new(empty);
        let mut blocks = Vec::with_capacity(labels.len());

        for label in labels {
            let cells = cells_by_label.remove(&label).unwrap_or_default();
            let regions = count_regions(&cells);
            if regions != 1 {
                return Err(PuzzleError::DisconnectedBlock { label, regions });
            }

            let shape = normalize_to_origin(cells);
            let class = *class_by_shape
                .entry(shape.clone())
                .or_insert_with(|| next_class.next());

            class_of[label as usize] = class;
            slot_of[label as usize] = Some(blocks.len() as u8);
            blocks.push(BlockInfo {
                label,
                shape,
                class,
            });
        }

        if class_of[empty as usize] != empty {
            return Err(PuzzleError::EmptyLabelClassified(empty));
        }

        Ok(Self {
            empty,
            blocks,
            class_of,
            slot_of,
        })
    }

    #[inline]
    pub fn empty(&self) -> Label {
        self.empty
    }

    /// Blocks in catalog (ascending label) order.
    #[inline]
    pub fn blocks(&self) -> &[BlockInfo] {
        &self.blocks
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Canonical class of a label. The empty label maps to itself.
    #[inline]
    pub fn class_of(&self, label: Label) -> Label {
        self.class_of[label as usize]
    }

    /// Catalog position of a block label, if the label is a block.
    #[inline]
    pub fn slot_of(&self, label: Label) -> Option<usize> {
        self.slot_of[label as usize].map(usize::from)
    }

    pub fn get(&self, label: Label) -> Option<&BlockInfo> {
        self.slot_of(label).map(|slot| &self.blocks[slot])
    }

    /// Number of distinct canonical classes.
    pub fn class_count(&self) -> usize {
        let mut classes: Vec<Label> = self.blocks.iter().map(|b| b.class).collect();
        classes.sort_unstable();
        classes.dedup();
        classes.len()
    }

    /// Rewrites every cell of `board` through the label→class table.
    pub fn signature(&self, board: &Board) -> Box<[Label]> {
        board
            .cells()
            .iter()
            .map(|&label| self.class_of[label as usize])
            .collect()
    }
}

/// Hands out canonical class ids in increasing order, skipping the empty label.
struct ClassIds {
    empty: Label,
    next: Label,
}

impl ClassIds {
    fn new(empty: Label) -> Self {
        Self { empty, next: 0 }
    }

    fn next(&mut self) -> Label {
        if self.next == self.empty {
            self.next = self.next.wrapping_add(1);
        }
        let id = self.next;
        self.next = self.next.wrapping_add(1);
        id
    }
}

/// Lists blocks with their cell counts and classes, one per line.
pub fn format_catalog(catalog: &BlockCatalog) -> String {
    let mut output = String::new();
    for block in catalog.blocks() {
        output.push_str(&format!(
            "block {:>3}: {} cells, class {}\n",
            block.label,
            block.cell_count(),
            block.class
        ));
    }
    output
}
