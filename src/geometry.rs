//! Grid geometry helpers: unit slides, shape normalization and connectivity.
//!
//! Blocks are rigid rectilinear polyominoes. They never rotate, so a shape is
//! simply its set of cells translated to the bounding-box origin.

use rustc_hash::FxHashSet;

/// A (row, col) coordinate. Signed so translations can step off the board.
pub type Coord = (i32, i32);

/// The four unit slides as (row delta, col delta): left, right, up, down.
///
/// Move enumeration walks this order; nothing in the search depends on it.
pub const DIRECTIONS: [Coord; 4] = [(0, -1), (0, 1), (-1, 0), (1, 0)];

/// Returns true when `(dr, dc)` is a single unit step along one axis.
#[inline]
pub fn is_unit_step(dr: i32, dc: i32) -> bool {
    dr.abs() + dc.abs() == 1
}

/// Translates coordinates so the minimum row and column are both zero, then
/// sorts them.
///
/// Two blocks that differ only by translation normalize to the same shape.
pub fn normalize_to_origin(mut coords: Vec<Coord>) -> Vec<Coord> {
    let Some(min_row) = coords.iter().map(|(r, _)| *r).min() else {
        return coords;
    };
    let min_col = coords.iter().map(|(_, c)| *c).min().unwrap_or(0);

    for (r, c) in &mut coords {
        *r -= min_row;
        *c -= min_col;
    }

    coords.sort_unstable();
    coords
}

/// Counts the 4-connected regions formed by `cells`.
pub fn count_regions(cells: &[Coord]) -> usize {
    let mut unvisited: FxHashSet<Coord> = cells.iter().copied().collect();
    let mut regions = 0;

    loop {
        let Some(&seed) = unvisited.iter().next() else {
            break;
        };
        regions += 1;
        unvisited.remove(&seed);
        let mut stack = vec![seed];

        while let Some((r, c)) = stack.pop() {
            for (dr, dc) in DIRECTIONS {
                let neighbour = (r + dr, c + dc);
                if unvisited.remove(&neighbour) {
                    stack.push(neighbour);
                }
            }
        }
    }

    regions
}
