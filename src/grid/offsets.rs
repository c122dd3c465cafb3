//! Stencil offsets for the 12 neighbours of a node in each of the 25
//! boundary cases.
//!
//! In the interior the neighbours of a coarse node are `grid` nodes away,
//! but the ghost border is always one fine node wide. Near the edges the
//! offsets therefore mix the coarse step with the unit step. The case index
//! is `x_case * 5 + y_case` with buckets from [`edge_case`](super::edge_case).
//!
//! Neighbour order:
//!
//! ```text
//!             0
//!        1    2    3
//!   4    5    X    6    7
//!        8    9   10
//!            11
//! ```

use super::layout::{GridLayout, LevelGeometry};

/// Offsets of the 12 stencil neighbours for every boundary case.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OffsetTable {
    cases: [[isize; 12]; 25],
}

impl OffsetTable {
    /// Build the table for the spacing described by `level`.
    pub fn new(layout: &GridLayout, level: &LevelGeometry) -> Self {
        let my = layout.my as isize;
        let grid = level.grid as isize;
        let east = level.grid_east as isize;

        let add_w = [-my, -east, -east, -east, -east];
        let add_w2 = [-2 * my, -my - east, -2 * east, -2 * east, -2 * east];
        let add_e = [east, east, east, east, my];
        let add_e2 = [2 * east, 2 * east, 2 * east, my + east, 2 * my];
        let add_n = [grid, grid, grid, grid, 1];
        let add_n2 = [2 * grid, 2 * grid, 2 * grid, grid + 1, 2];
        let add_s = [-1, -grid, -grid, -grid, -grid];
        let add_s2 = [-2, -grid - 1, -2 * grid, -2 * grid, -2 * grid];

        let mut cases = [[0isize; 12]; 25];
        for x in 0..5 {
            for y in 0..5 {
                cases[x * 5 + y] = [
                    add_n2[y],
                    add_n[y] + add_w[x],
                    add_n[y],
                    add_n[y] + add_e[x],
                    add_w2[x],
                    add_w[x],
                    add_e[x],
                    add_e2[x],
                    add_s[y] + add_w[x],
                    add_s[y],
                    add_s[y] + add_e[x],
                    add_s2[y],
                ];
            }
        }
        Self { cases }
    }

    #[inline]
    pub fn case(&self, kase: usize) -> &[isize; 12] {
        &self.cases[kase]
    }

    #[inline]
    pub fn for_edges(&self, x_case: usize, y_case: usize) -> &[isize; 12] {
        &self.cases[x_case * 5 + y_case]
    }
}
