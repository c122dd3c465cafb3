//! Index space of the padded node buffer.
//!
//! Nodes are stored column by column (`i` west→east, `j` south→north) with a
//! two-node border on every side so the 12-point stencil and the boundary
//! synthesis never need bounds checks:
//!
//! ```text
//! index(i, j) = sw_corner + i * my + j,   sw_corner = 2 * my + 2
//! ```
//!
//! [`LevelGeometry`] describes the coarse sub-lattice visited at the current
//! grid spacing; every spacing divides both `n_columns - 1` and `n_rows - 1`
//! so coarse nodes always land on fine ones.
use crate::types::Lattice;

/// Width of the ghost border on every side.
pub const PAD: usize = 2;

/// Mapping between `(i, j)` node coordinates and flat buffer offsets.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GridLayout {
    pub n_columns: usize,
    pub n_rows: usize,
    /// Padded number of columns.
    pub mx: usize,
    /// Padded number of rows, i.e. the column stride.
    pub my: usize,
}

impl GridLayout {
    pub fn new(n_columns: usize, n_rows: usize) -> Self {
        Self {
            n_columns,
            n_rows,
            mx: n_columns + 2 * PAD,
            my: n_rows + 2 * PAD,
        }
    }

    pub fn from_lattice(lattice: &Lattice) -> Self {
        Self::new(lattice.n_columns, lattice.n_rows)
    }

    /// Total number of slots including the border.
    #[inline]
    pub fn len(&self) -> usize {
        self.mx * self.my
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[inline]
    pub fn sw_corner(&self) -> usize {
        PAD * self.my + PAD
    }

    #[inline]
    pub fn se_corner(&self) -> usize {
        self.sw_corner() + (self.n_columns - 1) * self.my
    }

    #[inline]
    pub fn nw_corner(&self) -> usize {
        self.sw_corner() + self.n_rows - 1
    }

    #[inline]
    pub fn ne_corner(&self) -> usize {
        self.se_corner() + self.n_rows - 1
    }

    /// Flat offset of node `(i, j)`.
    #[inline]
    pub fn index(&self, i: usize, j: usize) -> usize {
        self.sw_corner() + i * self.my + j
    }
}

/// Shift a flat index by a signed stencil offset.
#[inline]
pub fn shifted(index: usize, offset: isize) -> usize {
    index.wrapping_add_signed(offset)
}

/// Classify a position along one axis into the 5 boundary buckets used by
/// the offset table: 0 and 1 near the start, 2 in the interior, 3 and 4 near
/// the end.
#[inline]
pub fn edge_case(from_start: usize, from_end: usize) -> usize {
    if from_start < 2 {
        from_start
    } else if from_end < 2 {
        4 - from_end
    } else {
        2
    }
}

/// Sizes of the coarse sub-lattice visited at a given grid spacing.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LevelGeometry {
    /// Current spacing multiplier of the final increment.
    pub grid: usize,
    pub block_nx: usize,
    pub block_ny: usize,
    /// Map-unit size of one coarse cell.
    pub grid_xinc: f64,
    pub grid_yinc: f64,
    /// Flat offset between horizontally adjacent coarse nodes.
    pub grid_east: usize,
}

impl LevelGeometry {
    pub fn new(layout: &GridLayout, inc: [f64; 2], grid: usize) -> Self {
        Self {
            grid,
            block_nx: (layout.n_columns - 1) / grid + 1,
            block_ny: (layout.n_rows - 1) / grid + 1,
            grid_xinc: grid as f64 * inc[0],
            grid_yinc: grid as f64 * inc[1],
            grid_east: grid * layout.my,
        }
    }

    /// Coarse cell index of `(block_i, block_j)`.
    #[inline]
    pub fn cell(&self, block_i: usize, block_j: usize) -> u64 {
        (block_i * self.block_ny + block_j) as u64
    }

    /// Inverse of [`cell`](Self::cell).
    #[inline]
    pub fn block_of(&self, cell: u64) -> (usize, usize) {
        let cell = cell as usize;
        (cell / self.block_ny, cell % self.block_ny)
    }

    /// Flat buffer index of the coarse node `(block_i, block_j)`.
    #[inline]
    pub fn node_index(&self, layout: &GridLayout, block_i: usize, block_j: usize) -> usize {
        layout.index(block_i * self.grid, block_j * self.grid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn corners_sit_inside_the_border() {
        let layout = GridLayout::new(5, 7);
        assert_eq!(layout.my, 11);
        assert_eq!(layout.sw_corner(), 24);
        assert_eq!(layout.se_corner(), layout.index(4, 0));
        assert_eq!(layout.nw_corner(), layout.index(0, 6));
        assert_eq!(layout.ne_corner(), layout.index(4, 6));
    }

    #[test]
    fn edge_buckets_cover_both_ends() {
        let n = 6;
        let cases: Vec<usize> = (0..n).map(|k| edge_case(k, n - 1 - k)).collect();
        assert_eq!(cases, vec![0, 1, 2, 2, 3, 4]);
    }

    #[test]
    fn level_geometry_counts_coarse_nodes() {
        let layout = GridLayout::new(13, 9);
        let level = LevelGeometry::new(&layout, [0.5, 0.25], 4);
        assert_eq!((level.block_nx, level.block_ny), (4, 3));
        assert_eq!(level.grid_east, 4 * layout.my);
        assert_eq!(level.block_of(level.cell(2, 1)), (2, 1));
        assert!((level.grid_xinc - 2.0).abs() < 1e-12);
    }
}
