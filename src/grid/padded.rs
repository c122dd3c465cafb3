//! Flat node buffer with a ghost border, plus the per-node status map.
//!
//! `get`/`set` address nodes by `(i, j)`; `at`/`put` take the raw flat
//! index used by the hot relaxation loop together with the signed offsets of
//! [`OffsetTable`](super::OffsetTable). Both index paths are bounds-checked
//! by the underlying `Vec`.
use super::layout::{shifted, GridLayout};
use super::status::NodeStatus;

#[derive(Clone, Debug)]
pub struct PaddedGrid {
    layout: GridLayout,
    values: Vec<f32>,
    status: Vec<NodeStatus>,
}

impl PaddedGrid {
    /// Zero-filled buffer, every node unconstrained.
    pub fn new(layout: GridLayout) -> Self {
        Self {
            layout,
            values: vec![0.0; layout.len()],
            status: vec![NodeStatus::Unconstrained; layout.len()],
        }
    }

    #[inline]
    pub fn layout(&self) -> &GridLayout {
        &self.layout
    }

    #[inline]
    pub fn get(&self, i: usize, j: usize) -> f32 {
        self.values[self.layout.index(i, j)]
    }

    #[inline]
    pub fn set(&mut self, i: usize, j: usize, value: f32) {
        let idx = self.layout.index(i, j);
        self.values[idx] = value;
    }

    /// Value at a raw flat index.
    #[inline]
    pub fn at(&self, index: usize) -> f32 {
        self.values[index]
    }

    /// Value at `index + offset`, widened for accumulation.
    #[inline]
    pub fn near(&self, index: usize, offset: isize) -> f64 {
        f64::from(self.values[shifted(index, offset)])
    }

    #[inline]
    pub fn put(&mut self, index: usize, value: f32) {
        self.values[index] = value;
    }

    /// Store `value` at `index + offset`.
    #[inline]
    pub fn put_near(&mut self, index: usize, offset: isize, value: f64) {
        self.values[shifted(index, offset)] = value as f32;
    }

    #[inline]
    pub fn status(&self, index: usize) -> NodeStatus {
        self.status[index]
    }

    #[inline]
    pub fn set_status(&mut self, index: usize, status: NodeStatus) {
        self.status[index] = status;
    }

    /// Read-only view of the whole buffer, border included.
    pub fn values(&self) -> &[f32] {
        &self.values
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn node_and_raw_access_agree() {
        let layout = GridLayout::new(4, 5);
        let mut grid = PaddedGrid::new(layout);
        grid.set(2, 3, 7.5);
        let idx = layout.index(2, 3);
        assert_eq!(grid.at(idx), 7.5);
        assert_eq!(grid.near(idx, -(layout.my as isize)), 0.0);
        grid.put_near(idx, 1, -1.0);
        assert_eq!(grid.get(2, 4), -1.0);
        assert_eq!(grid.status(idx), NodeStatus::Unconstrained);
    }

    #[test]
    fn border_is_addressable_from_corner_nodes() {
        let layout = GridLayout::new(4, 4);
        let mut grid = PaddedGrid::new(layout);
        let sw = layout.sw_corner();
        let two_west_two_south = -2 * layout.my as isize - 2;
        grid.put_near(sw, two_west_two_south, 3.0);
        assert_eq!(grid.values()[0], 3.0);
        let ne = layout.ne_corner();
        grid.put_near(ne, 2 * layout.my as isize + 2, 4.0);
        assert_eq!(grid.values()[layout.len() - 1], 4.0);
    }
}
