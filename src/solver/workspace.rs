//! Mutable state owned by one solve.
//!
//! Everything that changes with the grid spacing lives here so that a level
//! transition is a single [`Workspace::set_spacing`] followed by a rebin.
use crate::grid::{GridLayout, LevelGeometry, OffsetTable, PaddedGrid};
use crate::types::{DataPoint, Lattice, Region};

use super::classify::{bin_points, BriggsCoefficients};

pub(crate) struct Workspace {
    pub layout: GridLayout,
    /// Region spanned by the solver's nodes.
    pub region: Region,
    pub inc: [f64; 2],
    pub grid: PaddedGrid,
    /// Working samples: detrended, rescaled, binned at the current level.
    pub points: Vec<DataPoint>,
    /// One entry per quadrant-tagged node, in sweep order.
    pub briggs: Vec<BriggsCoefficients>,
    pub level: LevelGeometry,
    pub offsets: OffsetTable,
}

impl Workspace {
    pub fn new(lattice: &Lattice, points: Vec<DataPoint>, spacing: usize) -> Self {
        let layout = GridLayout::from_lattice(lattice);
        let level = LevelGeometry::new(&layout, lattice.inc, spacing);
        Self {
            layout,
            region: lattice.region,
            inc: lattice.inc,
            grid: PaddedGrid::new(layout),
            briggs: Vec::with_capacity(points.len()),
            points,
            offsets: OffsetTable::new(&layout, &level),
            level,
        }
    }

    /// Switch to a new spacing multiplier.
    pub fn set_spacing(&mut self, spacing: usize) {
        self.level = LevelGeometry::new(&self.layout, self.inc, spacing);
        self.offsets = OffsetTable::new(&self.layout, &self.level);
    }

    /// Re-bin the samples at the current spacing; returns how many fell off.
    pub fn rebin(&mut self) -> usize {
        bin_points(&mut self.points, &self.region, &self.level)
    }

    #[inline]
    pub fn spacing(&self) -> usize {
        self.level.grid
    }
}
