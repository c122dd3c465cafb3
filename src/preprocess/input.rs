//! Filtering raw samples against the solver lattice.
use crate::grid::LevelGeometry;
use crate::types::{DataPoint, Lattice};
use log::{debug, info};
use serde::{Deserialize, Serialize};

/// Accumulates usable samples at the final spacing.
///
/// A sample is kept when its z is not NaN, it lies within one increment of
/// the region, and its rounded node falls on the lattice. In periodic mode,
/// samples within half a cell of the east edge are moved to the west edge,
/// and every sample on the west column is duplicated onto the east column.
#[derive(Debug)]
pub struct PointCollector<'a> {
    lattice: &'a Lattice,
    level: LevelGeometry,
    periodic: bool,
    points: Vec<DataPoint>,
    summary: InputSummary,
    z_sum: f64,
}

/// Counters describing what the collector accepted.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InputSummary {
    pub n_raw: usize,
    pub n_accepted: usize,
    pub n_rejected: usize,
    pub n_breakline_samples: usize,
    /// Samples copied from the west column onto the east one.
    pub n_periodic_copies: usize,
    pub n_discarded_duplicates: usize,
    pub z_min: f64,
    pub z_max: f64,
    pub z_mean: f64,
}

impl<'a> PointCollector<'a> {
    pub fn new(lattice: &'a Lattice, level: LevelGeometry, periodic: bool) -> Self {
        Self {
            lattice,
            level,
            periodic,
            points: Vec::with_capacity(1024),
            summary: InputSummary {
                z_min: f64::INFINITY,
                z_max: f64::NEG_INFINITY,
                ..Default::default()
            },
            z_sum: 0.0,
        }
    }

    /// Add scattered `(x, y, z)` samples.
    pub fn extend_samples(&mut self, samples: &[[f64; 3]]) {
        self.points.reserve(samples.len());
        let region = self.lattice.region;
        let [dx, dy] = self.lattice.inc;
        let half_dx = 0.5 * dx;
        for &[x, y, z] in samples {
            self.summary.n_raw += 1;
            if z.is_nan()
                || y < region.y_min - dy
                || y > region.y_max + dy
                || x < region.x_min - dx
                || x > region.x_max + dx
            {
                self.summary.n_rejected += 1;
                continue;
            }
            let (x, col) = if self.periodic && region.x_max - x < half_dx {
                (x - 360.0, Some(0))
            } else {
                (x, self.column(x))
            };
            let (Some(i), Some(j)) = (col, self.row(y)) else {
                self.summary.n_rejected += 1;
                continue;
            };
            self.accept(x, y, z, i, j);
            if self.periodic && i == 0 {
                self.accept(x + 360.0, y, z, self.level.block_nx - 1, j);
                self.summary.n_periodic_copies += 1;
            }
        }
    }

    /// Add densified breakline samples. Only the lattice check applies.
    pub fn extend_breakline_samples(&mut self, samples: &[[f64; 3]]) {
        self.points.reserve(samples.len());
        for &[x, y, z] in samples {
            if z.is_nan() {
                continue;
            }
            if let (Some(i), Some(j)) = (self.column(x), self.row(y)) {
                self.accept(x, y, z, i, j);
                self.summary.n_breakline_samples += 1;
            }
        }
    }

    fn column(&self, x: f64) -> Option<usize> {
        snap(self.lattice.col_of(x), self.level.block_nx)
    }

    fn row(&self, y: f64) -> Option<usize> {
        snap(self.lattice.row_of(y), self.level.block_ny)
    }

    fn accept(&mut self, x: f64, y: f64, z: f64, i: usize, j: usize) {
        let mut point = DataPoint::new(x, y, z);
        point.cell = self.level.cell(i, j);
        self.points.push(point);
        self.summary.z_min = self.summary.z_min.min(z);
        self.summary.z_max = self.summary.z_max.max(z);
        self.z_sum += z;
    }

    /// Hand over the accepted samples.
    pub fn finish(mut self) -> (Vec<DataPoint>, InputSummary) {
        self.summary.n_accepted = self.points.len();
        if !self.points.is_empty() {
            self.summary.z_mean = self.z_sum / self.points.len() as f64;
            debug!(
                "input: z range [{}, {}], mean {}",
                self.summary.z_min, self.summary.z_max, self.summary.z_mean
            );
        }
        if self.summary.n_periodic_copies > 0 {
            info!(
                "{} input values shared between the west and east columns",
                self.summary.n_periodic_copies
            );
        }
        (self.points, self.summary)
    }
}

/// Nearest node along one axis, if it lies on the lattice.
#[inline]
pub(crate) fn snap(fractional: f64, n: usize) -> Option<usize> {
    let k = (fractional + 0.5).floor();
    if k >= 0.0 && (k as usize) < n {
        Some(k as usize)
    } else {
        None
    }
}
