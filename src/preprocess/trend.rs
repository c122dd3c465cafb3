//! Least-squares plane removal and RMS normalisation.
//!
//! The plane is fitted in node units: `z ≈ c0 + c1·col + c2·row` with
//! `col = (x - x_min) / dx` and `row = (y - y_min) / dy`, so restoring the
//! trend on the lattice is just an evaluation at integer `(i, j)`.
use crate::types::{DataPoint, Lattice};
use log::{debug, warn};
use nalgebra::{Matrix3, Vector3};
use serde::{Deserialize, Serialize};

/// RMS below which the detrended data are treated as exactly planar.
pub const PLANAR_RMS: f64 = 1e-8;

/// Relative determinant size under which the normal equations are singular.
const SINGULAR_TOL: f64 = 1e-12;

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PlaneTrend {
    pub c0: f64,
    pub c1: f64,
    pub c2: f64,
}

impl PlaneTrend {
    /// Fit the plane to `points`. Collinear or coincident samples give the
    /// zero plane, or the flat plane at their common z when all z agree.
    /// Periodic data cannot carry an x-trend.
    pub fn fit(points: &[DataPoint], lattice: &Lattice, periodic: bool) -> Self {
        let n = points.len() as f64;
        let (mut sx, mut sy, mut sz) = (0.0, 0.0, 0.0);
        let (mut sxx, mut sxy, mut syy, mut sxz, mut syz) = (0.0, 0.0, 0.0, 0.0, 0.0);
        for p in points {
            let xx = lattice.col_of(p.x);
            let yy = lattice.row_of(p.y);
            sx += xx;
            sy += yy;
            sz += p.z;
            sxx += xx * xx;
            sxy += xx * yy;
            syy += yy * yy;
            sxz += xx * p.z;
            syz += yy * p.z;
        }
        let normal = Matrix3::new(n, sx, sy, sx, sxx, sxy, sy, sxy, syy);
        let det = normal.determinant();
        let magnitude = (n * sxx * syy).abs();
        if det == 0.0 || det.abs() <= SINGULAR_TOL * magnitude {
            if let Some(level) = common_level(points) {
                debug!("plane fit: singular normal equations, data flat at {level}");
                return Self {
                    c0: level,
                    c1: 0.0,
                    c2: 0.0,
                };
            }
            debug!("plane fit: singular normal equations, trend set to zero");
            return Self::default();
        }
        let Some(c) = normal.lu().solve(&Vector3::new(sz, sxz, syz)) else {
            return Self::default();
        };
        Self {
            c0: c[0],
            c1: if periodic { 0.0 } else { c[1] },
            c2: c[2],
        }
    }

    /// Trend value at fractional node position `(col, row)`.
    #[inline]
    pub fn evaluate(&self, col: f64, row: f64) -> f64 {
        self.c0 + self.c1 * col + self.c2 * row
    }

    /// Subtract the plane from every sample.
    pub fn remove(&self, points: &mut [DataPoint], lattice: &Lattice) {
        for p in points.iter_mut() {
            p.z -= self.evaluate(lattice.col_of(p.x), lattice.row_of(p.y));
        }
    }
}

/// The shared z value when every sample carries the same one.
fn common_level(points: &[DataPoint]) -> Option<f64> {
    let first = points.first()?.z;
    points.iter().all(|p| p.z == first).then_some(first)
}

/// Normalisation of detrended values by their RMS.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ZScale {
    rms: f64,
}

impl ZScale {
    pub fn new(rms: f64) -> Self {
        Self { rms }
    }

    /// RMS of the detrended samples, or `None` when they lie on the plane.
    pub fn measure(points: &[DataPoint]) -> Option<Self> {
        if points.is_empty() {
            return None;
        }
        let ssz: f64 = points.iter().map(|p| p.z * p.z).sum();
        let rms = (ssz / points.len() as f64).sqrt();
        if rms < PLANAR_RMS {
            warn!("input data lie exactly on a plane; emitting the plane");
            None
        } else {
            Some(Self { rms })
        }
    }

    /// Identity scale, used for the planar short-circuit.
    pub fn unit() -> Self {
        Self { rms: 1.0 }
    }

    #[inline]
    pub fn rms(&self) -> f64 {
        self.rms
    }

    #[inline]
    pub fn apply(&self, value: f64) -> f64 {
        value / self.rms
    }

    #[inline]
    pub fn restore(&self, value: f64) -> f64 {
        value * self.rms
    }

    /// Divide every sample by the RMS.
    pub fn rescale(&self, points: &mut [DataPoint]) {
        for p in points.iter_mut() {
            p.z = self.apply(p.z);
        }
    }
}
