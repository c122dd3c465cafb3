//! Parameter types configuring the surface solver.
//!
//! Defaults reproduce a minimum-curvature surface (both tensions zero) with
//! a convergence limit of 100 ppm of the data's RMS after detrending.
//! For smoother, less oscillatory grids raise the interior tension first.

use crate::bounds::BoundSpec;
use crate::error::{SurfaceError, SurfaceResult};
use crate::types::Region;
use serde::{Deserialize, Serialize};

/// Fraction of the RMS used when no explicit limit is given.
pub const DEFAULT_CONVERGENCE_FRACTION: f64 = 1e-4;

/// Solver-wide parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SurfaceParams {
    /// Ratio between y and x grid units (ε).
    pub aspect_ratio: AspectRatio,
    /// Stopping threshold on the largest change of one sweep.
    pub convergence: ConvergenceLimit,
    /// Sweeps allowed at the final spacing; coarser levels get `grid` times more.
    pub max_iterations: usize,
    /// Seed the coarsest lattice with Gaussian-weighted averages inside this
    /// radius (map units). Zero disables seeding.
    pub search_radius: f64,
    pub tension: Tension,
    /// Over-relaxation factor in `[1, 2]`.
    pub over_relaxation: f64,
    pub lower: BoundSpec,
    pub upper: BoundSpec,
    /// Treat x as longitude over a full 360° turn.
    pub periodic: bool,
}

impl Default for SurfaceParams {
    fn default() -> Self {
        Self {
            aspect_ratio: AspectRatio::default(),
            convergence: ConvergenceLimit::Default,
            max_iterations: 500,
            search_radius: 0.0,
            tension: Tension::default(),
            over_relaxation: 1.4,
            lower: BoundSpec::None,
            upper: BoundSpec::None,
            periodic: false,
        }
    }
}

impl SurfaceParams {
    /// Reject values outside their admissible ranges.
    pub fn validate(&self) -> SurfaceResult<()> {
        if self.max_iterations == 0 {
            return Err(SurfaceError::invalid("max_iterations", "must be at least 1"));
        }
        if !(1.0..=2.0).contains(&self.over_relaxation) {
            return Err(SurfaceError::invalid(
                "over_relaxation",
                format!("{} is outside [1, 2]", self.over_relaxation),
            ));
        }
        for (name, value) in [
            ("tension.boundary", self.tension.boundary),
            ("tension.interior", self.tension.interior),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(SurfaceError::invalid(name, format!("{value} is outside [0, 1]")));
            }
        }
        if let AspectRatio::Value(ratio) = self.aspect_ratio {
            if !(ratio > 0.0 && ratio.is_finite()) {
                return Err(SurfaceError::invalid(
                    "aspect_ratio",
                    format!("{ratio} must be positive"),
                ));
            }
        }
        match self.convergence {
            ConvergenceLimit::Absolute(v) | ConvergenceLimit::Relative(v)
                if !(v >= 0.0 && v.is_finite()) =>
            {
                return Err(SurfaceError::invalid(
                    "convergence",
                    format!("{v} must be a finite non-negative number"),
                ));
            }
            _ => {}
        }
        if !(self.search_radius >= 0.0 && self.search_radius.is_finite()) {
            return Err(SurfaceError::invalid(
                "search_radius",
                format!("{} must be non-negative", self.search_radius),
            ));
        }
        if let (BoundSpec::Value(low), BoundSpec::Value(high)) = (&self.lower, &self.upper) {
            if low > high {
                return Err(SurfaceError::invalid(
                    "bounds",
                    format!("lower limit {low} is above upper limit {high}"),
                ));
            }
        }
        Ok(())
    }
}

/// Tension pair; 0 gives minimum curvature, 1 a harmonic (membrane) surface.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tension {
    pub boundary: f64,
    pub interior: f64,
}

impl Tension {
    /// Same tension at the boundary and in the interior.
    pub fn uniform(value: f64) -> Self {
        Self {
            boundary: value,
            interior: value,
        }
    }
}

/// How the grid aspect ratio ε is chosen.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AspectRatio {
    Value(f64),
    /// `cos` of the region's middle latitude, for geographic grids.
    MidLatitude,
}

impl Default for AspectRatio {
    fn default() -> Self {
        AspectRatio::Value(1.0)
    }
}

impl AspectRatio {
    pub fn resolve(&self, region: &Region) -> f64 {
        match *self {
            AspectRatio::Value(v) => v,
            AspectRatio::MidLatitude => (0.5 * (region.y_min + region.y_max)).to_radians().cos(),
        }
    }
}

/// Convergence threshold on the per-sweep maximum change, in z units.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConvergenceLimit {
    /// 100 ppm of the detrended RMS.
    #[default]
    Default,
    /// Fixed limit in z units. Zero falls back to the default.
    Absolute(f64),
    /// Fraction of the detrended RMS.
    Relative(f64),
}

impl ConvergenceLimit {
    /// Absolute limit given the RMS of the detrended data.
    pub fn resolve(&self, rms: f64) -> f64 {
        match *self {
            ConvergenceLimit::Absolute(v) if v > 0.0 => v,
            ConvergenceLimit::Relative(fraction) => fraction * rms,
            _ => DEFAULT_CONVERGENCE_FRACTION * rms,
        }
    }
}
