//! Optional lower/upper limit surfaces.
//!
//! Limits are resolved once into [`BoundGrids`] in original z units on the
//! emitted lattice (scanline order, row 0 north). The solver works on a
//! detrended, rescaled copy, [`WorkingBounds`], stored on the padded layout so
//! the relaxation loop can clamp by flat index. NaN means "open" on that side.
use crate::error::{BoundSide, SurfaceError, SurfaceResult};
use crate::grid::GridLayout;
use crate::preprocess::trend::{PlaneTrend, ZScale};
use crate::types::Lattice;
use log::warn;
use serde::{Deserialize, Serialize};

/// Source of one limit surface.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoundSpec {
    #[default]
    None,
    /// Constant limit in z units.
    Value(f64),
    /// Minimum (lower) or maximum (upper) of the input data.
    DataExtreme,
    /// Per-node limits in scanline order with the output grid's dimensions.
    Grid(Vec<f32>),
}

impl BoundSpec {
    pub fn is_none(&self) -> bool {
        matches!(self, BoundSpec::None)
    }
}

/// Limits in original units on the output lattice.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BoundGrids {
    n_columns: usize,
    n_rows: usize,
    lower: Option<Vec<f32>>,
    upper: Option<Vec<f32>>,
}

impl BoundGrids {
    /// Resolve both specs for an output grid of `dims` columns × rows, given
    /// the observed data range.
    pub fn resolve(
        lower: &BoundSpec,
        upper: &BoundSpec,
        dims: (usize, usize),
        data_range: (f64, f64),
    ) -> SurfaceResult<Self> {
        let (n_columns, n_rows) = dims;
        let bounds = Self {
            n_columns,
            n_rows,
            lower: resolve_side(lower, BoundSide::Lower, dims, data_range)?,
            upper: resolve_side(upper, BoundSide::Upper, dims, data_range)?,
        };
        let crossed = bounds.crossed_nodes();
        if crossed > 0 {
            warn!("lower limit is above the upper limit at {crossed} nodes");
        }
        Ok(bounds)
    }

    /// Nodes where both limits are set and the lower one exceeds the upper.
    pub fn crossed_nodes(&self) -> usize {
        match (&self.lower, &self.upper) {
            (Some(low), Some(high)) => low.iter().zip(high).filter(|(l, h)| l > h).count(),
            _ => 0,
        }
    }

    pub fn is_active(&self) -> bool {
        self.lower.is_some() || self.upper.is_some()
    }

    pub fn lower(&self) -> Option<&[f32]> {
        self.lower.as_deref()
    }

    pub fn upper(&self) -> Option<&[f32]> {
        self.upper.as_deref()
    }

    /// Clamp an output value at scanline position `k`.
    pub fn clamp_output(&self, k: usize, value: f32) -> f32 {
        let mut v = value;
        if let Some(low) = self.lower.as_ref().map(|g| g[k]) {
            if !low.is_nan() && v < low {
                v = low;
            }
        }
        if let Some(high) = self.upper.as_ref().map(|g| g[k]) {
            if !high.is_nan() && v > high {
                v = high;
            }
        }
        v
    }

    /// Scanline index of the limit applying to solver node `(i, j)`.
    ///
    /// Pixel-registered solves carry one extra column and row; those reuse
    /// the nearest emitted node's limit.
    fn scanline_index(&self, i: usize, j: usize) -> usize {
        let col = i.min(self.n_columns - 1);
        let row_south = j.min(self.n_rows - 1);
        (self.n_rows - 1 - row_south) * self.n_columns + col
    }

    /// Detrend and rescale into the solver's working units.
    pub fn to_working(
        &self,
        lattice: &Lattice,
        layout: &GridLayout,
        trend: &PlaneTrend,
        scale: &ZScale,
    ) -> WorkingBounds {
        let convert = |grid: &Option<Vec<f32>>| {
            grid.as_ref().map(|src| {
                let mut out = vec![f32::NAN; layout.len()];
                for i in 0..lattice.n_columns {
                    for j in 0..lattice.n_rows {
                        let v = src[self.scanline_index(i, j)];
                        if v.is_nan() {
                            continue;
                        }
                        let residual = f64::from(v) - trend.evaluate(i as f64, j as f64);
                        out[layout.index(i, j)] = scale.apply(residual) as f32;
                    }
                }
                out
            })
        };
        WorkingBounds {
            lower: convert(&self.lower),
            upper: convert(&self.upper),
        }
    }
}

fn resolve_side(
    spec: &BoundSpec,
    side: BoundSide,
    dims: (usize, usize),
    data_range: (f64, f64),
) -> SurfaceResult<Option<Vec<f32>>> {
    let expected = dims.0 * dims.1;
    let (z_min, z_max) = data_range;
    let constant = |v: f64| Some(vec![v as f32; expected]);
    Ok(match spec {
        BoundSpec::None => None,
        BoundSpec::DataExtreme => match side {
            BoundSide::Lower => constant(z_min),
            BoundSide::Upper => constant(z_max),
        },
        BoundSpec::Value(v) => {
            match side {
                BoundSide::Lower if *v > z_min => {
                    warn!("lower limit {v} is above the data minimum {z_min}")
                }
                BoundSide::Upper if *v < z_max => {
                    warn!("upper limit {v} is below the data maximum {z_max}")
                }
                _ => {}
            }
            constant(*v)
        }
        BoundSpec::Grid(values) => {
            if values.len() != expected {
                return Err(SurfaceError::BoundGridShape {
                    side,
                    expected,
                    found: values.len(),
                });
            }
            Some(values.clone())
        }
    })
}

/// Limits in working units on the padded layout.
#[derive(Clone, Debug, Default)]
pub struct WorkingBounds {
    lower: Option<Vec<f32>>,
    upper: Option<Vec<f32>>,
}

impl WorkingBounds {
    /// No limits on either side.
    pub fn open() -> Self {
        Self::default()
    }

    /// Limits already laid out on the padded buffer.
    pub fn from_parts(lower: Option<Vec<f32>>, upper: Option<Vec<f32>>) -> Self {
        Self { lower, upper }
    }

    pub fn is_active(&self) -> bool {
        self.lower.is_some() || self.upper.is_some()
    }

    /// Clamp a working value at a flat node index. The lower limit wins
    /// when both are violated.
    #[inline]
    pub fn clamp(&self, index: usize, value: f64) -> f64 {
        if let Some(low) = self.lower.as_ref().map(|g| g[index]) {
            if !low.is_nan() && value < f64::from(low) {
                return f64::from(low);
            }
        }
        if let Some(high) = self.upper.as_ref().map(|g| g[index]) {
            if !high.is_nan() && value > f64::from(high) {
                return f64::from(high);
            }
        }
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Region, Registration};

    #[test]
    fn data_extreme_resolves_to_observed_range() {
        let bounds = BoundGrids::resolve(
            &BoundSpec::DataExtreme,
            &BoundSpec::DataExtreme,
            (3, 2),
            (-1.5, 4.0),
        )
        .expect("bounds");
        assert_eq!(bounds.lower().map(|g| g[0]), Some(-1.5));
        assert_eq!(bounds.upper().map(|g| g[5]), Some(4.0));
        assert_eq!(bounds.clamp_output(2, 9.0), 4.0);
        assert_eq!(bounds.clamp_output(2, -9.0), -1.5);
    }

    #[test]
    fn grid_with_wrong_shape_is_rejected() {
        let err = BoundGrids::resolve(&BoundSpec::Grid(vec![0.0; 5]), &BoundSpec::None, (3, 2), (0.0, 1.0));
        assert!(matches!(
            err,
            Err(SurfaceError::BoundGridShape {
                side: BoundSide::Lower,
                expected: 6,
                found: 5
            })
        ));
    }

    #[test]
    fn crossed_limit_grids_are_counted() {
        let lower = vec![0.0, 2.0, f32::NAN, 5.0];
        let upper = vec![1.0, 1.0, 1.0, f32::NAN];
        let bounds = BoundGrids::resolve(&BoundSpec::Grid(lower), &BoundSpec::Grid(upper), (2, 2), (0.0, 1.0))
            .expect("bounds");
        assert_eq!(bounds.crossed_nodes(), 1);
        assert_eq!(bounds.clamp_output(1, 0.0), 1.0);

        let open = BoundGrids::resolve(&BoundSpec::DataExtreme, &BoundSpec::None, (2, 2), (0.0, 1.0))
            .expect("bounds");
        assert_eq!(open.crossed_nodes(), 0);
    }

    #[test]
    fn nan_limits_stay_open() {
        let mut values = vec![0.0f32; 4];
        values[1] = f32::NAN;
        let bounds = BoundGrids::resolve(&BoundSpec::Grid(values), &BoundSpec::None, (2, 2), (0.0, 1.0))
            .expect("bounds");
        assert_eq!(bounds.clamp_output(0, -3.0), 0.0);
        assert_eq!(bounds.clamp_output(1, -3.0), -3.0);
    }

    #[test]
    fn working_bounds_follow_detrend_and_scale() {
        let lattice = Lattice::new(Region::new(0.0, 3.0, 0.0, 3.0), [1.0, 1.0], Registration::Node)
            .expect("lattice");
        let layout = GridLayout::from_lattice(&lattice);
        let bounds = BoundGrids::resolve(&BoundSpec::Value(10.0), &BoundSpec::None, (4, 4), (12.0, 20.0))
            .expect("bounds");
        let trend = PlaneTrend {
            c0: 2.0,
            c1: 1.0,
            c2: 0.0,
        };
        let scale = ZScale::new(4.0);
        let working = bounds.to_working(&lattice, &layout, &trend, &scale);
        assert!(working.is_active());
        // (10 - (2 + 1 * 2)) / 4 at column 2
        let idx = layout.index(2, 1);
        assert_eq!(working.clamp(idx, 0.0), 1.5);
        assert_eq!(working.clamp(idx, 3.0), 3.0);
    }
}
