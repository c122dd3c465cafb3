//! Core value types shared by the solver, the collaborators that feed it and
//! the tools that consume its output.
//!
//! Conventions
//! - Solver-side node coordinates are `(i, j)` with `i` the column counted
//!   from the west edge and `j` the row counted from the south edge.
//! - [`SurfaceGrid`] stores its values in scanline order: row 0 is the
//!   northern edge, matching how grid files are usually written.
use crate::error::{SurfaceError, SurfaceResult};
use serde::{Deserialize, Serialize};

/// Cell index marking a point that no longer constrains any node.
pub const OUTSIDE: u64 = u64::MAX;

/// Relative tolerance when checking that a region spans a whole number of increments.
const LATTICE_TOL: f64 = 1e-4;

/// A scattered sample together with the coarse cell it currently falls nearest to.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DataPoint {
    pub x: f64,
    pub y: f64,
    /// Sample value. Holds original units on input and detrended, rescaled
    /// units while the solver runs.
    pub z: f64,
    /// `col * block_ny + row` at the current grid spacing, or [`OUTSIDE`].
    pub cell: u64,
}

impl DataPoint {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self {
            x,
            y,
            z,
            cell: OUTSIDE,
        }
    }

    #[inline]
    pub fn is_outside(&self) -> bool {
        self.cell == OUTSIDE
    }
}

/// Whether grid values sit on cell corners or cell centres.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Registration {
    #[default]
    Node,
    Pixel,
}

/// Rectangular domain `[x_min, x_max] × [y_min, y_max]`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Region {
    pub x_min: f64,
    pub x_max: f64,
    pub y_min: f64,
    pub y_max: f64,
}

impl Region {
    pub fn new(x_min: f64, x_max: f64, y_min: f64, y_max: f64) -> Self {
        Self {
            x_min,
            x_max,
            y_min,
            y_max,
        }
    }

    pub fn width(&self) -> f64 {
        self.x_max - self.x_min
    }

    pub fn height(&self) -> f64 {
        self.y_max - self.y_min
    }

    /// True when the x range covers exactly one full turn of longitude.
    pub fn spans_360(&self) -> bool {
        (self.width() - 360.0).abs() < 1e-9 * 360.0
    }

    fn shifted(&self, dx: f64, dy: f64) -> Self {
        Self::new(self.x_min + dx, self.x_max + dx, self.y_min + dy, self.y_max + dy)
    }
}

/// A polyline whose vertices carry z values, densified into extra constraints.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Breakline {
    pub vertices: Vec<[f64; 3]>,
}

impl Breakline {
    pub fn new(vertices: Vec<[f64; 3]>) -> Self {
        Self { vertices }
    }
}

/// Everything the solver needs from the data-supplying collaborator.
#[derive(Clone, Copy, Debug)]
pub struct SurfaceInput<'a> {
    pub region: Region,
    /// Grid increments `[dx, dy]`.
    pub increments: [f64; 2],
    pub registration: Registration,
    /// Raw `(x, y, z)` samples. NaN z values are ignored.
    pub points: &'a [[f64; 3]],
    pub breaklines: &'a [Breakline],
}

impl<'a> SurfaceInput<'a> {
    pub fn new(region: Region, increments: [f64; 2], points: &'a [[f64; 3]]) -> Self {
        Self {
            region,
            increments,
            registration: Registration::Node,
            points,
            breaklines: &[],
        }
    }

    pub fn with_registration(mut self, registration: Registration) -> Self {
        self.registration = registration;
        self
    }

    pub fn with_breaklines(mut self, breaklines: &'a [Breakline]) -> Self {
        self.breaklines = breaklines;
        self
    }
}

/// Node lattice the solver actually works on.
///
/// Pixel-registered requests are solved on a node lattice shifted by half an
/// increment that carries one extra column and row; those are dropped when
/// the result is emitted.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Lattice {
    /// Region spanned by the solver's nodes.
    pub region: Region,
    /// Region as requested by the caller.
    pub requested: Region,
    pub inc: [f64; 2],
    pub n_columns: usize,
    pub n_rows: usize,
    pub registration: Registration,
}

impl Lattice {
    pub fn new(region: Region, inc: [f64; 2], registration: Registration) -> SurfaceResult<Self> {
        if !(inc[0] > 0.0 && inc[1] > 0.0 && inc[0].is_finite() && inc[1].is_finite()) {
            return Err(SurfaceError::InvalidRegion(format!(
                "increments must be positive, got {} / {}",
                inc[0], inc[1]
            )));
        }
        let finite = [region.x_min, region.x_max, region.y_min, region.y_max]
            .iter()
            .all(|v| v.is_finite());
        if !finite || region.x_max <= region.x_min || region.y_max <= region.y_min {
            return Err(SurfaceError::InvalidRegion(format!(
                "empty or non-finite region {}/{}/{}/{}",
                region.x_min, region.x_max, region.y_min, region.y_max
            )));
        }
        let n_columns = intervals(region.width(), inc[0], "x")? + 1;
        let n_rows = intervals(region.height(), inc[1], "y")? + 1;
        let solved = match registration {
            Registration::Node => region,
            Registration::Pixel => region.shifted(0.5 * inc[0], 0.5 * inc[1]),
        };
        Ok(Self {
            region: solved,
            requested: region,
            inc,
            n_columns,
            n_rows,
            registration,
        })
    }

    /// Dimensions of the emitted grid.
    pub fn output_dims(&self) -> (usize, usize) {
        match self.registration {
            Registration::Node => (self.n_columns, self.n_rows),
            Registration::Pixel => (self.n_columns - 1, self.n_rows - 1),
        }
    }

    /// Fractional column of `x` on this lattice.
    #[inline]
    pub fn col_of(&self, x: f64) -> f64 {
        (x - self.region.x_min) / self.inc[0]
    }

    /// Fractional row (from the south) of `y` on this lattice.
    #[inline]
    pub fn row_of(&self, y: f64) -> f64 {
        (y - self.region.y_min) / self.inc[1]
    }
}

fn intervals(extent: f64, inc: f64, axis: &str) -> SurfaceResult<usize> {
    let n = extent / inc;
    let rounded = n.round();
    if (n - rounded).abs() > LATTICE_TOL {
        return Err(SurfaceError::InvalidRegion(format!(
            "{axis} range {extent} is not a multiple of the increment {inc}"
        )));
    }
    Ok(rounded as usize)
}

/// Final gridded surface in original z units.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SurfaceGrid {
    pub n_columns: usize,
    pub n_rows: usize,
    pub region: Region,
    pub increments: [f64; 2],
    pub registration: Registration,
    /// Scanline order, row 0 at the north edge.
    pub values: Vec<f32>,
}

impl SurfaceGrid {
    #[inline]
    /// Value at `col` and `row` counted from the north edge.
    pub fn get(&self, col: usize, row: usize) -> f32 {
        self.values[row * self.n_columns + col]
    }

    #[inline]
    /// Value at node `(i, j)` with `j` counted from the south edge.
    pub fn value_at_node(&self, i: usize, j: usize) -> f32 {
        self.get(i, self.n_rows - 1 - j)
    }

    /// Map coordinates of node `(i, j)` (south-origin rows).
    pub fn node_coordinates(&self, i: usize, j: usize) -> (f64, f64) {
        let half = match self.registration {
            Registration::Node => 0.0,
            Registration::Pixel => 0.5,
        };
        (
            self.region.x_min + (i as f64 + half) * self.increments[0],
            self.region.y_min + (j as f64 + half) * self.increments[1],
        )
    }

    /// Minimum and maximum over all non-NaN values.
    pub fn min_max(&self) -> Option<(f32, f32)> {
        self.values
            .iter()
            .copied()
            .filter(|v| !v.is_nan())
            .fold(None, |acc, v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
    }
}
