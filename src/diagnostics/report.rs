use serde::Serialize;

use crate::diagnostics::{FitStatistics, TimingBreakdown};
use crate::preprocess::{InputSummary, PlaneTrend};
use crate::solver::relax::IterationRecord;
use crate::types::{Region, Registration, SurfaceGrid};

/// Result of [`SurfaceSolver::solve_with_report`](crate::SurfaceSolver::solve_with_report).
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SolveReport {
    pub grid: SurfaceGrid,
    pub trace: SolveTrace,
}

/// What the solver did on the way to the grid.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SolveTrace {
    pub lattice: LatticeDescriptor,
    pub input: InputSummary,
    /// Samples dropped because another one sat closer to the same final node.
    pub discarded_unusable: usize,
    pub plane: PlaneTrend,
    /// RMS of the detrended data; 1 when the data were planar.
    pub z_scale: f64,
    /// Absolute convergence limit in z units at the final spacing.
    pub convergence_limit: f64,
    /// The data lay on a plane and no relaxation was run.
    pub planar: bool,
    /// `n_columns - 1` and `n_rows - 1` share no factor, so only one level ran.
    pub mutually_prime: bool,
    pub spacings: Vec<usize>,
    pub levels: Vec<IterationRecord>,
    pub total_iterations: u64,
    /// Coarse nodes seeded with the data mean for lack of nearby samples.
    pub seeded_with_mean: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fit: Option<FitStatistics>,
    pub timings: TimingBreakdown,
}

impl SolveTrace {
    /// Levels whose last sweep still exceeded the limit.
    pub fn unconverged_levels(&self) -> impl Iterator<Item = &IterationRecord> {
        self.levels.iter().filter(|r| !r.converged())
    }
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LatticeDescriptor {
    pub n_columns: usize,
    pub n_rows: usize,
    /// Region spanned by the solver's nodes.
    pub solved_region: Region,
    pub increments: [f64; 2],
    pub registration: Registration,
    pub periodic: bool,
    /// Aspect ratio ε after resolving the geographic option.
    pub aspect_ratio: f64,
}
