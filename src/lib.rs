#![doc = include_str!("../README.md")]

// Public modules (stable-ish surface)
pub mod diagnostics;
pub mod error;
pub mod solver;
pub mod types;

// Building blocks of the solver. Public for tools and tests, but their
// signatures may still move.
pub mod bounds;
pub mod grid;
pub mod preprocess;

// Helpers for the command-line tools.
pub mod config;
pub mod io;

// --- High-level re-exports -------------------------------------------------

// Main entry points: solver, parameters, inputs and the emitted grid.
pub use crate::solver::{AspectRatio, ConvergenceLimit, SurfaceParams, SurfaceSolver, Tension};
pub use crate::types::{Breakline, Region, Registration, SurfaceGrid, SurfaceInput};

pub use crate::bounds::BoundSpec;
pub use crate::error::{BoundSide, SurfaceError, SurfaceResult};

// High-level diagnostics returned by the solver.
pub use crate::diagnostics::{SolveReport, SolveTrace};

// Grid-size planning helpers that are useful before solving.
pub use crate::solver::{suggest_dimensions, SizeSuggestion};

// --- Prelude ---------------------------------------------------------------

/// Small prelude for quick experiments.
///
/// ```no_run
/// use surface_gridder::prelude::*;
///
/// # fn main() -> Result<(), SurfaceError> {
/// let samples = [[1.0, 1.0, 0.5], [8.0, 2.0, 1.5], [4.0, 7.0, -0.5], [6.0, 5.0, 2.0]];
/// let solver = SurfaceSolver::new(SurfaceParams {
///     tension: Tension::uniform(0.25),
///     ..Default::default()
/// })?;
///
/// let input = SurfaceInput::new(Region::new(0.0, 10.0, 0.0, 10.0), [1.0, 1.0], &samples);
/// let report = solver.solve_with_report(&input)?;
/// println!("nodes={} sweeps={}", report.grid.values.len(), report.trace.total_iterations);
/// # Ok(())
/// # }
/// ```
pub mod prelude {
    pub use crate::{
        Region, Registration, SurfaceError, SurfaceGrid, SurfaceInput, SurfaceParams, SurfaceSolver,
        Tension,
    };
}

// --- Stage-level API (for tools & advanced users) --------------------------

pub mod stages {
    // Data preparation.
    pub use crate::preprocess::{densify, discard_unusable, InputSummary, PlaneTrend, PointCollector, ZScale};

    // Multigrid schedule and relaxation records.
    pub use crate::solver::{
        gcd, guess_surface_time, prime_factors, GridSchedule, IterationMode, IterationRecord,
    };

    // Structured diagnostics types.
    pub use crate::diagnostics::{
        FitStatistics, LatticeDescriptor, StageTiming, TimingBreakdown,
    };
}
