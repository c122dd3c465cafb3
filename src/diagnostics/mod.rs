//! Structured record of a solve.
//!
//! [`SolveReport`] is returned by the solver's reporting entry point and
//! bundles the emitted grid with a [`SolveTrace`]: the input summary, the
//! removed plane and scale, one [`IterationRecord`] per relaxation pass,
//! the fit at the data and stage timings. Everything serialises to JSON.
//!
//! [`IterationRecord`]: crate::solver::IterationRecord

pub mod fit;
pub mod report;
pub mod timing;

pub use fit::FitStatistics;
pub use report::{LatticeDescriptor, SolveReport, SolveTrace};
pub use timing::{elapsed_ms, StageTiming, TimingBreakdown};
