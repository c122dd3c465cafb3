//! Multigrid continuous-curvature solver.
//!
//! Overview
//! - The data are detrended and normalised, then solved first on the
//!   coarsest lattice whose spacing divides both interval counts.
//! - Each level is relaxed with a 12-point finite-difference stencil of the
//!   tensioned biharmonic equation. Samples that sit on a node pin it; the
//!   others tie their nearest node through Briggs coefficients.
//! - Finer levels start from a bilinear forecast of the coarser solution.
//!
//! Modules
//! - [`params`] – user parameters and their validation.
//! - [`coefficients`] – stencil weights for a given tension and aspect ratio.
//! - [`classify`] – binning of samples and nearest-point node classification.
//! - [`boundary`] – ghost-node synthesis for natural or periodic edges.
//! - [`relax`] – the over-relaxed Gauss-Seidel sweep and its stopping rule.
//! - `forecast` – radius seeding and the coarse-to-fine forecast.
//! - [`schedule`] – spacing cascade and faster grid-size suggestions.
//! - `pipeline` – the [`SurfaceSolver`] driving all of the above.

pub mod boundary;
pub mod classify;
pub mod coefficients;
mod forecast;
pub mod params;
mod pipeline;
pub mod relax;
pub mod schedule;
pub(crate) mod workspace;

pub use params::{AspectRatio, ConvergenceLimit, SurfaceParams, Tension, DEFAULT_CONVERGENCE_FRACTION};
pub use pipeline::SurfaceSolver;
pub use relax::{IterationMode, IterationRecord};
pub use schedule::{gcd, guess_surface_time, prime_factors, suggest_dimensions, GridSchedule, SizeSuggestion};
