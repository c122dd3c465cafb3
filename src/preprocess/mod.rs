//! Data preparation around the solver.
//!
//! - [`input`] – filters raw samples against the lattice and tracks the data range.
//! - [`breakline`] – densifies polylines into extra samples.
//! - [`prune`] – drops all but the nearest sample per final node.
//! - [`trend`] – plane removal and RMS scaling, undone when the grid is emitted.

pub mod breakline;
pub mod input;
pub mod prune;
pub mod trend;

pub use breakline::densify;
pub use input::{InputSummary, PointCollector};
pub use prune::discard_unusable;
pub use trend::{PlaneTrend, ZScale, PLANAR_RMS};
