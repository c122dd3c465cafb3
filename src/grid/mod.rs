//! Node storage and index arithmetic shared by every solver stage.
//!
//! - [`layout`] – padded column-major index space and coarse-level geometry.
//! - [`offsets`] – the 25 boundary cases of 12 stencil offsets.
//! - [`padded`] – the node buffer with its status map.
//! - [`status`] – per-node roles during relaxation.

pub mod layout;
pub mod offsets;
pub mod padded;
pub mod status;

pub use layout::{edge_case, shifted, GridLayout, LevelGeometry, PAD};
pub use offsets::OffsetTable;
pub use padded::PaddedGrid;
pub use status::NodeStatus;
