//! Pure domain types with minimal dependencies
//!
//! Selection geometry, the overlay-to-image transform and analysis results.
//! Nothing here performs I/O.

pub mod analysis;
pub mod geometry;
pub mod selection;
pub mod transform;

pub use analysis::*;
pub use geometry::*;
pub use selection::*;
pub use transform::*;
