//! gl-core: stable foundation for girderloss.
//!
//! Contains:
//! - units (uom SI types + constructors for stress/length/area/force)
//! - numeric (Real + tolerances + float helpers)
//! - ids (stable compact IDs for points of interest)
//! - keys (ordered value keys for girders/segments/tendons)
//! - error (shared error types)

pub mod error;
pub mod ids;
pub mod keys;
pub mod numeric;
pub mod units;

// Re-exports: nice ergonomics for downstream crates
pub use error::{GlError, GlResult};
pub use ids::*;
pub use keys::*;
pub use numeric::*;
pub use units::*;
