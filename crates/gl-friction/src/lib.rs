//! gl-friction: post-tensioning friction and anchor-set losses.
//!
//! Builds the Coulomb friction loss curve along a duct from its jacking
//! end(s) and resolves the mutually dependent anchor seating loss with a
//! bracketed bisection search.

pub mod anchor;
pub mod curve;
pub mod error;

pub use anchor::{solve_anchor_set, AnchorSetConfig, AnchorSetSolution, SeatedProfile};
pub use curve::{FrictionCurve, TendonFriction};
pub use error::{FrictionError, FrictionResult};
