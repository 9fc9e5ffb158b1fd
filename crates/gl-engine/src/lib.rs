//! gl-engine: the time-step prestress-loss integrator.
//!
//! Walks the construction/loading timeline interval by interval for one
//! girder, applying elastic and time-dependent effects to every strand
//! population and tendon at every point of interest, and accumulating the
//! results into a [`LossesAggregate`].

pub mod aggregate;
pub mod details;
pub mod engine;
pub mod error;
pub mod strands;
pub mod sweep;

pub use aggregate::{AnchorSetDetails, LossesAggregate, TendonStressing};
pub use details::{DuctLoss, LossDetails, StrandLoss};
pub use engine::{LossEngine, TrialConfig};
pub use error::{EngineError, EngineResult};
pub use strands::StrandTracker;
pub use sweep::SweepPhase;
