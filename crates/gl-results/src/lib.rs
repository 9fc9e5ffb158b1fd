//! gl-results: cached access to computed prestress losses.
//!
//! The [`LossStore`] is the query surface the surrounding application
//! talks to: it runs the loss engine lazily, caches per-girder aggregates,
//! extends them incrementally when later intervals are requested, and
//! keeps trial (what-if) results in a cache separate from the persisted
//! bridge's results.

pub mod report;
pub mod store;

pub use gl_engine::{
    AnchorSetDetails, DuctLoss, EngineError, EngineResult, LossDetails, LossesAggregate,
    StrandLoss, TendonStressing, TrialConfig,
};
pub use report::final_losses_report;
pub use store::LossStore;
