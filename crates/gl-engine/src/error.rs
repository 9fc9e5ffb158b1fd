//! Error types for the time-step integrator.

use gl_core::IntervalIdx;
use gl_friction::FrictionError;
use gl_model::ModelError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    /// Required section or load data is missing; fatal to this girder's
    /// analysis from the first unresolved interval onward. Intervals
    /// already finalized remain cached and usable.
    #[error("Data unavailable for interval {interval}: {what}")]
    DataUnavailable { interval: IntervalIdx, what: String },

    /// Lookup by a key that does not exist in the bridge model; fatal to
    /// the single call only.
    #[error("Invalid key: {what}")]
    InvalidKey { what: String },

    #[error(transparent)]
    Friction(#[from] FrictionError),

    #[error(transparent)]
    Model(ModelError),
}

impl From<ModelError> for EngineError {
    fn from(e: ModelError) -> Self {
        match e {
            ModelError::UnknownGirder(_)
            | ModelError::UnknownSegment(_)
            | ModelError::UnknownTendon(_)
            | ModelError::UnknownPoi(_) => EngineError::InvalidKey {
                what: e.to_string(),
            },
            other => EngineError::Model(other),
        }
    }
}

impl EngineError {
    /// Attach interval context when a provider reports missing data.
    pub(crate) fn for_interval(interval: IntervalIdx, e: ModelError) -> Self {
        match e {
            ModelError::MissingData { what } => EngineError::DataUnavailable { interval, what },
            other => other.into(),
        }
    }
}

pub type EngineResult<T> = Result<T, EngineError>;
