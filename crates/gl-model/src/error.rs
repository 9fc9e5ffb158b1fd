//! Error types for model construction and lookup.

use gl_core::{GirderKey, PoiId, SegmentKey, TendonKey};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ModelError {
    #[error("Unknown girder: {0}")]
    UnknownGirder(GirderKey),

    #[error("Unknown segment: {0}")]
    UnknownSegment(SegmentKey),

    #[error("Unknown tendon: {0}")]
    UnknownTendon(TendonKey),

    #[error("Unknown point of interest: {0}")]
    UnknownPoi(PoiId),

    #[error("Missing data: {what}")]
    MissingData { what: String },

    #[error("Invalid model: {what}")]
    Invalid { what: String },
}

pub type ModelResult<T> = Result<T, ModelError>;
