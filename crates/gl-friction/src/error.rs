//! Error types for friction/anchor-set computation.
//!
//! A geometry error is fatal to the analysis of that duct only; other
//! ducts and girders are unaffected. Non-convergence of the anchor-set
//! search is a flag on the solution, never an error.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum FrictionError {
    #[error("Duct geometry error: {what}")]
    Geometry { what: String },

    #[error("Non-finite value in friction computation: {what}")]
    NonFinite { what: &'static str },
}

pub type FrictionResult<T> = Result<T, FrictionError>;
