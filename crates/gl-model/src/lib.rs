//! gl-model: bridge data model and external-collaborator seams.
//!
//! Holds the construction/loading timeline, concrete and strand material
//! models, and the provider traits the loss engine is constructed with
//! (section properties, tendon geometry, structural response). The
//! in-memory [`BridgeModel`] implements every provider trait and is the
//! default collaborator set for callers and tests; a host application can
//! substitute its own implementations at any seam.

pub mod bridge;
pub mod error;
pub mod materials;
pub mod response;
pub mod section;
pub mod tendon;
pub mod timeline;

pub use bridge::{BridgeBuilder, BridgeModel, Poi, SegmentData, StrandProfile, StrandRow, TendonData};
pub use error::{ModelError, ModelResult};
pub use materials::{Concrete, Strand};
pub use response::{ForceEffects, StructuralResponse};
pub use section::{SectionGeometry, SectionProps, SectionProvider};
pub use tendon::{DuctPath, DuctSegment, JackedEnds, JackingEnd, StressingData, TendonGeometry};
pub use timeline::{Activity, Interval, LoadId, Timeline};
