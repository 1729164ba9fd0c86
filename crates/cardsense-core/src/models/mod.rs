//! Data models for the inference engine.

pub mod config;
pub mod fields;
pub mod summary;

pub use config::{ClusterConfig, EngineConfig, FallbackConfig, HarvestConfig};
pub use fields::{FieldKind, FieldMap, FieldSlot, FieldValue, ResolvedField};
pub use summary::{CanonicalValue, Diagnostics, StatementSummary, UNKNOWN_SENTINEL};
