//! Core library for statement field inference.
//!
//! This crate provides:
//! - Document sources (text-layer PDF, CSV, in-memory text)
//! - Token harvesting (currency, date and label tokens with line context)
//! - Issuer classification from data-declared profiles
//! - The strategy chain (label regex, keyword proximity, table
//!   alignment, numeric-cluster constraint assignment, statistical
//!   fallback) with first-writer-wins conflict resolution
//! - Derivation, reconciliation and result normalization

pub mod error;
pub mod harvest;
pub mod infer;
pub mod issuer;
pub mod models;
pub mod normalize;
pub mod reconcile;
pub mod source;

pub use error::{CardsenseError, Result};
pub use harvest::{Harvest, LineContext, harvest};
pub use issuer::{IssuerId, IssuerProfile, ProfileSet};
pub use models::{
    CanonicalValue, EngineConfig, FieldMap, FieldSlot, FieldValue, StatementSummary,
    UNKNOWN_SENTINEL,
};
pub use source::{CsvSource, DocumentSource, PdfSource, TextSource};

use tracing::info;

/// The field-inference engine: a pure function from harvested document
/// structure to a [`StatementSummary`].
///
/// The engine is synchronous and holds no per-document state, so one
/// instance may be reused across documents, and independent instances
/// may run in parallel with no coordination.
pub struct Engine {
    config: EngineConfig,
    profiles: ProfileSet,
}

impl Engine {
    /// Engine with default configuration and builtin issuer profiles.
    pub fn new() -> Self {
        Self {
            config: EngineConfig::default(),
            profiles: ProfileSet::builtin(),
        }
    }

    /// Replace the configuration.
    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Replace the issuer profiles (e.g. loaded from a JSON file).
    pub fn with_profiles(mut self, profiles: ProfileSet) -> Self {
        self.profiles = profiles;
        self
    }

    /// Analyze a document source end to end.
    pub fn analyze(&self, source: &dyn DocumentSource) -> StatementSummary {
        let harvested = harvest::harvest(source, &self.config.harvest);
        self.analyze_harvest(&harvested)
    }

    /// Analyze pre-extracted text (pages separated by form feeds).
    pub fn analyze_text(&self, text: &str) -> StatementSummary {
        self.analyze(&TextSource::from_text(text))
    }

    /// Run classification, the strategy chain, reconciliation and
    /// normalization over an existing harvest.
    pub fn analyze_harvest(&self, harvested: &Harvest) -> StatementSummary {
        let profile = self.profiles.classify(&harvested.text);
        let mut map = infer::run_chain(harvested, profile, &self.config);
        let notes = reconcile::reconcile(&mut map, harvested);

        let summary = normalize::normalize(profile.issuer, map, notes);
        info!(
            issuer = profile.issuer.name(),
            resolved = summary.resolved_count(),
            "analysis complete"
        );
        summary
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}
