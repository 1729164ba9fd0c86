//! The strategy chain: ordered extraction strategies over a harvest.
//!
//! Strategies run in a fixed order of decreasing reliability. Each
//! returns proposals; the orchestrator commits a proposal only when the
//! slot is still empty. That first-writer-wins rule is the whole
//! conflict-resolution policy: a direct label always beats an inferred
//! or statistical value, because it ran first.

pub mod cluster;
pub mod fallback;
pub mod label;
pub mod proximity;
pub mod table;

use tracing::debug;

use crate::harvest::Harvest;
use crate::issuer::{IssuerProfile, Vocabulary};
use crate::models::{EngineConfig, FieldMap, FieldSlot, FieldValue};

pub use cluster::ClusterAssignment;
pub use fallback::StatisticalFallback;
pub use label::DirectLabel;
pub use proximity::KeywordProximity;
pub use table::TableAlignment;

/// A (slot, value) pair proposed by one strategy.
#[derive(Debug, Clone, PartialEq)]
pub struct Proposal {
    pub slot: FieldSlot,
    pub value: FieldValue,
}

impl Proposal {
    pub fn money(slot: FieldSlot, value: rust_decimal::Decimal) -> Self {
        Self { slot, value: FieldValue::Money(value) }
    }

    pub fn date(slot: FieldSlot, value: chrono::NaiveDate) -> Self {
        Self { slot, value: FieldValue::Date(value) }
    }
}

/// Shared read-only inputs for strategies.
pub struct InferenceContext<'a> {
    pub harvest: &'a Harvest,
    pub profile: &'a IssuerProfile,
    /// Profile-aware label vocabulary (issuer overrides plus generics,
    /// ordered per the profile hint).
    pub vocab: &'a Vocabulary,
    pub config: &'a EngineConfig,
}

/// One extraction technique in the ordered chain.
pub trait Strategy {
    /// Strategy name, recorded as field provenance.
    fn name(&self) -> &'static str;

    /// Propose values for slots given the map so far. Proposals for
    /// already-filled slots are discarded by the orchestrator.
    fn propose(&self, ctx: &InferenceContext<'_>, map: &FieldMap) -> Vec<Proposal>;
}

/// Run the fixed strategy chain over a harvest.
///
/// Issuer hints influence label ordering inside the vocabulary; they
/// never reorder or skip the stages themselves.
pub fn run_chain(harvest: &Harvest, profile: &IssuerProfile, config: &EngineConfig) -> FieldMap {
    let vocab = Vocabulary::for_profile(profile);
    let ctx = InferenceContext {
        harvest,
        profile,
        vocab: &vocab,
        config,
    };

    let strategies: [&dyn Strategy; 5] = [
        &DirectLabel,
        &KeywordProximity,
        &TableAlignment,
        &ClusterAssignment,
        &StatisticalFallback,
    ];

    let mut map = FieldMap::new();
    for strategy in strategies {
        for proposal in strategy.propose(&ctx, &map) {
            if map.commit(proposal.slot, proposal.value.clone(), strategy.name()) {
                debug!(
                    slot = proposal.slot.name(),
                    strategy = strategy.name(),
                    "committed field"
                );
            }
        }
    }
    map
}
