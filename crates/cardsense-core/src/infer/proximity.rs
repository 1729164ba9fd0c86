//! Keyword-proximity strategy: label and value within a bounded window.
//!
//! Tolerates the line wraps and filler text that defeat the direct
//! strategy. The window is the remainder of the label's line, then the
//! next line of the same unit, then the token immediately before the
//! label (value-first column layouts).

use std::collections::BTreeSet;

use super::{InferenceContext, Proposal, Strategy};
use crate::harvest::LineContext;
use crate::models::{FieldKind, FieldMap, FieldSlot};

pub struct KeywordProximity;

impl Strategy for KeywordProximity {
    fn name(&self) -> &'static str {
        "keyword-proximity"
    }

    fn propose(&self, ctx: &InferenceContext<'_>, map: &FieldMap) -> Vec<Proposal> {
        let mut proposals: Vec<Proposal> = Vec::new();
        let mut claimed: BTreeSet<FieldSlot> = BTreeSet::new();
        let lines = &ctx.harvest.lines;

        for (idx, line) in lines.iter().enumerate() {
            let matches = ctx.vocab.matches(&line.text);
            if matches.len() >= 2 {
                // Multi-label lines are table headers; zipping their
                // columns is the alignment strategy's job.
                continue;
            }
            for m in matches {
                if map.is_filled(m.slot) || claimed.contains(&m.slot) {
                    continue;
                }
                let next = lines
                    .get(idx + 1)
                    .filter(|n| n.unit == line.unit && ctx.vocab.matches(&n.text).len() < 2);
                if let Some(proposal) = window_value(line, next, m.slot, m.span) {
                    claimed.insert(m.slot);
                    proposals.push(proposal);
                }
            }
        }
        proposals
    }
}

fn window_value(
    line: &LineContext,
    next: Option<&LineContext>,
    slot: FieldSlot,
    label_span: (usize, usize),
) -> Option<Proposal> {
    match slot.kind() {
        FieldKind::Money => line
            .money_after(label_span.1)
            .or_else(|| next.and_then(|n| n.money_after(0)))
            .or_else(|| money_before(line, label_span.0))
            .map(|value| Proposal::money(slot, value)),
        FieldKind::Date => line
            .date_after(label_span.1)
            .or_else(|| next.and_then(|n| n.anchor_date()))
            .map(|value| Proposal::date(slot, value)),
    }
}

/// Last money token ending at or before the label start.
fn money_before(line: &LineContext, label_start: usize) -> Option<rust_decimal::Decimal> {
    line.tokens
        .iter()
        .rev()
        .find(|t| t.span.1 <= label_start && t.money().is_some())
        .and_then(|t| t.money())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::harvest::harvest;
    use crate::issuer::{ProfileSet, Vocabulary};
    use crate::models::EngineConfig;
    use crate::source::TextSource;
    use pretty_assertions::assert_eq;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    fn propose_on(text: &str) -> Vec<Proposal> {
        let harvested = harvest(
            &TextSource::new(vec![text.to_string()]),
            &EngineConfig::default().harvest,
        );
        let profiles = ProfileSet::builtin();
        let profile = profiles.classify(&harvested.text);
        let vocab = Vocabulary::for_profile(profile);
        let config = EngineConfig::default();
        let ctx = InferenceContext {
            harvest: &harvested,
            profile,
            vocab: &vocab,
            config: &config,
        };
        KeywordProximity.propose(&ctx, &FieldMap::new())
    }

    fn money_for(proposals: &[Proposal], slot: FieldSlot) -> Option<Decimal> {
        proposals
            .iter()
            .find(|p| p.slot == slot)
            .and_then(|p| p.value.as_money())
    }

    #[test]
    fn test_value_on_next_line() {
        let proposals = propose_on("Total Amount Due\nRs 3,200.00");
        assert_eq!(
            money_for(&proposals, FieldSlot::TotalDue),
            Some(Decimal::from_str("3200.00").unwrap())
        );
    }

    #[test]
    fn test_value_with_filler_text() {
        let proposals = propose_on("Minimum Amount Due payable by you 160.00");
        assert_eq!(
            money_for(&proposals, FieldSlot::MinimumDue),
            Some(Decimal::from_str("160.00").unwrap())
        );
    }

    #[test]
    fn test_value_before_label() {
        let proposals = propose_on("50,000.00 is your Credit Limit");
        assert_eq!(
            money_for(&proposals, FieldSlot::CreditLimit),
            Some(Decimal::from_str("50000.00").unwrap())
        );
    }

    #[test]
    fn test_multi_label_header_line_is_skipped() {
        let proposals = propose_on("Credit Limit  Available Credit Limit\n50,000.00  42,350.50");
        assert!(proposals.is_empty());
    }

    #[test]
    fn test_no_value_in_window_yields_nothing() {
        let proposals = propose_on("Total Amount Due\nsee the enclosed schedule");
        assert!(proposals.is_empty());
    }
}
