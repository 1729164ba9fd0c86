//! Statistical fallback: rank-based guesses when nothing else matched.
//!
//! Runs last, so it only ever sees slots every stronger strategy gave
//! up on. Produces a best-effort value from percentile selection and
//! magnitude ordering rather than leaving the primary fields empty.

use rust_decimal::Decimal;
use tracing::debug;

use super::{InferenceContext, Proposal, Strategy};
use crate::models::{FieldMap, FieldSlot};

pub struct StatisticalFallback;

impl Strategy for StatisticalFallback {
    fn name(&self) -> &'static str {
        "statistical-fallback"
    }

    fn propose(&self, ctx: &InferenceContext<'_>, map: &FieldMap) -> Vec<Proposal> {
        if !ctx.config.fallback.enabled {
            return Vec::new();
        }

        let mut proposals: Vec<Proposal> = Vec::new();
        propose_dates(ctx, map, &mut proposals);
        propose_money(ctx, map, &mut proposals);
        if !proposals.is_empty() {
            debug!(count = proposals.len(), "fallback produced best-effort values");
        }
        proposals
    }
}

fn propose_dates(ctx: &InferenceContext<'_>, map: &FieldMap, proposals: &mut Vec<Proposal>) {
    let mut dates = ctx.harvest.date_values();
    if dates.is_empty() {
        return;
    }
    dates.sort();

    // The earliest date in the leading units is the statement date;
    // the due date follows it.
    let earliest = dates[0];
    if !map.is_filled(FieldSlot::StatementDate) {
        proposals.push(Proposal::date(FieldSlot::StatementDate, earliest));
    }

    let statement = map.date(FieldSlot::StatementDate).unwrap_or(earliest);
    if !map.is_filled(FieldSlot::PaymentDueDate) {
        if let Some(due) = dates.iter().filter(|d| **d > statement).max() {
            proposals.push(Proposal::date(FieldSlot::PaymentDueDate, *due));
        }
    }
}

fn propose_money(ctx: &InferenceContext<'_>, map: &FieldMap, proposals: &mut Vec<Proposal>) {
    let mut values: Vec<Decimal> = ctx
        .harvest
        .money_values()
        .into_iter()
        .filter(|v| v.is_sign_positive())
        .collect();
    values.sort();
    values.dedup();

    if values.len() < ctx.config.fallback.min_samples {
        return;
    }

    let max = *values.last().expect("values is non-empty");
    if !map.is_filled(FieldSlot::CreditLimit) {
        proposals.push(Proposal::money(FieldSlot::CreditLimit, max));
    }
    let limit = map.money(FieldSlot::CreditLimit).unwrap_or(max);

    if !map.is_filled(FieldSlot::AvailableCredit) {
        if let Some(available) = values.iter().filter(|v| **v < limit).max() {
            proposals.push(Proposal::money(FieldSlot::AvailableCredit, *available));
        }
    }

    if !map.is_filled(FieldSlot::TotalDue) {
        proposals.push(Proposal::money(FieldSlot::TotalDue, percentile(&values, 50)));
    }
    if !map.is_filled(FieldSlot::MinimumDue) {
        proposals.push(Proposal::money(FieldSlot::MinimumDue, percentile(&values, 10)));
    }
}

/// Nearest-rank percentile over a sorted, deduplicated slice.
fn percentile(sorted: &[Decimal], p: usize) -> Decimal {
    let idx = (p * (sorted.len() - 1) + 50) / 100;
    sorted[idx.min(sorted.len() - 1)]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::harvest::harvest;
    use crate::issuer::{ProfileSet, Vocabulary};
    use crate::models::EngineConfig;
    use crate::source::TextSource;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn propose_on(text: &str, map: &FieldMap) -> Vec<Proposal> {
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
        StatisticalFallback.propose(&ctx, map)
    }

    #[test]
    fn test_no_tokens_proposes_nothing() {
        assert!(propose_on("just words, no numbers or dates", &FieldMap::new()).is_empty());
    }

    #[test]
    fn test_magnitude_ordering_for_money() {
        let proposals = propose_on(
            "100.00\n2,000.00\n50,000.00\n500.00",
            &FieldMap::new(),
        );
        let limit = proposals
            .iter()
            .find(|p| p.slot == FieldSlot::CreditLimit)
            .and_then(|p| p.value.as_money());
        assert_eq!(limit, Some(dec("50000.00")));

        let minimum = proposals
            .iter()
            .find(|p| p.slot == FieldSlot::MinimumDue)
            .and_then(|p| p.value.as_money());
        assert_eq!(minimum, Some(dec("100.00")));
    }

    #[test]
    fn test_too_few_samples_skips_money() {
        let proposals = propose_on("100.00 and 200.00", &FieldMap::new());
        assert!(!proposals.iter().any(|p| p.slot == FieldSlot::CreditLimit));
    }

    #[test]
    fn test_dates_earliest_then_later_due() {
        let proposals = propose_on("15/08/2025 words 05/09/2025", &FieldMap::new());
        let statement = proposals
            .iter()
            .find(|p| p.slot == FieldSlot::StatementDate)
            .and_then(|p| p.value.as_date());
        let due = proposals
            .iter()
            .find(|p| p.slot == FieldSlot::PaymentDueDate)
            .and_then(|p| p.value.as_date());
        assert_eq!(statement, Some(NaiveDate::from_ymd_opt(2025, 8, 15).unwrap()));
        assert_eq!(due, Some(NaiveDate::from_ymd_opt(2025, 9, 5).unwrap()));
    }

    #[test]
    fn test_single_date_leaves_due_unknown() {
        let proposals = propose_on("statement generated 15/08/2025", &FieldMap::new());
        assert!(proposals.iter().any(|p| p.slot == FieldSlot::StatementDate));
        assert!(!proposals.iter().any(|p| p.slot == FieldSlot::PaymentDueDate));
    }

    #[test]
    fn test_percentile_nearest_rank() {
        let values = vec![dec("1"), dec("2"), dec("3"), dec("4"), dec("5")];
        assert_eq!(percentile(&values, 0), dec("1"));
        assert_eq!(percentile(&values, 50), dec("3"));
        assert_eq!(percentile(&values, 100), dec("5"));
    }
}
