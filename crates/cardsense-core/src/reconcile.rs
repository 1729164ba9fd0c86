//! Derivation and reconciliation of the resolved field map.
//!
//! Runs once after the strategy chain: derive fields still missing from
//! algebraic relationships, then repair invariant violations. Repairs
//! are explicit and logged with provenance, never silent; when a repair
//! is impossible the field reverts to unknown rather than keeping an
//! inconsistent value.

use rust_decimal::Decimal;
use tracing::{info, warn};

use crate::harvest::Harvest;
use crate::models::{FieldMap, FieldSlot, FieldValue};

/// Provenance recorded on derived fields.
pub const DERIVED: &str = "derived";
/// Provenance recorded on repaired fields.
pub const RECONCILED: &str = "reconciled";

/// Reconcile the field map in place; returns human-readable notes for
/// the summary diagnostics.
pub fn reconcile(map: &mut FieldMap, harvest: &Harvest) -> Vec<String> {
    let mut notes = Vec::new();
    repair_limit_available(map, &mut notes);
    derive_missing(map, &mut notes);
    repair_minimum(map, harvest, &mut notes);
    notes
}

/// CreditLimit below AvailableCredit means the two numbers were read in
/// the wrong order; the larger one is the limit.
fn repair_limit_available(map: &mut FieldMap, notes: &mut Vec<String>) {
    let (Some(limit), Some(available)) = (
        map.money(FieldSlot::CreditLimit),
        map.money(FieldSlot::AvailableCredit),
    ) else {
        return;
    };
    if limit >= available {
        return;
    }

    warn!(%limit, %available, "credit limit below available credit, swapping");
    map.repair(FieldSlot::CreditLimit, FieldValue::Money(available), RECONCILED);
    map.repair(FieldSlot::AvailableCredit, FieldValue::Money(limit), RECONCILED);
    notes.push(format!(
        "swapped credit_limit ({limit}) and available_credit ({available})"
    ));
}

/// Used credit is the gap between the limit and what is still
/// available; either side of the identity can fill the other.
fn derive_missing(map: &mut FieldMap, notes: &mut Vec<String>) {
    if map.money(FieldSlot::TotalDue).is_none() {
        if let (Some(limit), Some(available)) = (
            map.money(FieldSlot::CreditLimit),
            map.money(FieldSlot::AvailableCredit),
        ) {
            let used = limit - available;
            if used >= Decimal::ZERO {
                map.commit(FieldSlot::TotalDue, FieldValue::Money(used), DERIVED);
                info!(%used, "derived total_due from credit_limit - available_credit");
                notes.push(format!("derived total_due = {used}"));
            }
        }
    }

    if map.money(FieldSlot::AvailableCredit).is_none() {
        if let (Some(limit), Some(total)) = (
            map.money(FieldSlot::CreditLimit),
            map.money(FieldSlot::TotalDue),
        ) {
            let available = limit - total;
            if available >= Decimal::ZERO {
                map.commit(FieldSlot::AvailableCredit, FieldValue::Money(available), DERIVED);
                info!(%available, "derived available_credit from credit_limit - total_due");
                notes.push(format!("derived available_credit = {available}"));
            }
        }
    }
}

/// A minimum above the total is never right: minimum payments are
/// categorically smaller than total dues. Re-derive the minimum as the
/// smallest unused positive token, or revert it to unknown.
fn repair_minimum(map: &mut FieldMap, harvest: &Harvest, notes: &mut Vec<String>) {
    let (Some(minimum), Some(total)) = (
        map.money(FieldSlot::MinimumDue),
        map.money(FieldSlot::TotalDue),
    ) else {
        return;
    };
    if minimum <= total {
        return;
    }

    let resolved = map.money_values();
    let candidate = harvest
        .money_values()
        .into_iter()
        .filter(|v| *v > Decimal::ZERO && !resolved.contains(v))
        .min();

    match candidate {
        Some(replacement) if replacement <= total => {
            warn!(%minimum, %total, %replacement, "minimum_due above total_due, re-derived");
            map.repair(FieldSlot::MinimumDue, FieldValue::Money(replacement), RECONCILED);
            notes.push(format!(
                "minimum_due ({minimum}) exceeded total_due ({total}); re-derived as {replacement}"
            ));
        }
        _ => {
            warn!(%minimum, %total, "minimum_due above total_due and no repair candidate");
            map.clear(FieldSlot::MinimumDue);
            notes.push(format!(
                "minimum_due ({minimum}) exceeded total_due ({total}); reverted to unknown"
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::harvest::harvest;
    use crate::models::{EngineConfig, HarvestConfig};
    use crate::source::TextSource;
    use pretty_assertions::assert_eq;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn harvest_text(text: &str) -> Harvest {
        harvest(
            &TextSource::new(vec![text.to_string()]),
            &HarvestConfig::default(),
        )
    }

    fn money_map(entries: &[(FieldSlot, &str)]) -> FieldMap {
        let mut map = FieldMap::new();
        for (slot, value) in entries {
            map.commit(*slot, FieldValue::Money(dec(value)), "direct-label");
        }
        map
    }

    #[test]
    fn test_derive_total_from_limit_and_available() {
        let mut map = money_map(&[
            (FieldSlot::CreditLimit, "50000.00"),
            (FieldSlot::AvailableCredit, "42350.50"),
        ]);
        let notes = reconcile(&mut map, &harvest_text(""));

        assert_eq!(map.money(FieldSlot::TotalDue), Some(dec("7649.50")));
        assert_eq!(map.get(FieldSlot::TotalDue).unwrap().strategy, DERIVED);
        assert_eq!(notes.len(), 1);
    }

    #[test]
    fn test_derive_available_from_limit_and_total() {
        let mut map = money_map(&[
            (FieldSlot::CreditLimit, "50000.00"),
            (FieldSlot::TotalDue, "3200.00"),
        ]);
        reconcile(&mut map, &harvest_text(""));
        assert_eq!(map.money(FieldSlot::AvailableCredit), Some(dec("46800.00")));
    }

    #[test]
    fn test_no_derivation_overwrite() {
        let mut map = money_map(&[
            (FieldSlot::CreditLimit, "50000.00"),
            (FieldSlot::AvailableCredit, "42350.50"),
            (FieldSlot::TotalDue, "3200.00"),
        ]);
        let notes = reconcile(&mut map, &harvest_text(""));
        assert_eq!(map.money(FieldSlot::TotalDue), Some(dec("3200.00")));
        assert!(notes.is_empty());
    }

    #[test]
    fn test_swap_limit_and_available() {
        let mut map = money_map(&[
            (FieldSlot::CreditLimit, "42350.50"),
            (FieldSlot::AvailableCredit, "50000.00"),
        ]);
        reconcile(&mut map, &harvest_text(""));
        assert_eq!(map.money(FieldSlot::CreditLimit), Some(dec("50000.00")));
        assert_eq!(map.money(FieldSlot::AvailableCredit), Some(dec("42350.50")));
        assert_eq!(map.get(FieldSlot::CreditLimit).unwrap().strategy, RECONCILED);
    }

    #[test]
    fn test_minimum_repair_uses_smallest_unused_token() {
        let mut map = money_map(&[
            (FieldSlot::TotalDue, "3200.00"),
            (FieldSlot::MinimumDue, "5000.00"),
        ]);
        let harvest = harvest_text("5,000.00  3,200.00  160.00");
        let notes = reconcile(&mut map, &harvest);

        assert_eq!(map.money(FieldSlot::MinimumDue), Some(dec("160.00")));
        assert_eq!(map.get(FieldSlot::MinimumDue).unwrap().strategy, RECONCILED);
        assert!(notes[0].contains("re-derived"));
    }

    #[test]
    fn test_minimum_repair_impossible_reverts_to_unknown() {
        let mut map = money_map(&[
            (FieldSlot::TotalDue, "100.00"),
            (FieldSlot::MinimumDue, "5000.00"),
        ]);
        // Every unused token is larger than the total.
        let harvest = harvest_text("5,000.00  9,000.00");
        reconcile(&mut map, &harvest);
        assert!(map.money(FieldSlot::MinimumDue).is_none());
    }

    #[test]
    fn test_consistent_map_is_untouched() {
        let mut map = money_map(&[
            (FieldSlot::TotalDue, "3200.00"),
            (FieldSlot::MinimumDue, "160.00"),
        ]);
        let before = map.clone();
        let notes = reconcile(&mut map, &harvest_text(""));
        assert_eq!(map, before);
        assert!(notes.is_empty());
    }
}
