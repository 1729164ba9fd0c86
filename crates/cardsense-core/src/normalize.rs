//! Result normalization: canonical dates, canonical currency, explicit
//! unknowns. The only component that produces user-facing formatting.

use std::collections::BTreeMap;

use rust_decimal::Decimal;

use crate::issuer::IssuerId;
use crate::models::{
    CanonicalValue, Diagnostics, FieldMap, FieldSlot, FieldValue, StatementSummary,
};

/// Freeze a reconciled field map into the final summary.
///
/// Every slot gets an entry; unresolved slots are an explicit unknown
/// sentinel, never a null that could leak into arithmetic downstream.
pub fn normalize(issuer: IssuerId, map: FieldMap, notes: Vec<String>) -> StatementSummary {
    let mut fields = BTreeMap::new();
    let mut provenance = BTreeMap::new();

    for slot in FieldSlot::ALL {
        let value = match map.get(slot) {
            Some(resolved) => {
                provenance.insert(slot, resolved.strategy.to_string());
                match &resolved.value {
                    FieldValue::Money(amount) => {
                        let rounded = amount.round_dp(2);
                        CanonicalValue::Money {
                            amount: rounded,
                            display: display_money(rounded),
                        }
                    }
                    FieldValue::Date(date) => CanonicalValue::Date {
                        date: *date,
                        display: date.format("%Y-%m-%d").to_string(),
                    },
                }
            }
            None => CanonicalValue::Unknown,
        };
        fields.insert(slot, value);
    }

    StatementSummary {
        issuer,
        fields,
        diagnostics: Diagnostics { provenance, notes },
    }
}

/// Format an amount with comma-grouped thousands and two decimals.
pub fn display_money(amount: Decimal) -> String {
    let rounded = amount.round_dp(2);
    let formatted = format!("{:.2}", rounded.abs());
    let (integer_part, decimal_part) = formatted
        .split_once('.')
        .unwrap_or((formatted.as_str(), "00"));

    let chars: Vec<char> = integer_part.chars().collect();
    let mut grouped = String::new();
    for (i, c) in chars.iter().enumerate() {
        if i > 0 && (chars.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(*c);
    }

    let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
        "-"
    } else {
        ""
    };
    format!("{}{}.{}", sign, grouped, decimal_part)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::UNKNOWN_SENTINEL;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_display_money_grouping() {
        assert_eq!(display_money(dec("1234.56")), "1,234.56");
        assert_eq!(display_money(dec("50000.00")), "50,000.00");
        assert_eq!(display_money(dec("12345678.90")), "12,345,678.90");
        assert_eq!(display_money(dec("160")), "160.00");
        assert_eq!(display_money(dec("-500.00")), "-500.00");
        assert_eq!(display_money(dec("0")), "0.00");
    }

    #[test]
    fn test_normalize_full_and_unknown_slots() {
        let mut map = FieldMap::new();
        map.commit(
            FieldSlot::TotalDue,
            FieldValue::Money(dec("3200.00")),
            "direct-label",
        );
        map.commit(
            FieldSlot::StatementDate,
            FieldValue::Date(NaiveDate::from_ymd_opt(2025, 8, 15).unwrap()),
            "keyword-proximity",
        );

        let summary = normalize(IssuerId::Generic, map, vec!["note".to_string()]);

        assert_eq!(summary.get(FieldSlot::TotalDue).display(), "3,200.00");
        assert_eq!(summary.get(FieldSlot::StatementDate).display(), "2025-08-15");
        assert!(summary.get(FieldSlot::CreditLimit).is_unknown());

        let flat = summary.flat_map();
        assert_eq!(flat["total_due"], "3,200.00");
        assert_eq!(flat["credit_limit"], UNKNOWN_SENTINEL);

        assert_eq!(
            summary.diagnostics.provenance.get(&FieldSlot::TotalDue),
            Some(&"direct-label".to_string())
        );
        assert_eq!(summary.diagnostics.notes, vec!["note".to_string()]);
    }
}
