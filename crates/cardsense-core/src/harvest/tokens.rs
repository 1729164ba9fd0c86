//! Raw token types and lenient money/date parsing.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::str::FromStr;

use super::patterns::{DATE_NUMERIC, DATE_TEXTUAL_DMY, DATE_TEXTUAL_MDY, MONEY_PATTERN};
use crate::models::FieldSlot;

/// What a harvested token is, with its parsed value.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    /// A currency-like amount.
    Money(Decimal),
    /// A date-like token.
    Date(NaiveDate),
    /// A label fragment naming a field slot (generic vocabulary).
    Label(FieldSlot),
}

/// A token extracted from one source line. Immutable once harvested.
#[derive(Debug, Clone, PartialEq)]
pub struct RawToken {
    /// Byte span within the line text.
    pub span: (usize, usize),
    /// The matched source text.
    pub text: String,
    pub kind: TokenKind,
}

impl RawToken {
    pub fn money(&self) -> Option<Decimal> {
        match self.kind {
            TokenKind::Money(m) => Some(m),
            _ => None,
        }
    }

    pub fn date(&self) -> Option<NaiveDate> {
        match self.kind {
            TokenKind::Date(d) => Some(d),
            _ => None,
        }
    }

    pub fn label(&self) -> Option<FieldSlot> {
        match self.kind {
            TokenKind::Label(slot) => Some(slot),
            _ => None,
        }
    }
}

/// A numeric token refined from a money-kind [`RawToken`].
#[derive(Debug, Clone, PartialEq)]
pub struct NumericToken {
    pub value: Decimal,
    pub original: String,
    pub span: (usize, usize),
}

/// Parse a currency-like string into a decimal.
///
/// Strips currency symbols and thousands separators; a trailing `Cr`
/// marker flips the sign (a credit reduces the amount owed), `Dr`
/// leaves it positive. Returns `None` on irrecoverable text.
pub fn parse_money(raw: &str) -> Option<Decimal> {
    let lower = raw.trim().to_lowercase();
    let (body, credit) = if let Some(stripped) = lower.strip_suffix("cr") {
        (stripped.trim_end(), true)
    } else if let Some(stripped) = lower.strip_suffix("dr") {
        (stripped.trim_end(), false)
    } else {
        (lower.as_str(), false)
    };

    let cleaned: String = body
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
        .collect();
    if cleaned.is_empty() {
        return None;
    }

    let value = Decimal::from_str(&cleaned).ok()?;
    Some(if credit { -value } else { value })
}

/// Scan a line for currency-like tokens.
pub fn scan_money(line: &str) -> Vec<NumericToken> {
    MONEY_PATTERN
        .find_iter(line)
        .filter_map(|m| {
            parse_money(m.as_str()).map(|value| NumericToken {
                value,
                original: m.as_str().to_string(),
                span: (m.start(), m.end()),
            })
        })
        .collect()
}

/// A date token with its source span.
#[derive(Debug, Clone, PartialEq)]
pub struct DateToken {
    pub value: NaiveDate,
    pub original: String,
    pub span: (usize, usize),
}

/// Scan a line for date-like tokens in numeric and textual forms.
pub fn scan_dates(line: &str) -> Vec<DateToken> {
    let mut found: Vec<DateToken> = Vec::new();

    for caps in DATE_NUMERIC.captures_iter(line) {
        let day: u32 = caps[1].parse().unwrap_or(0);
        let month: u32 = caps[2].parse().unwrap_or(0);
        let year = parse_year(&caps[3]);
        if let Some(date) = day_first_date(day, month, year) {
            push_date(&mut found, caps.get(0).unwrap(), date);
        }
    }

    for caps in DATE_TEXTUAL_DMY.captures_iter(line) {
        let day: u32 = caps[1].parse().unwrap_or(0);
        let month = month_number(&caps[2]);
        let year: i32 = caps[3].parse().unwrap_or(0);
        if let Some(date) = NaiveDate::from_ymd_opt(year, month, day) {
            push_date(&mut found, caps.get(0).unwrap(), date);
        }
    }

    for caps in DATE_TEXTUAL_MDY.captures_iter(line) {
        let month = month_number(&caps[1]);
        let day: u32 = caps[2].parse().unwrap_or(0);
        let year: i32 = caps[3].parse().unwrap_or(0);
        if let Some(date) = NaiveDate::from_ymd_opt(year, month, day) {
            push_date(&mut found, caps.get(0).unwrap(), date);
        }
    }

    found.sort_by_key(|t| t.span.0);
    found
}

fn push_date(found: &mut Vec<DateToken>, m: regex::Match<'_>, date: NaiveDate) {
    // Drop matches overlapping an already-found token (the textual
    // patterns can partially re-match numeric forms).
    if found.iter().any(|t| m.start() < t.span.1 && t.span.0 < m.end()) {
        return;
    }
    found.push(DateToken {
        value: date,
        original: m.as_str().to_string(),
        span: (m.start(), m.end()),
    });
}

/// Interpret day/month in DD/MM order, falling back to MM/DD when the
/// day-first reading is not a valid calendar date.
fn day_first_date(day: u32, month: u32, year: i32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, day).or_else(|| NaiveDate::from_ymd_opt(year, day, month))
}

fn parse_year(s: &str) -> i32 {
    let year: i32 = s.parse().unwrap_or(0);
    if year < 100 {
        // Two-digit year: 00-50 are 2000s, 51-99 are 1900s.
        if year <= 50 { 2000 + year } else { 1900 + year }
    } else {
        year
    }
}

fn month_number(name: &str) -> u32 {
    match name.to_lowercase().get(..3) {
        Some("jan") => 1,
        Some("feb") => 2,
        Some("mar") => 3,
        Some("apr") => 4,
        Some("may") => 5,
        Some("jun") => 6,
        Some("jul") => 7,
        Some("aug") => 8,
        Some("sep") => 9,
        Some("oct") => 10,
        Some("nov") => 11,
        Some("dec") => 12,
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_parse_money_plain() {
        assert_eq!(parse_money("3,200.00"), Some(dec("3200.00")));
        assert_eq!(parse_money("160.00"), Some(dec("160.00")));
    }

    #[test]
    fn test_parse_money_symbols() {
        assert_eq!(parse_money("₹ 50,000.00"), Some(dec("50000.00")));
        assert_eq!(parse_money("Rs. 1,234.56"), Some(dec("1234.56")));
        assert_eq!(parse_money("INR 42,350.50"), Some(dec("42350.50")));
        assert_eq!(parse_money("$99.99"), Some(dec("99.99")));
    }

    #[test]
    fn test_parse_money_lakh_grouping() {
        assert_eq!(parse_money("1,00,000.00"), Some(dec("100000.00")));
    }

    #[test]
    fn test_parse_money_credit_debit_markers() {
        assert_eq!(parse_money("500.00 Cr"), Some(dec("-500.00")));
        assert_eq!(parse_money("500.00 Dr"), Some(dec("500.00")));
    }

    #[test]
    fn test_parse_money_irrecoverable() {
        assert_eq!(parse_money("N/A"), None);
        assert_eq!(parse_money(""), None);
        assert_eq!(parse_money("1.2.3"), None);
    }

    #[test]
    fn test_scan_money_cluster_line() {
        let tokens = scan_money("15/08/2025  50,000.00  42,350.50  3,200.00  160.00");
        let values: Vec<Decimal> = tokens.iter().map(|t| t.value).collect();
        assert_eq!(
            values,
            vec![dec("50000.00"), dec("42350.50"), dec("3200.00"), dec("160.00")]
        );
    }

    #[test]
    fn test_scan_money_ignores_three_decimal_numbers() {
        assert!(scan_money("version 1.234").is_empty());
    }

    #[test]
    fn test_scan_dates_numeric() {
        let tokens = scan_dates("Statement date: 15/08/2025");
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].value, NaiveDate::from_ymd_opt(2025, 8, 15).unwrap());
    }

    #[test]
    fn test_scan_dates_month_day_fallback() {
        // 08/15 is invalid day-first, valid month-first.
        let tokens = scan_dates("due 08/15/2025");
        assert_eq!(tokens[0].value, NaiveDate::from_ymd_opt(2025, 8, 15).unwrap());
    }

    #[test]
    fn test_scan_dates_textual_forms() {
        let dmy = scan_dates("15 August 2025");
        assert_eq!(dmy[0].value, NaiveDate::from_ymd_opt(2025, 8, 15).unwrap());

        let mdy = scan_dates("August 15, 2025");
        assert_eq!(mdy[0].value, NaiveDate::from_ymd_opt(2025, 8, 15).unwrap());

        let short = scan_dates("3rd Sep 2025");
        assert_eq!(short[0].value, NaiveDate::from_ymd_opt(2025, 9, 3).unwrap());
    }

    #[test]
    fn test_scan_dates_range_yields_both_endpoints() {
        let tokens = scan_dates("01/07/2025 to 31/07/2025");
        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[1].value, NaiveDate::from_ymd_opt(2025, 7, 31).unwrap());
    }

    #[test]
    fn test_two_digit_year() {
        let tokens = scan_dates("15/08/25");
        assert_eq!(tokens[0].value, NaiveDate::from_ymd_opt(2025, 8, 15).unwrap());
    }
}
