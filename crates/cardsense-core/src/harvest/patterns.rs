//! Common regex patterns for token harvesting.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Currency-like tokens: optional symbol, optional thousands
    // separators (western 1,234,567.00 or lakh 1,00,000.00 grouping),
    // exactly two decimal digits, optional trailing debit/credit marker.
    pub static ref MONEY_PATTERN: Regex = Regex::new(
        r"(?i)(?:(?:₹|\$|rs\.?|inr)\s*)?(\d{1,3}(?:,\d{2,3})+|\d+)\.(\d{2})(?:\s?(cr|dr))?\b"
    ).unwrap();

    // Numeric dates: DD/MM/YYYY with /, - or . separators, 2- or
    // 4-digit year.
    pub static ref DATE_NUMERIC: Regex = Regex::new(
        r"\b(\d{1,2})[/\-.](\d{1,2})[/\-.](\d{4}|\d{2})\b"
    ).unwrap();

    // Textual dates, day first: "15 August 2025", "3rd Aug 2025".
    pub static ref DATE_TEXTUAL_DMY: Regex = Regex::new(
        r"(?i)\b(\d{1,2})(?:st|nd|rd|th)?\s+(january|february|march|april|may|june|july|august|september|october|november|december|jan|feb|mar|apr|jun|jul|aug|sept|sep|oct|nov|dec)\.?,?\s+(\d{4})\b"
    ).unwrap();

    // Textual dates, month first: "August 15, 2025".
    pub static ref DATE_TEXTUAL_MDY: Regex = Regex::new(
        r"(?i)\b(january|february|march|april|may|june|july|august|september|october|november|december|jan|feb|mar|apr|jun|jul|aug|sept|sep|oct|nov|dec)\.?\s+(\d{1,2})(?:st|nd|rd|th)?,?\s+(\d{4})\b"
    ).unwrap();

    // Separator between the endpoints of a date range. The second
    // endpoint is the preferred anchor when only one date is needed.
    pub static ref RANGE_SEPARATOR: Regex = Regex::new(
        r"(?i)^\s*(?:to|till|through)\s*$"
    ).unwrap();

    // Cell boundaries when treating a text line as a pseudo table row.
    pub static ref CELL_SPLIT: Regex = Regex::new(
        r"\s{2,}|\t|\|"
    ).unwrap();
}
