//! The finalized statement summary returned to callers.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::fields::FieldSlot;
use crate::issuer::IssuerId;

/// Sentinel string used for unresolved fields in the flat output map.
pub const UNKNOWN_SENTINEL: &str = "N/A";

/// A canonical, display-ready value for one field slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CanonicalValue {
    /// A currency amount, rounded to two decimals, with a grouped
    /// display string (e.g. `50,000.00`).
    Money { amount: Decimal, display: String },

    /// A date in canonical `YYYY-MM-DD` form.
    Date { date: NaiveDate, display: String },

    /// The field could not be resolved. This is an expected outcome,
    /// not an error.
    Unknown,
}

impl CanonicalValue {
    /// The display string, or the unknown sentinel.
    pub fn display(&self) -> &str {
        match self {
            CanonicalValue::Money { display, .. } => display,
            CanonicalValue::Date { display, .. } => display,
            CanonicalValue::Unknown => UNKNOWN_SENTINEL,
        }
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, CanonicalValue::Unknown)
    }

    pub fn as_money(&self) -> Option<Decimal> {
        match self {
            CanonicalValue::Money { amount, .. } => Some(*amount),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            CanonicalValue::Date { date, .. } => Some(*date),
            _ => None,
        }
    }
}

/// Diagnostic metadata about how fields were resolved.
///
/// Strictly optional for callers: the flat field map is the contract,
/// provenance is for humans debugging an extraction.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Diagnostics {
    /// Which strategy resolved each field.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub provenance: BTreeMap<FieldSlot, String>,

    /// Repairs and other noteworthy events during resolution.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub notes: Vec<String>,
}

/// The frozen result of analyzing one document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatementSummary {
    /// Issuer the document was classified as.
    pub issuer: IssuerId,

    /// One canonical value per field slot. Every slot is present;
    /// unresolved slots hold [`CanonicalValue::Unknown`].
    pub fields: BTreeMap<FieldSlot, CanonicalValue>,

    /// Optional diagnostic metadata.
    #[serde(default)]
    pub diagnostics: Diagnostics,
}

impl StatementSummary {
    /// The value for a slot. Every slot always has an entry.
    pub fn get(&self, slot: FieldSlot) -> &CanonicalValue {
        static UNKNOWN: CanonicalValue = CanonicalValue::Unknown;
        self.fields.get(&slot).unwrap_or(&UNKNOWN)
    }

    /// Flatten into the external contract: field name to canonical
    /// string, with the `N/A` sentinel for unresolved fields.
    pub fn flat_map(&self) -> BTreeMap<&'static str, String> {
        FieldSlot::ALL
            .iter()
            .map(|slot| (slot.name(), self.get(*slot).display().to_string()))
            .collect()
    }

    /// Count of resolved (non-unknown) fields.
    pub fn resolved_count(&self) -> usize {
        self.fields.values().filter(|v| !v.is_unknown()).count()
    }
}
