//! Issuer profiles and document classification.
//!
//! Profiles are data, not behavior: each bundles fingerprint substrings,
//! label synonym overrides and a strategy-order hint. Adding an issuer is
//! a data change (extend the builtin list or load a JSON file), not a
//! code change.

use std::collections::BTreeMap;

use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ProfileError;
use crate::models::FieldSlot;

/// Closed set of recognized issuers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IssuerId {
    Hdfc,
    Icici,
    Axis,
    Sbi,
    Generic,
}

impl IssuerId {
    pub fn name(self) -> &'static str {
        match self {
            IssuerId::Hdfc => "hdfc",
            IssuerId::Icici => "icici",
            IssuerId::Axis => "axis",
            IssuerId::Sbi => "sbi",
            IssuerId::Generic => "generic",
        }
    }
}

/// Which label list a strategy consults first.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LabelOrder {
    /// Issuer synonym overrides before the generic vocabulary.
    #[default]
    IssuerFirst,
    /// Generic vocabulary before issuer overrides.
    GenericFirst,
}

/// One document-template family: fingerprints, label vocabulary
/// overrides, and a strategy-order hint.
///
/// Hints may only reorder sibling label lists; they can never skip the
/// constraint-assignment or statistical-fallback stages.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssuerProfile {
    pub issuer: IssuerId,

    /// Lowercase substrings that identify this issuer's documents.
    pub fingerprints: Vec<String>,

    /// Label synonyms tried in addition to the generic vocabulary.
    #[serde(default)]
    pub synonyms: BTreeMap<FieldSlot, Vec<String>>,

    /// Ordering hint for label lists.
    #[serde(default)]
    pub label_order: LabelOrder,
}

impl IssuerProfile {
    fn generic() -> Self {
        Self {
            issuer: IssuerId::Generic,
            fingerprints: Vec::new(),
            synonyms: BTreeMap::new(),
            label_order: LabelOrder::default(),
        }
    }
}

/// An ordered set of issuer profiles. Priority order is the list order;
/// the generic profile always matches last.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileSet {
    profiles: Vec<IssuerProfile>,
}

impl ProfileSet {
    /// The builtin profiles for the issuers this engine ships with.
    pub fn builtin() -> Self {
        let profiles = vec![
            IssuerProfile {
                issuer: IssuerId::Hdfc,
                fingerprints: vec!["hdfc bank".into(), "hdfc".into()],
                synonyms: synonym_map(&[
                    (FieldSlot::TotalDue, &["total dues"]),
                    (FieldSlot::AvailableCredit, &["available credit limit"]),
                    (FieldSlot::CreditLimit, &["credit limit"]),
                ]),
                label_order: LabelOrder::IssuerFirst,
            },
            IssuerProfile {
                issuer: IssuerId::Icici,
                fingerprints: vec!["icici bank".into(), "icici".into()],
                synonyms: synonym_map(&[
                    (FieldSlot::TotalDue, &["total amount due"]),
                    (FieldSlot::MinimumDue, &["minimum amount due"]),
                ]),
                label_order: LabelOrder::IssuerFirst,
            },
            IssuerProfile {
                issuer: IssuerId::Axis,
                fingerprints: vec!["axis bank".into(), "axis".into()],
                synonyms: synonym_map(&[
                    (FieldSlot::TotalDue, &["total payment due"]),
                    (FieldSlot::MinimumDue, &["minimum payment due"]),
                    (FieldSlot::StatementDate, &["statement generation date"]),
                ]),
                label_order: LabelOrder::IssuerFirst,
            },
            IssuerProfile {
                issuer: IssuerId::Sbi,
                fingerprints: vec![
                    "sbi card".into(),
                    "state bank of india".into(),
                    "sbi".into(),
                ],
                synonyms: synonym_map(&[
                    (FieldSlot::TotalDue, &["total amount due"]),
                    (FieldSlot::MinimumDue, &["minimum amount due"]),
                ]),
                label_order: LabelOrder::IssuerFirst,
            },
            IssuerProfile::generic(),
        ];
        Self { profiles }
    }

    /// Load profiles from a JSON file. The generic profile is appended
    /// automatically when the file does not include one.
    pub fn from_file(path: &std::path::Path) -> Result<Self, ProfileError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ProfileError::Read(format!("{}: {}", path.display(), e)))?;
        Self::from_json(&content)
    }

    /// Parse profiles from a JSON array.
    pub fn from_json(json: &str) -> Result<Self, ProfileError> {
        let mut profiles: Vec<IssuerProfile> =
            serde_json::from_str(json).map_err(|e| ProfileError::Invalid(e.to_string()))?;

        for profile in &profiles {
            if profile.issuer != IssuerId::Generic && profile.fingerprints.is_empty() {
                return Err(ProfileError::Invalid(format!(
                    "profile {} has no fingerprints",
                    profile.issuer.name()
                )));
            }
        }

        if !profiles.iter().any(|p| p.issuer == IssuerId::Generic) {
            profiles.push(IssuerProfile::generic());
        }
        Ok(Self { profiles })
    }

    /// Classify harvested text against fingerprints, in priority order.
    ///
    /// Case-insensitive; unmatched text always yields the generic
    /// profile, never an error.
    pub fn classify(&self, text: &str) -> &IssuerProfile {
        let haystack = text.to_lowercase();
        for profile in &self.profiles {
            if profile
                .fingerprints
                .iter()
                .any(|fp| haystack.contains(fp.as_str()))
            {
                debug!(issuer = profile.issuer.name(), "classified document issuer");
                return profile;
            }
        }
        self.profiles
            .iter()
            .find(|p| p.issuer == IssuerId::Generic)
            .unwrap_or_else(|| self.profiles.last().expect("profile set is never empty"))
    }

    pub fn iter(&self) -> impl Iterator<Item = &IssuerProfile> {
        self.profiles.iter()
    }
}

fn synonym_map(entries: &[(FieldSlot, &[&str])]) -> BTreeMap<FieldSlot, Vec<String>> {
    entries
        .iter()
        .map(|(slot, list)| (*slot, list.iter().map(|s| s.to_string()).collect()))
        .collect()
}

/// Generic label synonyms, shared by every issuer. Longer synonyms are
/// listed first so that overlap resolution favors the specific label.
pub fn generic_synonyms(slot: FieldSlot) -> &'static [&'static str] {
    match slot {
        FieldSlot::StatementDate => &[
            "statement generation date",
            "statement period",
            "statement date",
            "billing period",
            "billing date",
            "bill date",
        ],
        FieldSlot::PaymentDueDate => &[
            "payment due date",
            "pay by date",
            "due date",
            "due by",
            "pay by",
        ],
        FieldSlot::CreditLimit => &[
            "sanctioned credit limit",
            "total credit limit",
            "credit limit",
            "credit line",
        ],
        FieldSlot::AvailableCredit => &[
            "available credit limit",
            "available credit",
            "available limit",
            "credit available",
        ],
        FieldSlot::TotalDue => &[
            "total amount due",
            "total payment due",
            "total dues",
            "total due",
            "amount due",
            "closing balance",
            "new balance",
        ],
        FieldSlot::MinimumDue => &[
            "minimum amount due",
            "minimum payment due",
            "min amount due",
            "minimum payment",
            "minimum due",
            "min due",
        ],
        FieldSlot::PreviousBalance => &[
            "previous statement balance",
            "last statement balance",
            "previous balance",
            "opening balance",
        ],
        FieldSlot::TotalPayments => &[
            "payments and credits",
            "payments & credits",
            "payments received",
            "total payments",
            "payments",
        ],
        FieldSlot::TotalPurchases => &[
            "purchases and debits",
            "purchases & debits",
            "total purchases",
            "purchases",
        ],
        FieldSlot::OtherCharges => &[
            "fees and charges",
            "fees & charges",
            "finance charges",
            "other charges",
            "other debits",
        ],
    }
}

/// A label occurrence within a line of text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LabelMatch {
    pub slot: FieldSlot,
    pub span: (usize, usize),
}

/// A flattened, ordered label vocabulary used for matching.
#[derive(Debug, Clone)]
pub struct Vocabulary {
    /// (slot, lowercase synonym) in lookup priority order.
    entries: Vec<(FieldSlot, String)>,
}

lazy_static! {
    static ref GENERIC_VOCABULARY: Vocabulary = Vocabulary::from_entries(
        FieldSlot::ALL
            .iter()
            .flat_map(|slot| generic_synonyms(*slot).iter().map(|s| (*slot, s.to_string())))
            .collect(),
    );
}

impl Vocabulary {
    fn from_entries(entries: Vec<(FieldSlot, String)>) -> Self {
        Self { entries }
    }

    /// The generic vocabulary, used at harvest time before any issuer
    /// is known.
    pub fn generic() -> &'static Vocabulary {
        &GENERIC_VOCABULARY
    }

    /// Build the vocabulary for an issuer profile, ordering issuer
    /// overrides against the generic lists per the profile hint.
    pub fn for_profile(profile: &IssuerProfile) -> Vocabulary {
        let mut entries: Vec<(FieldSlot, String)> = Vec::new();
        for slot in FieldSlot::ALL {
            let issuer: Vec<(FieldSlot, String)> = profile
                .synonyms
                .get(&slot)
                .map(|list| list.iter().map(|s| (slot, s.to_lowercase())).collect())
                .unwrap_or_default();
            let generic: Vec<(FieldSlot, String)> = generic_synonyms(slot)
                .iter()
                .map(|s| (slot, s.to_string()))
                .collect();
            match profile.label_order {
                LabelOrder::IssuerFirst => {
                    entries.extend(issuer);
                    entries.extend(generic);
                }
                LabelOrder::GenericFirst => {
                    entries.extend(generic);
                    entries.extend(issuer);
                }
            }
        }
        Self::from_entries(entries)
    }

    /// Synonyms for one slot, in lookup priority order.
    pub fn synonyms(&self, slot: FieldSlot) -> impl Iterator<Item = &str> {
        self.entries
            .iter()
            .filter(move |(s, _)| *s == slot)
            .map(|(_, syn)| syn.as_str())
    }

    /// Find all label occurrences in a line.
    ///
    /// Overlapping matches are resolved longest-wins, so `minimum
    /// amount due` beats the `amount due` fragment inside it.
    pub fn matches(&self, text: &str) -> Vec<LabelMatch> {
        let haystack = text.to_lowercase();
        let mut raw: Vec<LabelMatch> = Vec::new();

        for (slot, synonym) in &self.entries {
            let mut offset = 0;
            while let Some(pos) = haystack[offset..].find(synonym.as_str()) {
                let start = offset + pos;
                let end = start + synonym.len();
                if on_word_boundary(&haystack, start, end) {
                    raw.push(LabelMatch { slot: *slot, span: (start, end) });
                }
                offset = start + 1;
            }
        }

        // Longest match wins on overlap; ties go to vocabulary order.
        raw.sort_by_key(|m| (m.span.0, usize::MAX - (m.span.1 - m.span.0)));
        let mut kept: Vec<LabelMatch> = Vec::new();
        for m in raw {
            let contained = kept
                .iter()
                .any(|k| m.span.0 < k.span.1 && k.span.0 < m.span.1);
            if !contained {
                kept.push(m);
            }
        }
        kept
    }
}

fn on_word_boundary(text: &str, start: usize, end: usize) -> bool {
    let before_ok = start == 0
        || text[..start]
            .chars()
            .next_back()
            .map(|c| !c.is_alphanumeric())
            .unwrap_or(true);
    let after_ok = end >= text.len()
        || text[end..]
            .chars()
            .next()
            .map(|c| !c.is_alphanumeric())
            .unwrap_or(true);
    before_ok && after_ok
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_classify_known_issuers() {
        let profiles = ProfileSet::builtin();
        assert_eq!(
            profiles.classify("HDFC Bank Credit Card Statement").issuer,
            IssuerId::Hdfc
        );
        assert_eq!(
            profiles.classify("ICICI Bank statement of account").issuer,
            IssuerId::Icici
        );
        assert_eq!(profiles.classify("AXIS BANK LTD").issuer, IssuerId::Axis);
        assert_eq!(profiles.classify("SBI Card monthly statement").issuer, IssuerId::Sbi);
    }

    #[test]
    fn test_classify_unmatched_is_generic() {
        let profiles = ProfileSet::builtin();
        assert_eq!(profiles.classify("Some Unknown Bank").issuer, IssuerId::Generic);
        assert_eq!(profiles.classify("").issuer, IssuerId::Generic);
    }

    #[test]
    fn test_classify_priority_order_is_total() {
        // A document mentioning two issuers resolves to the first in
        // priority order, deterministically.
        let profiles = ProfileSet::builtin();
        assert_eq!(
            profiles.classify("transfer from ICICI to HDFC bank").issuer,
            IssuerId::Hdfc
        );
    }

    #[test]
    fn test_profiles_from_json() {
        let json = r#"[
            {
                "issuer": "hdfc",
                "fingerprints": ["hdfc"],
                "synonyms": {"total_due": ["total dues"]}
            }
        ]"#;
        let profiles = ProfileSet::from_json(json).unwrap();
        assert_eq!(profiles.classify("hdfc bank").issuer, IssuerId::Hdfc);
        // Generic fallback appended automatically.
        assert_eq!(profiles.classify("unknown").issuer, IssuerId::Generic);
    }

    #[test]
    fn test_profiles_from_json_rejects_missing_fingerprints() {
        let json = r#"[{"issuer": "hdfc", "fingerprints": []}]"#;
        assert!(ProfileSet::from_json(json).is_err());
    }

    #[test]
    fn test_vocabulary_longest_match_wins() {
        let vocab = Vocabulary::generic();
        let matches = vocab.matches("Minimum Amount Due: 160.00");
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].slot, FieldSlot::MinimumDue);
    }

    #[test]
    fn test_vocabulary_distinguishes_limit_labels() {
        let vocab = Vocabulary::generic();
        let matches = vocab.matches("Credit Limit  Available Credit Limit");
        let slots: Vec<FieldSlot> = matches.iter().map(|m| m.slot).collect();
        assert_eq!(slots, vec![FieldSlot::CreditLimit, FieldSlot::AvailableCredit]);
    }

    #[test]
    fn test_vocabulary_word_boundaries() {
        let vocab = Vocabulary::generic();
        // "prepayments" must not match the "payments" synonym.
        assert!(vocab.matches("prepayments summary").is_empty());
    }

    #[test]
    fn test_profile_vocabulary_order_hint() {
        let profiles = ProfileSet::builtin();
        let hdfc = profiles.classify("hdfc");
        let vocab = Vocabulary::for_profile(hdfc);
        let first = vocab.synonyms(FieldSlot::TotalDue).next().unwrap();
        assert_eq!(first, "total dues");
    }
}
