//! Semantic field slots and the first-writer-wins field map.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One semantic output field of the engine.
///
/// The set is closed: strategies can only ever propose values for these
/// slots, and the final summary contains exactly one entry per slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldSlot {
    StatementDate,
    PaymentDueDate,
    CreditLimit,
    AvailableCredit,
    TotalDue,
    MinimumDue,
    PreviousBalance,
    TotalPayments,
    TotalPurchases,
    OtherCharges,
}

/// The kind of value a slot holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Money,
    Date,
}

impl FieldSlot {
    /// All slots, in canonical output order.
    pub const ALL: [FieldSlot; 10] = [
        FieldSlot::StatementDate,
        FieldSlot::PaymentDueDate,
        FieldSlot::CreditLimit,
        FieldSlot::AvailableCredit,
        FieldSlot::TotalDue,
        FieldSlot::MinimumDue,
        FieldSlot::PreviousBalance,
        FieldSlot::TotalPayments,
        FieldSlot::TotalPurchases,
        FieldSlot::OtherCharges,
    ];

    /// The value kind this slot holds.
    pub fn kind(self) -> FieldKind {
        match self {
            FieldSlot::StatementDate | FieldSlot::PaymentDueDate => FieldKind::Date,
            _ => FieldKind::Money,
        }
    }

    /// Stable external name, used as the key in the flat output map.
    pub fn name(self) -> &'static str {
        match self {
            FieldSlot::StatementDate => "statement_date",
            FieldSlot::PaymentDueDate => "payment_due_date",
            FieldSlot::CreditLimit => "credit_limit",
            FieldSlot::AvailableCredit => "available_credit",
            FieldSlot::TotalDue => "total_due",
            FieldSlot::MinimumDue => "minimum_due",
            FieldSlot::PreviousBalance => "previous_balance",
            FieldSlot::TotalPayments => "total_payments",
            FieldSlot::TotalPurchases => "total_purchases",
            FieldSlot::OtherCharges => "other_charges",
        }
    }

    /// Whether a money value in this slot must be non-negative.
    ///
    /// PreviousBalance is exempt: a statement may open in credit.
    pub fn requires_non_negative(self) -> bool {
        !matches!(
            self,
            FieldSlot::PreviousBalance | FieldSlot::StatementDate | FieldSlot::PaymentDueDate
        )
    }
}

/// A resolved value for a slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Money(Decimal),
    Date(NaiveDate),
}

impl FieldValue {
    pub fn as_money(&self) -> Option<Decimal> {
        match self {
            FieldValue::Money(m) => Some(*m),
            FieldValue::Date(_) => None,
        }
    }

    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            FieldValue::Date(d) => Some(*d),
            FieldValue::Money(_) => None,
        }
    }

    /// Whether this value matches the kind of the given slot.
    pub fn matches_kind(&self, slot: FieldSlot) -> bool {
        match (self, slot.kind()) {
            (FieldValue::Money(_), FieldKind::Money) => true,
            (FieldValue::Date(_), FieldKind::Date) => true,
            _ => false,
        }
    }
}

/// A slot value together with the name of the strategy that resolved it.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedField {
    pub value: FieldValue,
    /// Strategy (or repair step) that produced the value, for diagnostics.
    pub strategy: &'static str,
}

/// The mutable accumulator threaded through the strategy chain.
///
/// Strategies fill slots only where absent: the first writer wins, and
/// later strategies never overwrite. The map is created empty per
/// document, populated strategy by strategy, finalized by reconciliation
/// and then frozen into a [`crate::models::summary::StatementSummary`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldMap {
    slots: BTreeMap<FieldSlot, ResolvedField>,
}

impl FieldMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Commit a value to a slot if, and only if, the slot is still empty
    /// and the value kind matches the slot kind. Returns whether the
    /// value was committed.
    pub fn commit(&mut self, slot: FieldSlot, value: FieldValue, strategy: &'static str) -> bool {
        if self.slots.contains_key(&slot) || !value.matches_kind(slot) {
            return false;
        }
        self.slots.insert(slot, ResolvedField { value, strategy });
        true
    }

    /// Overwrite a slot unconditionally. Reserved for the reconciliation
    /// repair path; strategies must use [`FieldMap::commit`].
    pub fn repair(&mut self, slot: FieldSlot, value: FieldValue, strategy: &'static str) {
        self.slots.insert(slot, ResolvedField { value, strategy });
    }

    /// Revert a slot to unknown. Reserved for reconciliation.
    pub fn clear(&mut self, slot: FieldSlot) {
        self.slots.remove(&slot);
    }

    pub fn get(&self, slot: FieldSlot) -> Option<&ResolvedField> {
        self.slots.get(&slot)
    }

    pub fn is_filled(&self, slot: FieldSlot) -> bool {
        self.slots.contains_key(&slot)
    }

    /// Resolved money value for a slot, if any.
    pub fn money(&self, slot: FieldSlot) -> Option<Decimal> {
        self.slots.get(&slot).and_then(|r| r.value.as_money())
    }

    /// Resolved date value for a slot, if any.
    pub fn date(&self, slot: FieldSlot) -> Option<NaiveDate> {
        self.slots.get(&slot).and_then(|r| r.value.as_date())
    }

    /// All resolved money values, in slot order.
    pub fn money_values(&self) -> Vec<Decimal> {
        self.slots.values().filter_map(|r| r.value.as_money()).collect()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&FieldSlot, &ResolvedField)> {
        self.slots.iter()
    }
}
