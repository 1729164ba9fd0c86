//! Numeric-cluster constraint assignment.
//!
//! Given a line carrying several undistinguished currency tokens and no
//! label context, decide which semantic field each number is. Every
//! permutation of values onto the open slots is scored against a small
//! table of named invariant checks; the best-scoring permutation across
//! all candidate clusters in the document wins, so a spurious numeric
//! coincidence early in the document cannot pre-empt a stronger match
//! later. The search is O(k!) with k bounded by configuration.

use rust_decimal::Decimal;
use tracing::{debug, trace};

use super::{InferenceContext, Proposal, Strategy};
use crate::models::{ClusterConfig, FieldMap, FieldSlot};

/// Primary cluster fields, in assignment order.
const PRIMARY_SET: [FieldSlot; 4] = [
    FieldSlot::CreditLimit,
    FieldSlot::AvailableCredit,
    FieldSlot::TotalDue,
    FieldSlot::MinimumDue,
];

/// Secondary (account activity) cluster fields, in assignment order.
const SECONDARY_SET: [FieldSlot; 4] = [
    FieldSlot::TotalPayments,
    FieldSlot::OtherCharges,
    FieldSlot::TotalPurchases,
    FieldSlot::PreviousBalance,
];

pub struct ClusterAssignment;

impl Strategy for ClusterAssignment {
    fn name(&self) -> &'static str {
        "cluster-assignment"
    }

    fn propose(&self, ctx: &InferenceContext<'_>, map: &FieldMap) -> Vec<Proposal> {
        let cfg = &ctx.config.cluster;
        let clusters = candidate_clusters(ctx, cfg);
        if clusters.is_empty() {
            return Vec::new();
        }

        let mut proposals: Vec<Proposal> = Vec::new();
        let mut used_lines: Vec<usize> = Vec::new();

        // Primary set first; once a primary cluster has been resolved
        // for this document, remaining clusters are tried as secondary.
        for set in [&PRIMARY_SET, &SECONDARY_SET] {
            let open: Vec<FieldSlot> = set
                .iter()
                .copied()
                .filter(|slot| resolved_money(map, &proposals, *slot).is_none())
                .collect();
            if open.is_empty() {
                continue;
            }
            if let Some(best) = best_assignment(&clusters, &used_lines, &open, map, &proposals, cfg)
            {
                debug!(
                    line = best.line,
                    score = best.score,
                    slots = best.assignment.len(),
                    "cluster assignment accepted"
                );
                used_lines.push(best.line);
                for (slot, value) in best.assignment {
                    proposals.push(Proposal::money(slot, value));
                }
            }
        }
        proposals
    }
}

/// Lines with 2..=k undistinguished currency tokens and no label
/// context are candidate clusters.
fn candidate_clusters(ctx: &InferenceContext<'_>, cfg: &ClusterConfig) -> Vec<(usize, Vec<Decimal>)> {
    ctx.harvest
        .lines
        .iter()
        .enumerate()
        .filter(|(_, line)| !line.has_labels())
        .filter_map(|(idx, line)| {
            let values: Vec<Decimal> = line.money_tokens().iter().map(|t| t.value).collect();
            (values.len() >= cfg.min_cluster && values.len() <= cfg.max_cluster)
                .then_some((idx, values))
        })
        .collect()
}

/// A value known either from the map (earlier strategies) or from a
/// proposal this strategy already made.
fn resolved_money(map: &FieldMap, proposals: &[Proposal], slot: FieldSlot) -> Option<Decimal> {
    map.money(slot).or_else(|| {
        proposals
            .iter()
            .find(|p| p.slot == slot)
            .and_then(|p| p.value.as_money())
    })
}

struct Candidate {
    line: usize,
    assignment: Vec<(FieldSlot, Decimal)>,
    score: i32,
}

fn best_assignment(
    clusters: &[(usize, Vec<Decimal>)],
    used_lines: &[usize],
    open_slots: &[FieldSlot],
    map: &FieldMap,
    proposals: &[Proposal],
    cfg: &ClusterConfig,
) -> Option<Candidate> {
    let mut best: Option<Candidate> = None;

    for (line, values) in clusters {
        if used_lines.contains(line) {
            continue;
        }
        // Smaller clusters fill a prefix of the slot list; larger ones
        // pick which values to use. Either way the search degrades
        // gracefully instead of assuming k = 4.
        let width = open_slots.len().min(values.len());
        let slots = &open_slots[..width];

        for arrangement in arrangements(values, width) {
            let view = AssignmentView {
                slots,
                values: &arrangement,
                cluster: values,
                map,
                proposals,
                cfg,
            };
            let Some(score) = view.score() else { continue };
            if score < cfg.acceptance_floor {
                continue;
            }

            let candidate = Candidate {
                line: *line,
                assignment: slots.iter().copied().zip(arrangement).collect(),
                score,
            };
            best = Some(match best.take() {
                None => candidate,
                Some(incumbent) => pick_better(incumbent, candidate),
            });
        }
    }
    best
}

/// Higher score wins. Ties prefer the permutation with the larger
/// CreditLimit (a large credit line is less likely to be a due-amount
/// misread), then the larger AvailableCredit. The incumbent survives a
/// full tie, keeping the search deterministic.
fn pick_better(incumbent: Candidate, challenger: Candidate) -> Candidate {
    let key = |c: &Candidate| {
        (
            c.score,
            assigned(c, FieldSlot::CreditLimit),
            assigned(c, FieldSlot::AvailableCredit),
        )
    };
    if key(&challenger) > key(&incumbent) {
        challenger
    } else {
        incumbent
    }
}

fn assigned(candidate: &Candidate, slot: FieldSlot) -> Option<Decimal> {
    candidate
        .assignment
        .iter()
        .find(|(s, _)| *s == slot)
        .map(|(_, v)| *v)
}

/// All ordered selections of `width` values. The first arrangement is
/// the values in document order, which doubles as the tie-break of last
/// resort.
fn arrangements(values: &[Decimal], width: usize) -> Vec<Vec<Decimal>> {
    let mut out = Vec::new();
    let mut current = Vec::with_capacity(width);
    let mut used = vec![false; values.len()];
    build(values, width, &mut used, &mut current, &mut out);
    out
}

fn build(
    values: &[Decimal],
    width: usize,
    used: &mut [bool],
    current: &mut Vec<Decimal>,
    out: &mut Vec<Vec<Decimal>>,
) {
    if current.len() == width {
        out.push(current.clone());
        return;
    }
    for i in 0..values.len() {
        if used[i] {
            continue;
        }
        used[i] = true;
        current.push(values[i]);
        build(values, width, used, current, out);
        current.pop();
        used[i] = false;
    }
}

/// One permutation of cluster values onto open slots, plus everything
/// already resolved, ready for scoring.
struct AssignmentView<'a> {
    slots: &'a [FieldSlot],
    values: &'a [Decimal],
    cluster: &'a [Decimal],
    map: &'a FieldMap,
    proposals: &'a [Proposal],
    cfg: &'a ClusterConfig,
}

/// One named invariant check in the scoring table. `None` means the
/// rule does not apply to this assignment; `Some(true)` adds the
/// weight, `Some(false)` subtracts it.
struct ScoreRule {
    name: &'static str,
    weight: i32,
    check: fn(&AssignmentView<'_>) -> Option<bool>,
}

/// The value table. Weights encode how discriminating each domain
/// invariant is, not per-issuer tuning.
const RULES: [ScoreRule; 7] = [
    ScoreRule {
        name: "limit-covers-available",
        weight: 4,
        check: limit_covers_available,
    },
    ScoreRule {
        name: "minimum-within-total",
        weight: 4,
        check: minimum_within_total,
    },
    ScoreRule {
        name: "limit-is-cluster-max",
        weight: 2,
        check: limit_is_cluster_max,
    },
    ScoreRule {
        name: "due-within-limit-multiple",
        weight: 2,
        check: due_within_limit_multiple,
    },
    ScoreRule {
        name: "minimum-is-small-fraction",
        weight: 3,
        check: minimum_is_small_fraction,
    },
    ScoreRule {
        name: "activity-balances-total",
        weight: 5,
        check: activity_balances_total,
    },
    ScoreRule {
        name: "charges-within-purchases",
        weight: 1,
        check: charges_within_purchases,
    },
];

impl AssignmentView<'_> {
    /// Additive score over the rule table, or `None` when the
    /// assignment is rejected outright.
    fn score(&self) -> Option<i32> {
        // A negative value in a field required non-negative rejects the
        // whole permutation.
        for (slot, value) in self.slots.iter().zip(self.values) {
            if slot.requires_non_negative() && value.is_sign_negative() {
                return None;
            }
        }

        // A value equal to an already-resolved field is the same
        // printed number read twice, not a second fact; assigning it
        // anywhere rejects the permutation.
        let resolved = self.resolved_values();
        if self.values.iter().any(|v| resolved.contains(v)) {
            return None;
        }

        let mut score = 0;
        for rule in &RULES {
            match (rule.check)(self) {
                Some(true) => score += rule.weight,
                Some(false) => {
                    score -= rule.weight;
                    trace!(rule = rule.name, "invariant check failed");
                }
                None => {}
            }
        }
        Some(score)
    }

    /// Value for a slot from this assignment, falling back to what is
    /// already resolved.
    fn get(&self, slot: FieldSlot) -> Option<Decimal> {
        self.assigned(slot)
            .or_else(|| resolved_money(self.map, self.proposals, slot))
    }

    fn assigned(&self, slot: FieldSlot) -> Option<Decimal> {
        self.slots
            .iter()
            .position(|s| *s == slot)
            .map(|i| self.values[i])
    }

    fn any_assigned(&self, slots: &[FieldSlot]) -> bool {
        slots.iter().any(|s| self.assigned(*s).is_some())
    }

    fn resolved_values(&self) -> Vec<Decimal> {
        let mut values = self.map.money_values();
        values.extend(self.proposals.iter().filter_map(|p| p.value.as_money()));
        values
    }
}

fn limit_covers_available(a: &AssignmentView<'_>) -> Option<bool> {
    if !a.any_assigned(&[FieldSlot::CreditLimit, FieldSlot::AvailableCredit]) {
        return None;
    }
    let limit = a.get(FieldSlot::CreditLimit)?;
    let available = a.get(FieldSlot::AvailableCredit)?;
    Some(limit >= available)
}

fn minimum_within_total(a: &AssignmentView<'_>) -> Option<bool> {
    if !a.any_assigned(&[FieldSlot::MinimumDue, FieldSlot::TotalDue]) {
        return None;
    }
    let minimum = a.get(FieldSlot::MinimumDue)?;
    let total = a.get(FieldSlot::TotalDue)?;
    Some(minimum <= total)
}

/// Issuers print the largest number of the block as the limit, so no
/// cluster value may exceed the (assigned or known) credit limit.
fn limit_is_cluster_max(a: &AssignmentView<'_>) -> Option<bool> {
    let limit = a.get(FieldSlot::CreditLimit)?;
    let max = a.cluster.iter().max()?;
    Some(limit >= *max)
}

fn due_within_limit_multiple(a: &AssignmentView<'_>) -> Option<bool> {
    if !a.any_assigned(&[FieldSlot::TotalDue, FieldSlot::CreditLimit]) {
        return None;
    }
    let total = a.get(FieldSlot::TotalDue)?;
    let limit = a.get(FieldSlot::CreditLimit)?;
    Some(total <= limit * a.cfg.max_due_to_limit_ratio)
}

fn minimum_is_small_fraction(a: &AssignmentView<'_>) -> Option<bool> {
    if !a.any_assigned(&[FieldSlot::MinimumDue, FieldSlot::TotalDue]) {
        return None;
    }
    let minimum = a.get(FieldSlot::MinimumDue)?;
    let total = a.get(FieldSlot::TotalDue)?;
    Some(minimum <= total * a.cfg.min_due_fraction)
}

/// Previous balance − payments + purchases + charges should reproduce
/// the total due, within rounding.
fn activity_balances_total(a: &AssignmentView<'_>) -> Option<bool> {
    if !a.any_assigned(&SECONDARY_SET) {
        return None;
    }
    let previous = a.get(FieldSlot::PreviousBalance)?;
    let payments = a.get(FieldSlot::TotalPayments)?;
    let purchases = a.get(FieldSlot::TotalPurchases)?;
    let charges = a.get(FieldSlot::OtherCharges)?;
    let total = a.get(FieldSlot::TotalDue)?;
    let derived = previous - payments + purchases + charges;
    Some((derived - total).abs() <= Decimal::ONE)
}

fn charges_within_purchases(a: &AssignmentView<'_>) -> Option<bool> {
    if !a.any_assigned(&[FieldSlot::OtherCharges, FieldSlot::TotalPurchases]) {
        return None;
    }
    let charges = a.get(FieldSlot::OtherCharges)?;
    let purchases = a.get(FieldSlot::TotalPurchases)?;
    Some(charges <= purchases)
}
