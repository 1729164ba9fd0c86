//! Direct label strategy: a label immediately followed by its value.

use std::collections::BTreeSet;

use super::{InferenceContext, Proposal, Strategy};
use crate::harvest::LineContext;
use crate::models::{FieldKind, FieldMap, FieldSlot};

/// Maximum byte gap between a label's end and its value's start for the
/// pairing to count as "immediate".
const DIRECT_GAP: usize = 24;

/// The most trustworthy signal: an issuer printed the field name right
/// next to the value.
pub struct DirectLabel;

impl Strategy for DirectLabel {
    fn name(&self) -> &'static str {
        "direct-label"
    }

    fn propose(&self, ctx: &InferenceContext<'_>, map: &FieldMap) -> Vec<Proposal> {
        let mut proposals: Vec<Proposal> = Vec::new();
        let mut claimed: BTreeSet<FieldSlot> = BTreeSet::new();

        for line in &ctx.harvest.lines {
            if is_header_shaped(ctx, line) {
                // Labels stacked over a value row belong to the table
                // alignment stage; pairing them here would zip wrong.
                continue;
            }
            for m in ctx.vocab.matches(&line.text) {
                if map.is_filled(m.slot) || claimed.contains(&m.slot) {
                    continue;
                }
                let Some(proposal) = adjacent_value(line, m.slot, m.span.1) else {
                    continue;
                };
                claimed.insert(m.slot);
                proposals.push(proposal);
            }
        }
        proposals
    }
}

/// A line whose labels all precede its values reads as a table header
/// glued to its value row, not as label/value prose.
pub(super) fn is_header_shaped(ctx: &InferenceContext<'_>, line: &LineContext) -> bool {
    let labels = ctx.vocab.matches(&line.text);
    if labels.len() < 2 {
        return false;
    }
    let last_label_end = labels.iter().map(|m| m.span.1).max().unwrap_or(0);
    let values: Vec<usize> = line
        .tokens
        .iter()
        .filter(|t| t.money().is_some() || t.date().is_some())
        .map(|t| t.span.0)
        .collect();
    values.len() >= 2 && values.iter().all(|start| *start >= last_label_end)
}

fn adjacent_value(line: &LineContext, slot: FieldSlot, label_end: usize) -> Option<Proposal> {
    match slot.kind() {
        FieldKind::Money => {
            let token = line
                .tokens
                .iter()
                .find(|t| t.span.0 >= label_end && t.money().is_some())?;
            if !gap_is_separator(&line.text, label_end, token.span.0) {
                return None;
            }
            Some(Proposal::money(slot, token.money()?))
        }
        FieldKind::Date => {
            let token = line
                .tokens
                .iter()
                .find(|t| t.span.0 >= label_end && t.date().is_some())?;
            if !gap_is_separator(&line.text, label_end, token.span.0) {
                return None;
            }
            // Ranges like "01/07/2025 to 31/07/2025" anchor on the
            // second endpoint.
            Some(Proposal::date(slot, line.date_after(label_end)?))
        }
    }
}

/// The text between label and value must be punctuation/whitespace or a
/// currency marker; anything else means the value belongs elsewhere.
fn gap_is_separator(text: &str, start: usize, end: usize) -> bool {
    if end < start || end - start > DIRECT_GAP {
        return false;
    }
    let Some(gap) = text.get(start..end) else {
        return false;
    };
    let between: String = gap
        .chars()
        .filter(|c| c.is_alphanumeric())
        .collect::<String>()
        .to_lowercase();
    matches!(between.as_str(), "" | "rs" | "inr" | "is")
}
