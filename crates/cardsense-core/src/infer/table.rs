//! Table alignment strategy: zip a header row onto an adjacent value row.
//!
//! Works over explicit cell grids (CSV rows) and over pseudo-grids made
//! by splitting text lines on runs of whitespace, because summary
//! tables survive text extraction as aligned columns.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use rust_decimal::Decimal;

use super::{InferenceContext, Proposal, Strategy};
use crate::harvest::patterns::{CELL_SPLIT, RANGE_SEPARATOR};
use crate::harvest::tokens::{scan_dates, scan_money};
use crate::models::{FieldKind, FieldMap, FieldSlot};

/// Slack allowed between a header cell's length and its matched label,
/// so `Total Amount Due (Rs.)` still reads as a label cell.
const CELL_LABEL_SLACK: usize = 12;

pub struct TableAlignment;

impl Strategy for TableAlignment {
    fn name(&self) -> &'static str {
        "table-alignment"
    }

    fn propose(&self, ctx: &InferenceContext<'_>, map: &FieldMap) -> Vec<Proposal> {
        let mut proposals: Vec<Proposal> = Vec::new();
        let mut claimed: BTreeSet<FieldSlot> = BTreeSet::new();

        // Explicit grids first: they carry real cell boundaries.
        let grids: Vec<Vec<String>> = ctx
            .harvest
            .grid_rows
            .iter()
            .map(|r| r.cells.clone())
            .collect();
        zip_rows(ctx, map, &grids, &mut claimed, &mut proposals);

        // Pseudo-grids from text lines, per unit.
        let mut unit_rows: Vec<Vec<String>> = Vec::new();
        let mut current_unit = usize::MAX;
        for line in &ctx.harvest.lines {
            if line.unit != current_unit {
                zip_rows(ctx, map, &unit_rows, &mut claimed, &mut proposals);
                unit_rows.clear();
                current_unit = line.unit;
            }
            unit_rows.push(split_cells(&line.text));
        }
        zip_rows(ctx, map, &unit_rows, &mut claimed, &mut proposals);

        proposals
    }
}

fn split_cells(text: &str) -> Vec<String> {
    CELL_SPLIT
        .split(text)
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty())
        .collect()
}

/// Scan consecutive rows for header/value pairs and zip them by column.
fn zip_rows(
    ctx: &InferenceContext<'_>,
    map: &FieldMap,
    rows: &[Vec<String>],
    claimed: &mut BTreeSet<FieldSlot>,
    proposals: &mut Vec<Proposal>,
) {
    for window in rows.windows(2) {
        let (header, values) = (&window[0], &window[1]);

        let mapped: Vec<(usize, FieldSlot)> = header
            .iter()
            .enumerate()
            .filter_map(|(col, cell)| cell_slot(ctx, cell).map(|slot| (col, slot)))
            .collect();
        if mapped.len() < 2 {
            continue;
        }

        for (col, slot) in mapped {
            if map.is_filled(slot) || claimed.contains(&slot) {
                continue;
            }
            let Some(cell) = values.get(col) else { continue };
            let proposal = match slot.kind() {
                FieldKind::Money => cell_money(cell).map(|v| Proposal::money(slot, v)),
                FieldKind::Date => cell_date(cell).map(|v| Proposal::date(slot, v)),
            };
            if let Some(p) = proposal {
                claimed.insert(slot);
                proposals.push(p);
            }
        }
    }
}

/// Which slot, if any, a header cell names. The matched label must
/// cover most of the cell; a prose sentence mentioning a field is not a
/// header cell.
fn cell_slot(ctx: &InferenceContext<'_>, cell: &str) -> Option<FieldSlot> {
    let trimmed = cell.trim();
    let m = ctx.vocab.matches(trimmed).into_iter().next()?;
    let matched_len = m.span.1 - m.span.0;
    (trimmed.len() <= matched_len + CELL_LABEL_SLACK).then_some(m.slot)
}

fn cell_money(cell: &str) -> Option<Decimal> {
    scan_money(cell).first().map(|t| t.value)
}

fn cell_date(cell: &str) -> Option<NaiveDate> {
    let dates = scan_dates(cell);
    if dates.len() >= 2 {
        let between = &cell[dates[0].span.1..dates[1].span.0];
        if RANGE_SEPARATOR.is_match(between) {
            return Some(dates[1].value);
        }
    }
    dates.first().map(|t| t.value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::harvest::harvest;
    use crate::issuer::{ProfileSet, Vocabulary};
    use crate::models::EngineConfig;
    use crate::source::{CsvSource, TextSource};
    use pretty_assertions::assert_eq;
    use std::str::FromStr;

    fn propose_from(harvested: &crate::harvest::Harvest) -> Vec<Proposal> {
        let profiles = ProfileSet::builtin();
        let profile = profiles.classify(&harvested.text);
        let vocab = Vocabulary::for_profile(profile);
        let config = EngineConfig::default();
        let ctx = InferenceContext {
            harvest: harvested,
            profile,
            vocab: &vocab,
            config: &config,
        };
        TableAlignment.propose(&ctx, &FieldMap::new())
    }

    fn money_for(proposals: &[Proposal], slot: FieldSlot) -> Option<Decimal> {
        proposals
            .iter()
            .find(|p| p.slot == slot)
            .and_then(|p| p.value.as_money())
    }

    #[test]
    fn test_pseudo_grid_header_value_rows() {
        let text = "Credit Limit    Available Credit Limit    Total Amount Due    Minimum Amount Due\n\
                    50,000.00       42,350.50                  3,200.00            160.00";
        let harvested = harvest(
            &TextSource::new(vec![text.to_string()]),
            &EngineConfig::default().harvest,
        );
        let proposals = propose_from(&harvested);

        assert_eq!(
            money_for(&proposals, FieldSlot::CreditLimit),
            Some(Decimal::from_str("50000.00").unwrap())
        );
        assert_eq!(
            money_for(&proposals, FieldSlot::AvailableCredit),
            Some(Decimal::from_str("42350.50").unwrap())
        );
        assert_eq!(
            money_for(&proposals, FieldSlot::TotalDue),
            Some(Decimal::from_str("3200.00").unwrap())
        );
        assert_eq!(
            money_for(&proposals, FieldSlot::MinimumDue),
            Some(Decimal::from_str("160.00").unwrap())
        );
    }

    #[test]
    fn test_csv_grid_rows() {
        let data = b"Statement Date,Payment Due Date,Total Amount Due\n15/08/2025,05/09/2025,3200.00\n";
        let source = CsvSource::load(data).unwrap();
        let harvested = harvest(&source, &EngineConfig::default().harvest);
        let proposals = propose_from(&harvested);

        let statement = proposals
            .iter()
            .find(|p| p.slot == FieldSlot::StatementDate)
            .and_then(|p| p.value.as_date());
        assert_eq!(statement, Some(chrono::NaiveDate::from_ymd_opt(2025, 8, 15).unwrap()));
        assert_eq!(
            money_for(&proposals, FieldSlot::TotalDue),
            Some(Decimal::from_str("3200.00").unwrap())
        );
    }

    #[test]
    fn test_single_label_row_is_not_a_header() {
        let text = "Total Amount Due\n3,200.00  160.00";
        let harvested = harvest(
            &TextSource::new(vec![text.to_string()]),
            &EngineConfig::default().harvest,
        );
        assert!(propose_from(&harvested).is_empty());
    }

    #[test]
    fn test_prose_cell_is_not_a_header() {
        let text = "your total amount due is explained in the notes    minimum amount due too\n\
                    3,200.00    160.00";
        let harvested = harvest(
            &TextSource::new(vec![text.to_string()]),
            &EngineConfig::default().harvest,
        );
        let proposals = propose_from(&harvested);
        assert_eq!(money_for(&proposals, FieldSlot::TotalDue), None);
    }

    #[test]
    fn test_value_row_gap_leaves_slot_open() {
        // Header names three columns but the value row only has two
        // cells; the third slot must stay unclaimed.
        let data = b"Credit Limit,Available Credit,Total Due\n50000.00,42350.50\n";
        let source = CsvSource::load(data).unwrap();
        let harvested = harvest(&source, &EngineConfig::default().harvest);
        let proposals = propose_from(&harvested);
        assert!(money_for(&proposals, FieldSlot::CreditLimit).is_some());
        assert_eq!(money_for(&proposals, FieldSlot::TotalDue), None);
    }
}
