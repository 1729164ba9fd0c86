//! Token harvesting: turning document units into line contexts.
//!
//! Pure extraction; no semantic meaning is attached here beyond token
//! kinds. Only a bounded number of leading units is scanned, because
//! summary fields never appear deeper in a statement.

pub mod patterns;
pub mod tokens;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tracing::{debug, warn};

use crate::issuer::Vocabulary;
use crate::models::HarvestConfig;
use crate::source::DocumentSource;
use patterns::RANGE_SEPARATOR;
use tokens::{DateToken, NumericToken, RawToken, TokenKind, scan_dates, scan_money};

/// An ordered sequence of tokens sharing one source line, plus the raw
/// line text. Read-only once harvested.
#[derive(Debug, Clone)]
pub struct LineContext {
    /// Source unit (page or row) index.
    pub unit: usize,
    /// Line index within the unit.
    pub line: usize,
    /// Trimmed line text.
    pub text: String,
    /// Tokens ordered by their span within the line.
    pub tokens: Vec<RawToken>,
}

impl LineContext {
    /// Scan one line into a context.
    ///
    /// Date tokens take precedence over money tokens on span overlap: a
    /// dotted date such as `15.08.2025` would otherwise also read as a
    /// two-decimal amount.
    pub fn scan(unit: usize, line: usize, text: &str, vocab: &Vocabulary) -> Self {
        let dates = scan_dates(text);
        let money = scan_money(text);
        let labels = vocab.matches(text);

        let mut tokens: Vec<RawToken> = Vec::new();
        for d in &dates {
            tokens.push(RawToken {
                span: d.span,
                text: d.original.clone(),
                kind: TokenKind::Date(d.value),
            });
        }
        for m in money {
            let overlaps_date = dates.iter().any(|d| m.span.0 < d.span.1 && d.span.0 < m.span.1);
            if !overlaps_date {
                tokens.push(RawToken {
                    span: m.span,
                    text: m.original,
                    kind: TokenKind::Money(m.value),
                });
            }
        }
        for l in labels {
            // Label spans come from the lowercased text; slice
            // defensively in case folding shifted a byte boundary.
            let Some(matched) = text.get(l.span.0..l.span.1) else {
                continue;
            };
            tokens.push(RawToken {
                span: l.span,
                text: matched.to_string(),
                kind: TokenKind::Label(l.slot),
            });
        }
        tokens.sort_by_key(|t| t.span.0);

        Self {
            unit,
            line,
            text: text.to_string(),
            tokens,
        }
    }

    /// Money tokens in this line, in order.
    pub fn money_tokens(&self) -> Vec<NumericToken> {
        self.tokens
            .iter()
            .filter_map(|t| {
                t.money().map(|value| NumericToken {
                    value,
                    original: t.text.clone(),
                    span: t.span,
                })
            })
            .collect()
    }

    /// Date tokens in this line, in order.
    pub fn date_tokens(&self) -> Vec<DateToken> {
        self.tokens
            .iter()
            .filter_map(|t| {
                t.date().map(|value| DateToken {
                    value,
                    original: t.text.clone(),
                    span: t.span,
                })
            })
            .collect()
    }

    /// Whether any label token was harvested on this line.
    pub fn has_labels(&self) -> bool {
        self.tokens.iter().any(|t| t.label().is_some())
    }

    /// First money token starting at or after `pos`.
    pub fn money_after(&self, pos: usize) -> Option<Decimal> {
        self.tokens
            .iter()
            .find(|t| t.span.0 >= pos && t.money().is_some())
            .and_then(|t| t.money())
    }

    /// First date token starting at or after `pos`, preferring the
    /// second endpoint of a range (`DATE1 to DATE2`).
    pub fn date_after(&self, pos: usize) -> Option<NaiveDate> {
        let dates: Vec<&RawToken> = self
            .tokens
            .iter()
            .filter(|t| t.span.0 >= pos && t.date().is_some())
            .collect();
        pick_anchor(&self.text, &dates)
    }

    /// The anchor date of this line: the second endpoint when the line
    /// carries a range, otherwise the first date.
    pub fn anchor_date(&self) -> Option<NaiveDate> {
        self.date_after(0)
    }
}

fn pick_anchor(text: &str, dates: &[&RawToken]) -> Option<NaiveDate> {
    if dates.len() >= 2 {
        let between = &text[dates[0].span.1..dates[1].span.0];
        if RANGE_SEPARATOR.is_match(between) {
            return dates[1].date();
        }
    }
    dates.first().and_then(|t| t.date())
}

/// One harvested grid row, kept alongside line contexts for the table
/// alignment strategy.
#[derive(Debug, Clone)]
pub struct GridRow {
    pub unit: usize,
    pub row: usize,
    pub cells: Vec<String>,
}

/// Everything harvested from a document's leading units.
#[derive(Debug, Clone, Default)]
pub struct Harvest {
    pub lines: Vec<LineContext>,
    pub grid_rows: Vec<GridRow>,
    /// Concatenated harvested text, for issuer classification.
    pub text: String,
}

impl Harvest {
    /// All money values across the harvest, in document order.
    pub fn money_values(&self) -> Vec<Decimal> {
        self.lines
            .iter()
            .flat_map(|l| l.tokens.iter().filter_map(|t| t.money()))
            .collect()
    }

    /// All date values across the harvest, in document order.
    pub fn date_values(&self) -> Vec<NaiveDate> {
        self.lines
            .iter()
            .flat_map(|l| l.tokens.iter().filter_map(|t| t.date()))
            .collect()
    }
}

/// Harvest the leading units of a document.
///
/// Malformed units are skipped, not retried. Both plain text and grid
/// structure are harvested, because summary fields sometimes render as
/// prose and sometimes as a table.
pub fn harvest(source: &dyn DocumentSource, config: &HarvestConfig) -> Harvest {
    let vocab = Vocabulary::generic();
    let mut lines = Vec::new();
    let mut grid_rows = Vec::new();
    let mut text = String::new();

    let limit = source.unit_count().min(config.max_units);
    for unit in 0..limit {
        let Some(u) = source.unit(unit) else {
            warn!(unit, "skipping unreadable unit");
            continue;
        };

        let mut line_no = 0;
        for raw_line in u.text.lines() {
            let trimmed = raw_line.trim();
            if trimmed.is_empty() {
                continue;
            }
            lines.push(LineContext::scan(unit, line_no, trimmed, vocab));
            text.push_str(trimmed);
            text.push('\n');
            line_no += 1;
        }

        if let Some(grid) = u.grid {
            for (row, cells) in grid.into_iter().enumerate() {
                grid_rows.push(GridRow { unit, row, cells });
            }
        }
    }

    debug!(
        lines = lines.len(),
        grid_rows = grid_rows.len(),
        units = limit,
        "harvest complete"
    );
    Harvest { lines, grid_rows, text }
}
