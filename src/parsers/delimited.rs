//! Header-locate, column-alias and row-walk algorithm shared by every
//! delimited (CSV-like) bank export and by the generic alias import.

use std::collections::BTreeMap;

use super::{confidence, mentions_bank, ParseOutcome, StatementParser, HEADER_SCAN_LIMIT};
use crate::models::{Field, ParsedTransaction};
use crate::normalize::{
    has_digit, is_iso_date, normalize_date, parse_amount, split_by_indicator, split_cells,
    strip_bom,
};

/// Bank-specific parameters of the shared algorithm. All strings are lowercase.
pub struct Layout {
    /// Every substring must occur in one header row.
    pub required_headers: &'static [&'static str],
    /// Logical field to acceptable header substrings.
    pub aliases: &'static [(Field, &'static [&'static str])],
}

pub struct DelimitedParser {
    pub key: &'static str,
    pub name: &'static str,
    pub name_tokens: &'static [&'static str],
    pub layout: Layout,
}

/// Index of the first of the first `limit` lines whose lowercase text
/// contains every required substring.
pub fn find_header_row<S: AsRef<str>>(lines: &[&str], required: &[S], limit: usize) -> Option<usize> {
    lines.iter().take(limit).position(|line| {
        let lower = line.to_lowercase();
        required.iter().all(|r| lower.contains(&r.as_ref().to_lowercase()))
    })
}

/// Resolved column index per logical field.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ColumnMap {
    columns: BTreeMap<Field, usize>,
}

impl ColumnMap {
    pub fn get(&self, field: Field) -> Option<usize> {
        self.columns.get(&field).copied()
    }

    pub fn has(&self, field: Field) -> bool {
        self.columns.contains_key(&field)
    }
}

/// For each field, the first header cell containing any of its aliases.
pub fn locate_columns<S: AsRef<str>>(header: &[String], aliases: &[(Field, &[S])]) -> ColumnMap {
    let cells: Vec<String> = header.iter().map(|c| c.trim().to_lowercase()).collect();
    let mut columns = BTreeMap::new();
    for (field, names) in aliases {
        let found = cells.iter().position(|cell| {
            names
                .iter()
                .any(|alias| cell.contains(&alias.as_ref().to_lowercase()))
        });
        if let Some(index) = found {
            columns.insert(*field, index);
        }
    }
    ColumnMap { columns }
}

fn cell<'a>(cells: &'a [String], columns: &ColumnMap, field: Field) -> &'a str {
    columns
        .get(field)
        .and_then(|i| cells.get(i))
        .map(String::as_str)
        .unwrap_or("")
}

/// Resolve `(withdrawal, deposit)` for one row. Separate debit/credit columns
/// win; otherwise a single amount column is split by its indicator column, or
/// by sign when there is no indicator.
fn amounts(cells: &[String], columns: &ColumnMap) -> (f64, f64) {
    if columns.has(Field::Withdrawal) || columns.has(Field::Deposit) {
        let withdrawal = parse_amount(cell(cells, columns, Field::Withdrawal)).abs();
        let deposit = parse_amount(cell(cells, columns, Field::Deposit)).abs();
        return (withdrawal, deposit);
    }
    let amount = parse_amount(cell(cells, columns, Field::Amount));
    if columns.has(Field::Indicator) {
        split_by_indicator(amount, cell(cells, columns, Field::Indicator))
    } else if amount < 0.0 {
        (-amount, 0.0)
    } else {
        (0.0, amount)
    }
}

/// Walk the data rows that follow a header. Rows without a usable date or
/// narration are counted in `skipped`; blank lines are ignored.
pub fn walk_rows(lines: &[&str], columns: &ColumnMap) -> ParseOutcome {
    let mut out = ParseOutcome::default();
    for line in lines {
        if line.trim().is_empty() {
            continue;
        }
        let cells = split_cells(line);

        let raw_date = cell(&cells, columns, Field::Date);
        if raw_date.is_empty() || !has_digit(raw_date) {
            out.skipped += 1;
            continue;
        }
        let narration = cell(&cells, columns, Field::Narration);
        if narration.is_empty() {
            out.skipped += 1;
            continue;
        }
        let date = normalize_date(raw_date);
        if !is_iso_date(&date) {
            out.skipped += 1;
            continue;
        }
        let value_date = Some(normalize_date(cell(&cells, columns, Field::ValueDate)))
            .filter(|d| is_iso_date(d))
            .unwrap_or_else(|| date.clone());
        let (withdrawal, deposit) = amounts(&cells, columns);

        out.transactions.push(ParsedTransaction {
            date,
            narration: narration.to_string(),
            ref_no: cell(&cells, columns, Field::RefNo).to_string(),
            value_date,
            withdrawal,
            deposit,
            closing_balance: parse_amount(cell(&cells, columns, Field::ClosingBalance)),
        });
    }
    out
}

/// Full pipeline: find the header within [`HEADER_SCAN_LIMIT`] lines, map the
/// columns, walk the rest. No header means no transactions.
pub fn parse_with_layout<S, T>(content: &str, required: &[S], aliases: &[(Field, &[T])]) -> ParseOutcome
where
    S: AsRef<str>,
    T: AsRef<str>,
{
    let lines: Vec<&str> = strip_bom(content).lines().collect();
    let Some(header_index) = find_header_row(&lines, required, HEADER_SCAN_LIMIT) else {
        return ParseOutcome::default();
    };
    let columns = locate_columns(&split_cells(lines[header_index]), aliases);
    walk_rows(&lines[header_index + 1..], &columns)
}

impl StatementParser for DelimitedParser {
    fn key(&self) -> &'static str {
        self.key
    }

    fn name(&self) -> &'static str {
        self.name
    }

    fn score(&self, content: &str, filename: &str) -> f64 {
        let lines: Vec<&str> = strip_bom(content).lines().collect();
        let header = find_header_row(&lines, self.layout.required_headers, HEADER_SCAN_LIMIT)
            .is_some_and(|i| split_cells(lines[i]).len() > 1);
        confidence(header, mentions_bank(self.name_tokens, content, filename))
    }

    fn parse(&self, content: &str) -> ParseOutcome {
        parse_with_layout(content, self.layout.required_headers, self.layout.aliases)
    }
}
