//! Fixed-width plain-text statement parser (HDFC Bank "Text" export).
//!
//! The export looks like:
//!
//! ```text
//! -----------------------------------------------------------------------
//!   Date     Narration                     Chq./Ref.No.   Value Dt  ...
//! -----------------------------------------------------------------------
//! 01/01/24  UPI-SWIGGY-SWIGGY@YBL-YESB0... 0000401234567  01/01/24  ...
//!           CONTINUED NARRATION
//! -----------------------------------------------------------------------
//!                                 STATEMENT SUMMARY  :-
//! ```
//!
//! Records are scanned with a two-state machine. Footer and page noise is
//! recognised by an ordered list of [`NoiseRule`]s rather than inline checks.

use std::sync::OnceLock;

use regex::Regex;
use tracing::trace;

use super::{confidence, mentions_bank, ParseOutcome, StatementParser, HEADER_SCAN_LIMIT};
use crate::models::ParsedTransaction;
use crate::normalize::{is_iso_date, normalize_date, parse_amount, split_cells, strip_bom};

/// Half-open character range of one fixed-width column; `end: None` runs to
/// the end of the line.
#[derive(Debug, Clone, Copy)]
pub struct Span {
    pub start: usize,
    pub end: Option<usize>,
}

#[derive(Debug, Clone, Copy)]
pub struct Columns {
    pub date: Span,
    pub narration: Span,
    pub ref_no: Span,
    pub value_date: Span,
    pub withdrawal: Span,
    pub deposit: Span,
    pub closing_balance: Span,
}

const fn span(start: usize, end: usize) -> Span {
    Span { start, end: Some(end) }
}

/// HDFC text export column offsets.
pub const HDFC_COLUMNS: Columns = Columns {
    date: span(0, 10),
    narration: span(10, 50),
    ref_no: span(50, 67),
    value_date: span(67, 77),
    withdrawal: span(77, 98),
    deposit: span(98, 119),
    closing_balance: Span { start: 119, end: None },
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoiseAction {
    /// Close the open record and leave the data section.
    FlushAndExit,
    /// Ignore the line.
    Skip,
}

#[derive(Debug, Clone, Copy)]
pub enum Predicate {
    Blank,
    /// Case-insensitive substring.
    Contains(&'static str),
}

impl Predicate {
    pub fn matches(&self, line: &str) -> bool {
        match self {
            Self::Blank => line.trim().is_empty(),
            Self::Contains(needle) => line.to_lowercase().contains(&needle.to_lowercase()),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct NoiseRule {
    pub label: &'static str,
    pub predicate: Predicate,
    pub action: NoiseAction,
}

const fn exit_on(label: &'static str, needle: &'static str) -> NoiseRule {
    NoiseRule {
        label,
        predicate: Predicate::Contains(needle),
        action: NoiseAction::FlushAndExit,
    }
}

/// Checked in order; the first match wins.
pub const HDFC_NOISE: &[NoiseRule] = &[
    NoiseRule {
        label: "blank",
        predicate: Predicate::Blank,
        action: NoiseAction::Skip,
    },
    exit_on("statement summary", "STATEMENT SUMMARY"),
    exit_on("opening balance", "Opening Balance"),
    exit_on("page header", "Page No"),
    exit_on("page header", "Statement of account"),
    exit_on("page header", "Account Branch"),
    exit_on("address", "Address :"),
    exit_on("address", "Registered Office"),
    exit_on("footer", "Generated On"),
    exit_on("disclaimer", "computer generated"),
    exit_on("disclaimer", "Closing balance includes"),
    exit_on("disclaimer", "Contents of this statement"),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    OutsideData,
    InData,
}

pub struct FixedWidthParser {
    pub key: &'static str,
    pub name: &'static str,
    pub name_tokens: &'static [&'static str],
    pub columns: Columns,
    pub noise: &'static [NoiseRule],
}

pub static HDFC_TEXT: FixedWidthParser = FixedWidthParser {
    key: "hdfc_text",
    name: "HDFC Bank (text)",
    name_tokens: &["hdfc"],
    columns: HDFC_COLUMNS,
    noise: HDFC_NOISE,
};

fn short_date() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\d{2}/\d{2}/\d{2}$").expect("valid regex"))
}

/// A run of at least 20 dashes and nothing else.
pub fn is_separator(line: &str) -> bool {
    let t = line.trim();
    t.len() >= 20 && t.chars().all(|c| c == '-')
}

/// The non-delimited column-header line of the text export.
pub fn is_column_header(line: &str) -> bool {
    let lower = line.to_lowercase();
    lower.contains("date") && lower.contains("narration") && split_cells(line).len() <= 1
}

fn slice(line: &str, span: Span) -> String {
    let chars = line.chars().skip(span.start);
    let cell: String = match span.end {
        Some(end) => chars.take(end.saturating_sub(span.start)).collect(),
        None => chars.collect(),
    };
    cell.trim().to_string()
}

impl FixedWidthParser {
    fn starts_record(&self, line: &str) -> bool {
        short_date().is_match(&slice(line, self.columns.date))
    }

    fn record(&self, line: &str) -> ParsedTransaction {
        let c = &self.columns;
        ParsedTransaction {
            date: normalize_date(&slice(line, c.date)),
            narration: slice(line, c.narration),
            ref_no: slice(line, c.ref_no),
            value_date: normalize_date(&slice(line, c.value_date)),
            withdrawal: parse_amount(&slice(line, c.withdrawal)).abs(),
            deposit: parse_amount(&slice(line, c.deposit)).abs(),
            closing_balance: parse_amount(&slice(line, c.closing_balance)),
        }
    }

    fn noise_rule(&self, line: &str) -> Option<&NoiseRule> {
        self.noise.iter().find(|r| r.predicate.matches(line))
    }
}

fn flush(open: &mut Option<ParsedTransaction>, out: &mut ParseOutcome) {
    let Some(mut tx) = open.take() else { return };
    if !is_iso_date(&tx.date) {
        out.skipped += 1;
        return;
    }
    if !is_iso_date(&tx.value_date) {
        tx.value_date = tx.date.clone();
    }
    out.transactions.push(tx);
}

impl StatementParser for FixedWidthParser {
    fn key(&self) -> &'static str {
        self.key
    }

    fn name(&self) -> &'static str {
        self.name
    }

    fn score(&self, content: &str, filename: &str) -> f64 {
        let lines: Vec<&str> = strip_bom(content).lines().take(HEADER_SCAN_LIMIT).collect();
        let header = lines
            .windows(2)
            .any(|w| is_separator(w[0]) && is_column_header(w[1]));
        confidence(header, mentions_bank(self.name_tokens, content, filename))
    }

    fn parse(&self, content: &str) -> ParseOutcome {
        let lines: Vec<&str> = strip_bom(content).lines().collect();
        let mut out = ParseOutcome::default();
        let mut state = State::OutsideData;
        let mut open: Option<ParsedTransaction> = None;

        for (i, line) in lines.iter().enumerate() {
            if is_separator(line) {
                match state {
                    State::OutsideData => {
                        let next = lines.get(i + 1).copied().unwrap_or("");
                        if !(is_column_header(next) || is_separator(next)) {
                            state = State::InData;
                        }
                    }
                    State::InData => {
                        flush(&mut open, &mut out);
                        state = State::OutsideData;
                    }
                }
                continue;
            }
            if state == State::OutsideData {
                continue;
            }

            if self.starts_record(line) {
                flush(&mut open, &mut out);
                open = Some(self.record(line));
                continue;
            }

            if let Some(rule) = self.noise_rule(line) {
                if rule.action == NoiseAction::FlushAndExit {
                    trace!(line = i + 1, rule = rule.label, "leaving data section");
                    flush(&mut open, &mut out);
                    state = State::OutsideData;
                }
                continue;
            }

            if let Some(tx) = open.as_mut() {
                let extra = line.trim();
                if tx.narration.is_empty() {
                    tx.narration = extra.to_string();
                } else {
                    tx.narration.push(' ');
                    tx.narration.push_str(extra);
                }
            }
        }
        flush(&mut open, &mut out);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SEP: &str = "----------------------------------------------------------------------------------------------------------------------------------------";
    const HEADER: &str = "  Date     Narration                               Chq./Ref.No.     Value Dt  Withdrawal Amt.        Deposit Amt.         Closing Balance";

    /// Lay out one record at the HDFC offsets.
    fn row(date: &str, narration: &str, ref_no: &str, wd: &str, dep: &str, bal: &str) -> String {
        format!("{date:<10}{narration:<40}{ref_no:<17}{date:<10}{wd:>21}{dep:>21}{bal:>21}")
    }

    fn statement(body: &[String]) -> String {
        let mut lines = vec!["HDFC BANK Ltd.".to_string(), SEP.into(), HEADER.into(), SEP.into()];
        lines.extend(body.iter().cloned());
        lines.push(SEP.into());
        lines.push("                      STATEMENT SUMMARY  :-".into());
        lines.push("Opening Balance   Dr Count   Cr Count".into());
        lines.push("      10,000.00          2          1".into());
        lines.join("\n")
    }

    #[test]
    fn test_slices_fixed_columns() {
        let line = row("01/01/24", "UPI-SWIGGY-1234", "0000401234567890", "450.00", "", "9,550.00");
        let content = statement(&[line]);
        let out = HDFC_TEXT.parse(&content);
        assert_eq!(out.transactions.len(), 1);
        let tx = &out.transactions[0];
        assert_eq!(tx.date, "2024-01-01");
        assert_eq!(tx.value_date, "2024-01-01");
        assert_eq!(tx.narration, "UPI-SWIGGY-1234");
        assert_eq!(tx.ref_no, "0000401234567890");
        assert_eq!(tx.withdrawal, 450.0);
        assert_eq!(tx.deposit, 0.0);
        assert_eq!(tx.closing_balance, 9550.0);
    }

    #[test]
    fn test_narration_continuation_is_joined() {
        let content = statement(&[
            row("02/01/24", "NEFT CR-ICIC0000001-ACME", "N012240000001", "", "85,000.00", "94,550.00"),
            "          TECHNOLOGIES PRIVATE LIMITED".to_string(),
            "".to_string(),
            "          SALARY JAN".to_string(),
            row("03/01/24", "ATW-512345XXXXXX1234-S1ANMU01", "0000000000000000", "2,000.00", "", "92,550.00"),
        ]);
        let out = HDFC_TEXT.parse(&content);
        assert_eq!(out.transactions.len(), 2);
        assert_eq!(
            out.transactions[0].narration,
            "NEFT CR-ICIC0000001-ACME TECHNOLOGIES PRIVATE LIMITED SALARY JAN"
        );
        assert_eq!(out.transactions[1].withdrawal, 2000.0);
    }

    #[test]
    fn test_footer_noise_flushes_and_exits() {
        let content = [
            SEP.to_string(),
            HEADER.to_string(),
            SEP.to_string(),
            row("05/01/24", "UPI-ZOMATO-1", "1", "300.00", "", "1,000.00"),
            "                                                  Page No .: 2".to_string(),
            "          THIS IS NOT A CONTINUATION".to_string(),
            row("06/01/24", "OUTSIDE DATA SECTION", "2", "1.00", "", "999.00"),
        ]
        .join("\n");
        let out = HDFC_TEXT.parse(&content);
        assert_eq!(out.transactions.len(), 1);
        assert_eq!(out.transactions[0].narration, "UPI-ZOMATO-1");
    }

    #[test]
    fn test_doubled_separator_is_deferred() {
        // Entering on the first separator would make the second one close
        // the section before any row is read.
        let content = [
            SEP.to_string(),
            HEADER.to_string(),
            SEP.to_string(),
            SEP.to_string(),
            row("09/01/24", "UPI-BLINKIT-1", "401200000001", "312.00", "", "4,688.00"),
            row("10/01/24", "NEFT CR-HDFC0000001-REFUND", "N010240000002", "", "99.00", "4,787.00"),
            SEP.to_string(),
        ]
        .join("\n");
        let out = HDFC_TEXT.parse(&content);
        assert_eq!(out.transactions.len(), 2);
        assert_eq!(out.skipped, 0);
        assert_eq!(out.transactions[1].deposit, 99.0);
    }

    #[test]
    fn test_separator_before_header_is_deferred() {
        // The first separator is followed by the header, so the header line
        // must never be read as data.
        let content = [
            SEP.to_string(),
            HEADER.to_string(),
            SEP.to_string(),
            row("07/01/24", "IMPS-412312345678-RAHUL", "412312345678", "", "500.00", "1,500.00"),
        ]
        .join("\n");
        let out = HDFC_TEXT.parse(&content);
        assert_eq!(out.transactions.len(), 1);
        assert_eq!(out.transactions[0].deposit, 500.0);
    }

    #[test]
    fn test_invalid_date_record_is_skipped() {
        let content = statement(&[
            row("31/02/24", "BAD DATE", "1", "1.00", "", "1.00"),
            row("29/02/24", "LEAP DAY", "2", "1.00", "", "0.00"),
        ]);
        let out = HDFC_TEXT.parse(&content);
        assert_eq!(out.transactions.len(), 1);
        assert_eq!(out.transactions[0].date, "2024-02-29");
        assert_eq!(out.skipped, 1);
    }

    #[test]
    fn test_end_of_input_flushes_open_record() {
        let content = [
            SEP.to_string(),
            row("08/01/24", "CHQ DEP", "000123", "", "10.00", "10.00"),
            "          TRAILING NARRATION".to_string(),
        ]
        .join("\n");
        let out = HDFC_TEXT.parse(&content);
        assert_eq!(out.transactions.len(), 1);
        assert_eq!(out.transactions[0].narration, "CHQ DEP TRAILING NARRATION");
    }

    #[test]
    fn test_noise_rules_are_ordered_data() {
        let rule = HDFC_TEXT.noise_rule("   STATEMENT SUMMARY  :-").unwrap();
        assert_eq!(rule.label, "statement summary");
        assert_eq!(rule.action, NoiseAction::FlushAndExit);
        assert_eq!(HDFC_TEXT.noise_rule("   ").unwrap().action, NoiseAction::Skip);
        assert!(HDFC_TEXT.noise_rule("          SALARY JAN").is_none());
    }

    #[test]
    fn test_score_signals() {
        let content = statement(&[]);
        assert_eq!(HDFC_TEXT.score(&content, "statement.txt"), 0.9);
        let anonymous = content.replace("HDFC BANK Ltd.", "");
        assert_eq!(HDFC_TEXT.score(&anonymous, "statement.txt"), 0.6);
        assert_eq!(HDFC_TEXT.score("nothing", "hdfc.txt"), 0.3);
        assert_eq!(HDFC_TEXT.score("Date,Narration\n", "x.csv"), 0.0);
    }
}
