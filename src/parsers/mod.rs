//! Statement format registry and confidence-scored detection.
//!
//! Every supported export is a [`StatementParser`]. Detection scores each
//! registered parser against the raw content and filename and commits to the
//! best one only when it clears [`MIN_CONFIDENCE`].

pub mod banks;
pub mod delimited;
pub mod fixed_width;

use tracing::debug;

use crate::error::{PassbookError, Result};
use crate::models::ParsedTransaction;

/// Below this score the detector refuses to guess.
pub const MIN_CONFIDENCE: f64 = 0.3;

/// Header rows must appear within this many lines of the top of the file.
pub const HEADER_SCAN_LIMIT: usize = 20;

const HEADER_AND_NAME: f64 = 0.9;
const HEADER_ONLY: f64 = 0.6;
const NAME_ONLY: f64 = 0.3;

pub trait StatementParser: Send + Sync {
    /// Stable identifier stored with every imported transaction.
    fn key(&self) -> &'static str;

    /// Display name, e.g. "HDFC Bank".
    fn name(&self) -> &'static str;

    /// Confidence in `[0, 1]` that `content` is this parser's format.
    fn score(&self, content: &str, filename: &str) -> f64;

    fn parse(&self, content: &str) -> ParseOutcome;
}

/// Rows a parser produced plus the number of malformed rows it dropped.
#[derive(Debug, Default)]
pub struct ParseOutcome {
    pub transactions: Vec<ParsedTransaction>,
    pub skipped: usize,
}

pub struct Detection {
    pub parser: &'static dyn StatementParser,
    pub confidence: f64,
}

pub struct ParsedStatement {
    pub bank_key: &'static str,
    pub bank_name: &'static str,
    pub confidence: f64,
    pub outcome: ParseOutcome,
}

static REGISTRY: &[&dyn StatementParser] = &[
    &fixed_width::HDFC_TEXT,
    &banks::HDFC,
    &banks::ICICI,
    &banks::SBI,
    &banks::AXIS,
    &banks::KOTAK,
    &banks::YES,
    &banks::IDFC_FIRST,
    &banks::INDUSIND,
    &banks::FEDERAL,
    &banks::BANK_OF_BARODA,
    &banks::CANARA,
    &banks::PNB,
    &banks::AU_SMALL_FINANCE,
];

pub fn registry() -> &'static [&'static dyn StatementParser] {
    REGISTRY
}

pub fn get_by_key(key: &str) -> Option<&'static dyn StatementParser> {
    REGISTRY.iter().find(|p| p.key() == key).copied()
}

/// Comma-separated display names of every registered parser.
pub fn supported_banks() -> String {
    REGISTRY.iter().map(|p| p.name()).collect::<Vec<_>>().join(", ")
}

/// Score every registered parser, in registry order.
pub fn scores(content: &str, filename: &str) -> Vec<(&'static dyn StatementParser, f64)> {
    REGISTRY
        .iter()
        .map(|p| (*p, p.score(content, filename)))
        .collect()
}

/// Pick the highest-scoring parser. Earlier registrations win exact ties.
pub fn detect(content: &str, filename: &str) -> Option<Detection> {
    let mut best: Option<Detection> = None;
    for (parser, confidence) in scores(content, filename) {
        debug!(bank = parser.key(), confidence, "scored statement parser");
        if best.as_ref().map_or(true, |b| confidence > b.confidence) {
            best = Some(Detection { parser, confidence });
        }
    }
    best.filter(|b| b.confidence >= MIN_CONFIDENCE)
}

pub fn parse_statement(content: &str, filename: &str) -> Result<ParsedStatement> {
    let detection = detect(content, filename).ok_or_else(|| PassbookError::UnsupportedFormat {
        banks: supported_banks(),
    })?;
    let parser = detection.parser;
    debug!(bank = parser.key(), confidence = detection.confidence, "detected statement format");
    Ok(ParsedStatement {
        bank_key: parser.key(),
        bank_name: parser.name(),
        confidence: detection.confidence,
        outcome: parser.parse(content),
    })
}

/// Combine the two independent detection signals into a confidence score.
pub(crate) fn confidence(header_found: bool, name_found: bool) -> f64 {
    match (header_found, name_found) {
        (true, true) => HEADER_AND_NAME,
        (true, false) => HEADER_ONLY,
        (false, true) => NAME_ONLY,
        (false, false) => 0.0,
    }
}

/// True when any bank-name token occurs in the content or the filename.
pub(crate) fn mentions_bank(tokens: &[&str], content: &str, filename: &str) -> bool {
    let content = content.to_lowercase();
    let filename = filename.to_lowercase();
    tokens
        .iter()
        .any(|t| content.contains(t) || filename.contains(t))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::is_iso_date;

    fn fixture(name: &str) -> String {
        let path = std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("tests")
            .join("fixtures")
            .join(name);
        std::fs::read_to_string(path).unwrap()
    }

    // (fixture file, expected parser key, golden transaction count)
    const GOLDEN: &[(&str, &str, usize)] = &[
        ("hdfc_statement.txt", "hdfc_text", 7),
        ("hdfc.csv", "hdfc", 5),
        ("icici.csv", "icici", 4),
        ("sbi.csv", "sbi", 4),
        ("axis.csv", "axis", 4),
        ("kotak.csv", "kotak", 4),
        ("yes_bank.csv", "yes", 3),
        ("idfc_first.csv", "idfc_first", 3),
        ("indusind.csv", "indusind", 3),
        ("federal.csv", "federal", 3),
        ("bank_of_baroda.csv", "bank_of_baroda", 3),
        ("canara.csv", "canara", 3),
        ("pnb.csv", "pnb", 3),
        ("au_bank.csv", "au_small_finance", 3),
    ];

    #[test]
    fn test_every_registered_bank_has_a_golden_fixture() {
        for parser in registry() {
            assert!(
                GOLDEN.iter().any(|(_, key, _)| *key == parser.key()),
                "no fixture for {}",
                parser.key()
            );
        }
    }

    #[test]
    fn test_golden_counts_and_iso_dates() {
        for (file, key, count) in GOLDEN {
            let content = fixture(file);
            let statement = parse_statement(&content, file).unwrap();
            assert_eq!(statement.bank_key, *key, "wrong parser for {file}");
            assert_eq!(statement.outcome.transactions.len(), *count, "golden count for {file}");
            for tx in &statement.outcome.transactions {
                assert!(is_iso_date(&tx.date), "{file}: bad date {}", tx.date);
                assert!(is_iso_date(&tx.value_date), "{file}: bad value date {}", tx.value_date);
                assert!(tx.withdrawal >= 0.0 && tx.deposit >= 0.0);
                assert!(!tx.narration.is_empty());
            }
        }
    }

    #[test]
    fn test_detect_prefers_named_bank_strictly() {
        for (file, key, _) in GOLDEN {
            let content = fixture(file);
            let detection = detect(&content, file).unwrap();
            assert_eq!(detection.parser.key(), *key);
            assert!(detection.confidence >= 0.85, "{file}: {}", detection.confidence);
            for (parser, score) in scores(&content, file) {
                if parser.key() != *key {
                    assert!(
                        score < detection.confidence,
                        "{file}: {} scored {score}",
                        parser.key()
                    );
                }
            }
        }
    }

    #[test]
    fn test_detect_header_without_name() {
        let content = "Txn Date,Value Date,Description,Ref No./Cheque No.,Debit,Credit,Balance\n\
                       1 Jan 2024,1 Jan 2024,ATM WDL,123,500.00,,1000.00\n";
        let detection = detect(content, "statement.csv").unwrap();
        assert_eq!(detection.parser.key(), "sbi");
        assert_eq!(detection.confidence, HEADER_ONLY);
    }

    #[test]
    fn test_name_only_clears_threshold() {
        let detection = detect("random text\n", "kotak_export.csv").unwrap();
        assert_eq!(detection.parser.key(), "kotak");
        assert_eq!(detection.confidence, NAME_ONLY);
    }

    #[test]
    fn test_unknown_format_is_unsupported() {
        let content = "when,what,how much\n2024-01-01,coffee,3.50\n";
        assert!(detect(content, "export.csv").is_none());
        let err = parse_statement(content, "export.csv").err().unwrap();
        assert_eq!(err.kind(), crate::error::ErrorKind::UnsupportedFormat);
        assert!(err.to_string().contains("ICICI Bank"));
    }

    #[test]
    fn test_registry_keys_unique() {
        let mut keys: Vec<_> = registry().iter().map(|p| p.key()).collect();
        keys.sort();
        keys.dedup();
        assert_eq!(keys.len(), registry().len());
        assert!(get_by_key("axis").is_some());
        assert!(get_by_key("nope").is_none());
    }
}
