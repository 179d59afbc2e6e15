use std::collections::HashSet;
use std::path::Path;

use serde::Serialize;
use sha2::{Digest, Sha256};
use tracing::{debug, info, warn};

use crate::categorizer::categorize;
use crate::db::Store;
use crate::error::{PassbookError, Result};
use crate::models::{ImportRecord, Transaction};
use crate::normalize::strip_bom;
use crate::parsers::{self, ParseOutcome, StatementParser};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

pub fn compute_checksum(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

/// A row is a duplicate when its reference is already stored. Rows with no
/// reference are never duplicates.
fn is_duplicate(ref_no: &str, existing: &HashSet<String>) -> bool {
    let r = ref_no.trim();
    !r.is_empty() && existing.contains(r)
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("")
        .to_string()
}

// ---------------------------------------------------------------------------
// import
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ImportResult {
    pub imported: usize,
    /// `duplicates + malformed`.
    pub skipped: usize,
    pub duplicates: usize,
    pub malformed: usize,
    /// Rows the parser produced, before de-duplication.
    pub total: usize,
    pub bank: String,
    /// Detection confidence; `None` when the format was given explicitly.
    pub confidence: Option<f64>,
    pub import_id: Option<i64>,
}

/// Detect, parse, de-duplicate, categorize and persist one statement.
pub fn import_statement<S: Store>(store: &S, content: &str, filename: &str) -> Result<ImportResult> {
    let checksum = compute_checksum(content.as_bytes());
    import_with_checksum(store, content, filename, checksum, None)
}

/// Read a statement from disk (lossy UTF-8) and import it.
pub fn import_file<S: Store>(store: &S, path: &Path) -> Result<ImportResult> {
    import_file_as(store, path, None)
}

/// Like [`import_file`], but `parser` skips detection when given.
pub fn import_file_as<S: Store>(
    store: &S,
    path: &Path,
    parser: Option<&dyn StatementParser>,
) -> Result<ImportResult> {
    let bytes = std::fs::read(path)?;
    let checksum = compute_checksum(&bytes);
    let content = String::from_utf8_lossy(&bytes);
    import_with_checksum(store, strip_bom(&content), &display_name(path), checksum, parser)
}

fn import_with_checksum<S: Store>(
    store: &S,
    content: &str,
    filename: &str,
    checksum: String,
    parser: Option<&dyn StatementParser>,
) -> Result<ImportResult> {
    let (outcome, bank_key, bank_name, confidence) = match parser {
        Some(p) => (p.parse(content), p.key(), p.name(), None),
        None => {
            let statement = parsers::parse_statement(content, filename)?;
            (
                statement.outcome,
                statement.bank_key,
                statement.bank_name,
                Some(statement.confidence),
            )
        }
    };
    if outcome.transactions.is_empty() {
        return Err(PassbookError::EmptyResult {
            bank: bank_name.to_string(),
        });
    }
    let mut result = persist_batch(store, outcome, bank_key, filename, checksum)?;
    result.confidence = confidence;
    Ok(result)
}

/// Shared tail of every import path. Everything runs in one atomic batch:
/// read existing refs and rules, drop duplicates, categorize, record the
/// import, insert.
pub(crate) fn persist_batch<S: Store>(
    store: &S,
    outcome: ParseOutcome,
    bank: &str,
    filename: &str,
    checksum: String,
) -> Result<ImportResult> {
    let ParseOutcome { transactions, skipped: malformed } = outcome;
    let total = transactions.len();
    let date_range_start = transactions.iter().map(|t| t.date.clone()).min();
    let date_range_end = transactions.iter().map(|t| t.date.clone()).max();

    store.atomically(|s| {
        if s.checksum_seen(&checksum)? {
            warn!(filename, %checksum, "file was imported before; relying on reference de-duplication");
        }
        let existing = s.existing_ref_nos()?;
        let rules = s.rules()?;

        let mut fresh = Vec::with_capacity(total);
        let mut duplicates = 0usize;
        for parsed in transactions {
            if is_duplicate(&parsed.ref_no, &existing) {
                duplicates += 1;
                continue;
            }
            let mut tx = Transaction::from_parsed(parsed, bank);
            let result = categorize(&tx, &rules);
            debug!(narration = %tx.narration, rule_id = ?result.rule_id, category = %result.category, "categorized");
            tx.category = result.category;
            tx.merchant = result.merchant;
            fresh.push(tx);
        }

        let import_id = s.record_import(&ImportRecord {
            id: None,
            filename: filename.to_string(),
            bank: bank.to_string(),
            checksum: checksum.clone(),
            record_count: fresh.len() as i64,
            date_range_start,
            date_range_end,
            imported_at: None,
        })?;
        for tx in &mut fresh {
            tx.import_id = Some(import_id);
        }
        let imported = s.insert_transactions(&fresh)?;

        info!(bank, filename, imported, duplicates, malformed, "imported statement");
        Ok(ImportResult {
            imported,
            skipped: duplicates + malformed,
            duplicates,
            malformed,
            total,
            bank: bank.to_string(),
            confidence: None,
            import_id: Some(import_id),
        })
    })
}
