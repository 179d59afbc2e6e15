//! Import for layouts no registered bank parser recognises. The caller
//! supplies the header aliases as JSON:
//!
//! ```json
//! {
//!   "name": "My Credit Union",
//!   "required": ["posted on", "memo"],
//!   "columns": {
//!     "date": ["posted on"],
//!     "narration": ["memo"],
//!     "withdrawal": ["money out"],
//!     "deposit": ["money in"]
//!   }
//! }
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;

use crate::db::Store;
use crate::error::{PassbookError, Result};
use crate::importer::{compute_checksum, persist_batch, ImportResult};
use crate::models::Field;
use crate::normalize::{split_cells, strip_bom};
use crate::parsers::delimited::{find_header_row, locate_columns, walk_rows};
use crate::parsers::{ParseOutcome, HEADER_SCAN_LIMIT};

pub const GENERIC_BANK: &str = "generic";

#[derive(Debug, Clone, Deserialize)]
pub struct GenericFormat {
    #[serde(default)]
    pub name: Option<String>,
    /// Substrings that identify the header row. When empty, the first line
    /// resolving both a date and a narration column is the header.
    #[serde(default)]
    pub required: Vec<String>,
    pub columns: BTreeMap<Field, Vec<String>>,
}

impl GenericFormat {
    pub fn from_json(json: &str) -> Result<Self> {
        let format: Self =
            serde_json::from_str(json).map_err(|e| PassbookError::InvalidFormat(e.to_string()))?;
        format.validate()?;
        Ok(format)
    }

    pub fn load(path: &Path) -> Result<Self> {
        Self::from_json(&std::fs::read_to_string(path)?)
    }

    pub fn validate(&self) -> Result<()> {
        for field in [Field::Date, Field::Narration] {
            let has_alias = self
                .columns
                .get(&field)
                .is_some_and(|aliases| aliases.iter().any(|a| !a.trim().is_empty()));
            if !has_alias {
                return Err(PassbookError::InvalidFormat(format!(
                    "columns must give at least one alias for '{}'",
                    field_name(field)
                )));
            }
        }
        Ok(())
    }

    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("generic format")
    }

    fn alias_table(&self) -> Vec<(Field, Vec<String>)> {
        self.columns
            .iter()
            .map(|(field, aliases)| {
                let cleaned = aliases
                    .iter()
                    .map(|a| a.trim().to_lowercase())
                    .filter(|a| !a.is_empty())
                    .collect();
                (*field, cleaned)
            })
            .collect()
    }

    pub fn parse(&self, content: &str) -> ParseOutcome {
        let table = self.alias_table();
        let aliases: Vec<(Field, &[String])> =
            table.iter().map(|(f, a)| (*f, a.as_slice())).collect();
        let lines: Vec<&str> = strip_bom(content).lines().collect();

        let header = if self.required.is_empty() {
            lines.iter().take(HEADER_SCAN_LIMIT).position(|line| {
                let columns = locate_columns(&split_cells(line), &aliases);
                columns.has(Field::Date) && columns.has(Field::Narration)
            })
        } else {
            find_header_row(&lines, &self.required, HEADER_SCAN_LIMIT)
        };
        let Some(index) = header else {
            return ParseOutcome::default();
        };
        let columns = locate_columns(&split_cells(lines[index]), &aliases);
        walk_rows(&lines[index + 1..], &columns)
    }
}

fn field_name(field: Field) -> &'static str {
    match field {
        Field::Date => "date",
        Field::Narration => "narration",
        Field::RefNo => "ref_no",
        Field::ValueDate => "value_date",
        Field::Withdrawal => "withdrawal",
        Field::Deposit => "deposit",
        Field::Amount => "amount",
        Field::Indicator => "indicator",
        Field::ClosingBalance => "closing_balance",
    }
}

/// Parse `content` with a caller-supplied format and persist it through the
/// same de-duplication and categorization path as bank imports.
pub fn import_generic<S: Store>(
    store: &S,
    format: &GenericFormat,
    content: &str,
    filename: &str,
) -> Result<ImportResult> {
    let outcome = format.parse(content);
    if outcome.transactions.is_empty() {
        return Err(PassbookError::EmptyResult {
            bank: format.display_name().to_string(),
        });
    }
    persist_batch(store, outcome, GENERIC_BANK, filename, compute_checksum(content.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{get_connection, init_db};
    use crate::error::ErrorKind;

    const FORMAT: &str = r#"{
        "name": "Credit Union",
        "required": ["posted on", "memo"],
        "columns": {
            "date": ["posted on"],
            "narration": ["memo"],
            "withdrawal": ["money out"],
            "deposit": ["money in"],
            "closing_balance": ["running"]
        }
    }"#;

    const CONTENT: &str = "\
Credit Union Export
Posted On,Memo,Money Out,Money In,Running
03/02/2024,UPI/401/ZOMATO/food,250.00,,750.00
04/02/2024,REFUND,,100.00,850.00
Total,,,,
";

    #[test]
    fn test_parse_with_required_headers() {
        let format = GenericFormat::from_json(FORMAT).unwrap();
        let out = format.parse(CONTENT);
        assert_eq!(out.transactions.len(), 2);
        assert_eq!(out.skipped, 1);
        assert_eq!(out.transactions[0].date, "2024-02-03");
        assert_eq!(out.transactions[0].withdrawal, 250.0);
        assert_eq!(out.transactions[1].deposit, 100.0);
        assert_eq!(out.transactions[1].closing_balance, 850.0);
    }

    #[test]
    fn test_header_found_from_aliases_alone() {
        let json = r#"{"columns": {"date": ["Posted On"], "narration": ["Memo"], "amount": ["Money Out"]}}"#;
        let format = GenericFormat::from_json(json).unwrap();
        let out = format.parse(CONTENT);
        assert_eq!(out.transactions.len(), 2);
        assert_eq!(out.transactions[0].deposit, 250.0);
    }

    #[test]
    fn test_missing_date_or_narration_is_invalid() {
        let err = GenericFormat::from_json(r#"{"columns": {"narration": ["memo"]}}"#).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidFormat);
        assert!(err.to_string().contains("'date'"));
        let err = GenericFormat::from_json(r#"{"columns": {"date": ["d"], "narration": [" "]}}"#).unwrap_err();
        assert!(err.to_string().contains("'narration'"));
    }

    #[test]
    fn test_unknown_field_is_invalid() {
        let err = GenericFormat::from_json(r#"{"columns": {"date": ["d"], "payee": ["p"]}}"#).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidFormat);
    }

    #[test]
    fn test_import_generic_persists_with_generic_bank() {
        let dir = tempfile::tempdir().unwrap();
        let conn = get_connection(&dir.path().join("test.db")).unwrap();
        init_db(&conn).unwrap();
        let format = GenericFormat::from_json(FORMAT).unwrap();

        let result = import_generic(&conn, &format, CONTENT, "cu.csv").unwrap();
        assert_eq!(result.imported, 2);
        assert_eq!(result.bank, GENERIC_BANK);
        let txs = conn.transactions().unwrap();
        assert!(txs.iter().all(|t| t.bank == GENERIC_BANK));
        assert_eq!(txs[0].category, "Food & Dining");

        let err = import_generic(&conn, &format, "nothing here\n", "empty.csv").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::EmptyResult);
        assert!(err.to_string().contains("Credit Union"));
    }
}
