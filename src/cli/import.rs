use std::io::Read;
use std::path::{Path, PathBuf};

use colored::Colorize;

use crate::cli::{file_name, open_db, read_lossy};
use crate::error::{PassbookError, Result};
use crate::generic::{import_generic, GenericFormat};
use crate::importer::{import_file, import_file_as, import_statement};
use crate::normalize::strip_bom;
use crate::parsers::get_by_key;

/// Path argument that reads the statement from standard input.
const STDIN: &str = "-";

pub fn run(file: &str, bank: Option<&str>, columns: Option<&str>) -> Result<()> {
    let conn = open_db()?;
    let path = PathBuf::from(file);

    let result = match (bank, columns) {
        (_, Some(aliases)) => {
            let format = GenericFormat::load(Path::new(aliases))?;
            let content = read_lossy(&path)?;
            import_generic(&conn, &format, strip_bom(&content), &file_name(&path))?
        }
        (Some(key), None) => {
            let parser = get_by_key(key).ok_or_else(|| {
                PassbookError::Other(format!("Unknown bank key: {key}. Run `passbook banks` for the list."))
            })?;
            import_file_as(&conn, &path, Some(parser))?
        }
        (None, None) if file == STDIN => {
            let mut bytes = Vec::new();
            std::io::stdin().read_to_end(&mut bytes)?;
            let content = String::from_utf8_lossy(&bytes);
            import_statement(&conn, strip_bom(&content), "stdin")?
        }
        (None, None) => import_file(&conn, &path)?,
    };

    let detected = result
        .confidence
        .map(|c| format!(", confidence {c:.2}"))
        .unwrap_or_default();
    println!(
        "{} {} from {} ({}{detected})",
        "Imported".green().bold(),
        result.imported,
        if file == STDIN { "stdin".to_string() } else { file_name(&path) },
        result.bank
    );
    println!(
        "{} skipped: {} duplicates, {} malformed ({} rows parsed)",
        result.skipped, result.duplicates, result.malformed, result.total
    );
    Ok(())
}
