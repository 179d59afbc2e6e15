use crate::categorizer::recategorize_all;
use crate::cli::open_db;
use crate::error::Result;

pub fn run() -> Result<()> {
    let conn = open_db()?;
    let result = recategorize_all(&conn)?;
    println!(
        "{} transactions: {} categorized, {} uncategorized ({} changed)",
        result.total, result.categorized, result.uncategorized, result.changed
    );
    Ok(())
}
