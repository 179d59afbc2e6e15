use comfy_table::{Cell, Table};

use crate::cli::open_db;
use crate::db::import_history;
use crate::error::Result;

pub fn run() -> Result<()> {
    let conn = open_db()?;
    let records = import_history(&conn)?;
    if records.is_empty() {
        println!("No imports yet.");
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec!["ID", "File", "Bank", "Rows", "From", "To", "Imported", "Checksum"]);
    for r in records {
        table.add_row(vec![
            Cell::new(r.id.unwrap_or_default()),
            Cell::new(r.filename),
            Cell::new(r.bank),
            Cell::new(r.record_count),
            Cell::new(r.date_range_start.unwrap_or_default()),
            Cell::new(r.date_range_end.unwrap_or_default()),
            Cell::new(r.imported_at.unwrap_or_default()),
            Cell::new(r.checksum.get(..12).unwrap_or(r.checksum.as_str())),
        ]);
    }
    println!("Imports\n{table}");
    Ok(())
}
