use comfy_table::{Cell, Table};

use crate::error::Result;
use crate::parsers::registry;

pub fn run() -> Result<()> {
    let mut table = Table::new();
    table.set_header(vec!["Key", "Bank"]);
    for parser in registry() {
        table.add_row(vec![Cell::new(parser.key()), Cell::new(parser.name())]);
    }
    println!("Supported formats\n{table}");
    println!("Other layouts: passbook import <file> --columns <aliases.json>");
    Ok(())
}
