use std::io::Write;
use std::path::PathBuf;

use crate::cli::open_db;
use crate::db::Store;
use crate::error::Result;
use crate::models::Transaction;
use crate::settings::get_data_dir;

fn default_path() -> PathBuf {
    let date = chrono::Local::now().format("%Y-%m-%d").to_string();
    get_data_dir().join("exports").join(format!("transactions-{date}.csv"))
}

/// Write transactions as CSV with a header row.
pub fn write_csv<W: Write>(txs: &[Transaction], writer: W) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    for tx in txs {
        wtr.serialize(tx)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn run(output: Option<String>) -> Result<()> {
    let conn = open_db()?;
    let txs = conn.transactions()?;
    let path = output.map(PathBuf::from).unwrap_or_else(default_path);
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    write_csv(&txs, std::fs::File::create(&path)?)?;
    println!("Wrote {} transactions to {}", txs.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ParsedTransaction;

    #[test]
    fn test_write_csv_has_header_and_rows() {
        let mut tx = Transaction::from_parsed(
            ParsedTransaction {
                date: "2024-01-01".into(),
                narration: "POS BIGBASKET, BLR".into(),
                ref_no: "".into(),
                value_date: "2024-01-01".into(),
                withdrawal: 1245.0,
                deposit: 0.0,
                closing_balance: 128305.0,
            },
            "hdfc",
        );
        tx.category = "Groceries".into();
        let mut buf = Vec::new();
        write_csv(&[tx], &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next().unwrap(),
            "id,date,narration,ref_no,value_date,withdrawal,deposit,closing_balance,category,merchant,bank,import_id"
        );
        assert_eq!(
            lines.next().unwrap(),
            ",2024-01-01,\"POS BIGBASKET, BLR\",,2024-01-01,1245.0,0.0,128305.0,Groceries,,hdfc,"
        );
    }
}
