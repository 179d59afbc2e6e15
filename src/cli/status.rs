use crate::categorizer::UNCATEGORIZED;
use crate::db::get_connection;
use crate::error::Result;
use crate::fmt::{amount, format_bytes};
use crate::settings::{db_path, load_settings};

pub fn run() -> Result<()> {
    let settings = load_settings();
    let db_path = db_path();

    println!("Data dir:   {}", settings.data_dir);
    println!("Database:   {}", db_path.display());
    println!("Log level:  {}", settings.log_level);

    if db_path.exists() {
        let size = std::fs::metadata(&db_path)?.len();
        println!("DB size:    {}", format_bytes(size));

        let conn = get_connection(&db_path)?;
        let count = |sql: &str| -> Result<i64> { Ok(conn.query_row(sql, [], |r| r.get(0))?) };

        let transactions = count("SELECT count(*) FROM transactions")?;
        let uncategorized: i64 = conn.query_row(
            "SELECT count(*) FROM transactions WHERE category = ?1",
            [UNCATEGORIZED],
            |r| r.get(0),
        )?;
        let imports = count("SELECT count(*) FROM imports")?;
        let categories = count("SELECT count(*) FROM categories")?;
        let rules = count("SELECT count(*) FROM category_rules")?;
        let (debits, credits): (f64, f64) = conn.query_row(
            "SELECT coalesce(sum(withdrawal), 0), coalesce(sum(deposit), 0) FROM transactions",
            [],
            |r| Ok((r.get(0)?, r.get(1)?)),
        )?;

        println!();
        println!("Transactions:   {transactions}");
        println!("Uncategorized:  {uncategorized}");
        println!("Imports:        {imports}");
        println!("Categories:     {categories}");
        println!("Rules:          {rules}");
        println!("Withdrawals:    {}", amount(debits));
        println!("Deposits:       {}", amount(credits));
    } else {
        println!();
        println!("Database not found. Run `passbook init` to set up.");
    }

    Ok(())
}
