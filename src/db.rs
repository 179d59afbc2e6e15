use std::collections::HashSet;
use std::path::Path;

use rusqlite::{params, Connection, OptionalExtension};
use tracing::warn;

use crate::error::Result;
use crate::models::{CategoryRule, ConditionField, ConditionOp, ImportRecord, Transaction};

pub const DB_FILE: &str = "passbook.db";

pub const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS categories (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL UNIQUE,
    color TEXT NOT NULL DEFAULT '#9e9e9e',
    icon TEXT NOT NULL DEFAULT '',
    category_group TEXT NOT NULL DEFAULT 'expense'
);

CREATE TABLE IF NOT EXISTS category_rules (
    id INTEGER PRIMARY KEY,
    category_id INTEGER NOT NULL,
    keyword TEXT,
    priority INTEGER NOT NULL DEFAULT 0,
    condition_field TEXT,
    condition_op TEXT,
    condition_value REAL,
    condition_value2 REAL,
    created_at TEXT DEFAULT (datetime('now')),
    FOREIGN KEY (category_id) REFERENCES categories(id) ON DELETE CASCADE
);

CREATE TABLE IF NOT EXISTS imports (
    id INTEGER PRIMARY KEY,
    filename TEXT NOT NULL,
    bank TEXT NOT NULL,
    checksum TEXT NOT NULL,
    record_count INTEGER NOT NULL DEFAULT 0,
    date_range_start TEXT,
    date_range_end TEXT,
    imported_at TEXT DEFAULT (datetime('now'))
);

CREATE TABLE IF NOT EXISTS transactions (
    id INTEGER PRIMARY KEY,
    date TEXT NOT NULL,
    narration TEXT NOT NULL,
    ref_no TEXT NOT NULL DEFAULT '',
    value_date TEXT NOT NULL,
    withdrawal REAL NOT NULL DEFAULT 0,
    deposit REAL NOT NULL DEFAULT 0,
    closing_balance REAL NOT NULL DEFAULT 0,
    category TEXT NOT NULL DEFAULT 'Uncategorized',
    merchant TEXT NOT NULL DEFAULT '',
    bank TEXT NOT NULL,
    import_id INTEGER,
    created_at TEXT DEFAULT (datetime('now')),
    FOREIGN KEY (import_id) REFERENCES imports(id)
);

CREATE INDEX IF NOT EXISTS idx_transactions_ref_no ON transactions(ref_no);
CREATE INDEX IF NOT EXISTS idx_transactions_date ON transactions(date);
";

// (name, color, icon, group)
const DEFAULT_CATEGORIES: &[(&str, &str, &str, &str)] = &[
    // Income
    ("Salary", "#2e7d32", "briefcase", "income"),
    ("Interest", "#43a047", "percent", "income"),
    ("Refunds", "#66bb6a", "rotate-ccw", "income"),
    // Expenses
    ("Food & Dining", "#ef6c00", "utensils", "expense"),
    ("Groceries", "#8d6e63", "shopping-basket", "expense"),
    ("Shopping", "#ad1457", "shopping-bag", "expense"),
    ("Transport", "#1565c0", "car", "expense"),
    ("Fuel", "#5d4037", "fuel", "expense"),
    ("Travel", "#00838f", "plane", "expense"),
    ("Bills & Utilities", "#6a1b9a", "zap", "expense"),
    ("Rent", "#4e342e", "home", "expense"),
    ("Entertainment", "#c62828", "film", "expense"),
    ("Health", "#d81b60", "heart-pulse", "expense"),
    ("EMI & Loans", "#37474f", "landmark", "expense"),
    ("Insurance", "#455a64", "shield", "expense"),
    ("Cash Withdrawal", "#757575", "banknote", "expense"),
    ("Bank Charges", "#9e9d24", "receipt", "expense"),
    // Neutral
    ("Investments", "#283593", "trending-up", "transfer"),
    ("Transfers", "#546e7a", "repeat", "transfer"),
    ("Uncategorized", "#9e9e9e", "help-circle", "expense"),
];

// (keyword, category, priority)
const DEFAULT_RULES: &[(&str, &str, i64)] = &[
    ("swiggy", "Food & Dining", 10),
    ("zomato", "Food & Dining", 10),
    ("blinkit", "Groceries", 10),
    ("bigbasket", "Groceries", 10),
    ("instamart", "Groceries", 20),
    ("amazon", "Shopping", 5),
    ("flipkart", "Shopping", 5),
    ("uber", "Transport", 10),
    ("irctc", "Travel", 10),
    ("petrol", "Fuel", 10),
    ("electricity", "Bills & Utilities", 10),
    ("airtel", "Bills & Utilities", 10),
    ("netflix", "Entertainment", 10),
    ("bookmyshow", "Entertainment", 10),
    ("pharmacy", "Health", 10),
    ("zerodha", "Investments", 10),
    ("atm wdl", "Cash Withdrawal", 10),
    ("cash withdrawal", "Cash Withdrawal", 10),
    ("salary", "Salary", 5),
    ("interest", "Interest", 5),
    ("int.pd", "Interest", 5),
    ("charges", "Bank Charges", 5),
    ("annual fee", "Bank Charges", 5),
];

pub fn get_connection(db_path: &Path) -> Result<Connection> {
    let conn = Connection::open(db_path)?;
    conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;
    Ok(conn)
}

/// Create the schema and, on a fresh database, seed the default categories
/// and keyword rules.
pub fn init_db(conn: &Connection) -> Result<()> {
    conn.execute_batch(SCHEMA)?;

    let count: i64 = conn.query_row("SELECT count(*) FROM categories", [], |row| row.get(0))?;
    if count == 0 {
        for (name, color, icon, group) in DEFAULT_CATEGORIES {
            conn.execute(
                "INSERT INTO categories (name, color, icon, category_group) VALUES (?1, ?2, ?3, ?4)",
                params![name, color, icon, group],
            )?;
        }
        for (keyword, category, priority) in DEFAULT_RULES {
            conn.execute(
                "INSERT INTO category_rules (category_id, keyword, priority) \
                 SELECT id, ?1, ?2 FROM categories WHERE name = ?3",
                params![keyword, priority, category],
            )?;
        }
    }
    Ok(())
}

/// Persistence collaborator of the import and recategorization pipelines.
pub trait Store {
    /// Every usable rule with its category name resolved.
    fn rules(&self) -> Result<Vec<CategoryRule>>;

    /// Non-empty reference numbers already stored.
    fn existing_ref_nos(&self) -> Result<HashSet<String>>;

    /// All stored transactions, oldest first.
    fn transactions(&self) -> Result<Vec<Transaction>>;

    fn insert_transactions(&self, txs: &[Transaction]) -> Result<usize>;

    fn update_categorization(&self, id: i64, category: &str, merchant: &str) -> Result<()>;

    fn record_import(&self, record: &ImportRecord) -> Result<i64>;

    fn checksum_seen(&self, checksum: &str) -> Result<bool>;

    /// Run `f` as one unit: every write inside commits together or not at all.
    fn atomically<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Self) -> Result<T>;
}

struct RuleRow {
    rule: CategoryRule,
    field: Option<String>,
    op: Option<String>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

impl Store for Connection {
    fn rules(&self) -> Result<Vec<CategoryRule>> {
        let mut stmt = self.prepare(
            "SELECT r.id, c.name, r.keyword, r.priority, \
             r.condition_field, r.condition_op, r.condition_value, r.condition_value2 \
             FROM category_rules r JOIN categories c ON r.category_id = c.id \
             ORDER BY r.id",
        )?;
        let rows = stmt
            .query_map([], |row| {
                Ok(RuleRow {
                    rule: CategoryRule {
                        id: row.get(0)?,
                        category: row.get(1)?,
                        keyword: non_empty(row.get(2)?),
                        priority: row.get(3)?,
                        condition_value: row.get(6)?,
                        condition_value2: row.get(7)?,
                        ..Default::default()
                    },
                    field: non_empty(row.get(4)?),
                    op: non_empty(row.get(5)?),
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let mut rules = Vec::with_capacity(rows.len());
        for RuleRow { mut rule, field, op } in rows {
            let field = field.map(|f| f.parse::<ConditionField>()).transpose();
            let op = op.map(|o| o.parse::<ConditionOp>()).transpose();
            match (field, op) {
                (Ok(field), Ok(op)) => {
                    rule.condition_field = field;
                    rule.condition_op = op;
                    rules.push(rule);
                }
                (Err(e), _) | (_, Err(e)) => {
                    warn!(rule_id = rule.id, error = %e, "ignoring rule with invalid condition");
                }
            }
        }
        Ok(rules)
    }

    fn existing_ref_nos(&self) -> Result<HashSet<String>> {
        let mut stmt = self.prepare("SELECT DISTINCT ref_no FROM transactions WHERE ref_no <> ''")?;
        let refs = stmt
            .query_map([], |row| row.get(0))?
            .collect::<std::result::Result<HashSet<String>, _>>()?;
        Ok(refs)
    }

    fn transactions(&self) -> Result<Vec<Transaction>> {
        let mut stmt = self.prepare(
            "SELECT id, date, narration, ref_no, value_date, withdrawal, deposit, \
             closing_balance, category, merchant, bank, import_id \
             FROM transactions ORDER BY date, id",
        )?;
        let txs = stmt
            .query_map([], |row| {
                Ok(Transaction {
                    id: row.get(0)?,
                    date: row.get(1)?,
                    narration: row.get(2)?,
                    ref_no: row.get(3)?,
                    value_date: row.get(4)?,
                    withdrawal: row.get(5)?,
                    deposit: row.get(6)?,
                    closing_balance: row.get(7)?,
                    category: row.get(8)?,
                    merchant: row.get(9)?,
                    bank: row.get(10)?,
                    import_id: row.get(11)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(txs)
    }

    fn insert_transactions(&self, txs: &[Transaction]) -> Result<usize> {
        let mut stmt = self.prepare_cached(
            "INSERT INTO transactions (date, narration, ref_no, value_date, withdrawal, deposit, \
             closing_balance, category, merchant, bank, import_id) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
        )?;
        let mut inserted = 0;
        for tx in txs {
            inserted += stmt.execute(params![
                tx.date,
                tx.narration,
                tx.ref_no,
                tx.value_date,
                tx.withdrawal,
                tx.deposit,
                tx.closing_balance,
                tx.category,
                tx.merchant,
                tx.bank,
                tx.import_id,
            ])?;
        }
        Ok(inserted)
    }

    fn update_categorization(&self, id: i64, category: &str, merchant: &str) -> Result<()> {
        self.execute(
            "UPDATE transactions SET category = ?1, merchant = ?2 WHERE id = ?3",
            params![category, merchant, id],
        )?;
        Ok(())
    }

    fn record_import(&self, record: &ImportRecord) -> Result<i64> {
        self.execute(
            "INSERT INTO imports (filename, bank, checksum, record_count, date_range_start, date_range_end) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                record.filename,
                record.bank,
                record.checksum,
                record.record_count,
                record.date_range_start,
                record.date_range_end,
            ],
        )?;
        Ok(self.last_insert_rowid())
    }

    fn checksum_seen(&self, checksum: &str) -> Result<bool> {
        let mut stmt = self.prepare_cached("SELECT 1 FROM imports WHERE checksum = ?1")?;
        Ok(stmt.exists([checksum])?)
    }

    fn atomically<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Self) -> Result<T>,
    {
        let tx = self.unchecked_transaction()?;
        let out = f(self)?;
        tx.commit()?;
        Ok(out)
    }
}

/// Import history, newest first.
pub fn import_history(conn: &Connection) -> Result<Vec<ImportRecord>> {
    let mut stmt = conn.prepare(
        "SELECT id, filename, bank, checksum, record_count, date_range_start, date_range_end, imported_at \
         FROM imports ORDER BY id DESC",
    )?;
    let records = stmt
        .query_map([], |row| {
            Ok(ImportRecord {
                id: row.get(0)?,
                filename: row.get(1)?,
                bank: row.get(2)?,
                checksum: row.get(3)?,
                record_count: row.get(4)?,
                date_range_start: row.get(5)?,
                date_range_end: row.get(6)?,
                imported_at: row.get(7)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(records)
}

pub fn category_id(conn: &Connection, name: &str) -> Result<Option<i64>> {
    Ok(conn
        .query_row("SELECT id FROM categories WHERE name = ?1", [name], |row| row.get(0))
        .optional()?)
}
