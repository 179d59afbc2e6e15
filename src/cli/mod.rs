pub mod banks;
pub mod categories;
pub mod categorize;
pub mod detect;
pub mod export;
pub mod history;
pub mod import;
pub mod init;
pub mod rules;
pub mod status;

use std::path::Path;

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use rusqlite::Connection;

use crate::db::get_connection;
use crate::error::{PassbookError, Result};
use crate::models::{ConditionField, ConditionOp};
use crate::settings::db_path;

/// Open the configured database, refusing to create an empty one.
pub(crate) fn open_db() -> Result<Connection> {
    let path = db_path();
    if !path.exists() {
        return Err(PassbookError::Other(format!(
            "No database at {}. Run `passbook init` first.",
            path.display()
        )));
    }
    get_connection(&path)
}

pub(crate) fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default()
}

/// Read a statement as text. Invalid UTF-8 is replaced rather than rejected.
pub(crate) fn read_lossy(path: &Path) -> Result<String> {
    let bytes = std::fs::read(path)?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

pub fn completions(shell: Shell) -> Result<()> {
    let mut cmd = Cli::command();
    clap_complete::generate(shell, &mut cmd, "passbook", &mut std::io::stdout());
    Ok(())
}

#[derive(Parser)]
#[command(
    name = "passbook",
    version,
    about = "Import Indian bank statements and categorize transactions with rules."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Choose a data directory and initialize the database.
    Init {
        /// Path for passbook data (default: ~/Documents/passbook)
        #[arg(long = "data-dir")]
        data_dir: Option<String>,
    },
    /// Show the current database and summary statistics.
    Status,
    /// List the supported bank statement formats.
    Banks,
    /// Score a statement against every bank format without importing it.
    Detect {
        /// Path to the statement export
        file: String,
    },
    /// Import a statement and categorize its transactions.
    Import {
        /// Path to the statement export (CSV or HDFC plain text), or `-` for stdin
        file: String,
        /// Bank format key (see `passbook banks`); skips detection
        #[arg(long, conflicts_with = "columns")]
        bank: Option<String>,
        /// JSON column-alias file for layouts no bank format recognises
        #[arg(long)]
        columns: Option<String>,
    },
    /// Re-run the rules over every stored transaction.
    Categorize,
    /// Manage categorization rules.
    Rules {
        #[command(subcommand)]
        command: RulesCommands,
    },
    /// Manage categories.
    Categories {
        #[command(subcommand)]
        command: CategoriesCommands,
    },
    /// Show previous imports.
    History,
    /// Export all transactions to CSV.
    Export {
        /// Output file (default: <data_dir>/exports/transactions-YYYY-MM-DD.csv)
        #[arg(long)]
        output: Option<String>,
    },
    /// Print shell completions.
    Completions {
        shell: Shell,
    },
}

#[derive(Subcommand)]
pub enum RulesCommands {
    /// Add a categorization rule.
    Add {
        /// Category name to assign
        #[arg(long)]
        category: String,
        /// Case-insensitive substring of the narration or merchant
        #[arg(long)]
        keyword: Option<String>,
        /// Rule priority (higher wins)
        #[arg(long, default_value = "0")]
        priority: i64,
        /// Amount to test: withdrawal or deposit
        #[arg(long)]
        field: Option<ConditionField>,
        /// Comparison: gt, lt, gte, lte, eq, between
        #[arg(long)]
        op: Option<ConditionOp>,
        /// Comparison value (lower bound for between)
        #[arg(long, allow_hyphen_values = true)]
        value: Option<f64>,
        /// Upper bound for between
        #[arg(long, allow_hyphen_values = true)]
        value2: Option<f64>,
    },
    /// List all rules.
    List,
    /// Delete a rule by ID.
    Delete {
        /// Rule ID (shown in `passbook rules list`)
        id: i64,
    },
    /// Re-apply every rule to every stored transaction.
    Apply,
}

#[derive(Subcommand)]
pub enum CategoriesCommands {
    /// Add a category.
    Add {
        name: String,
        /// income, expense or transfer
        #[arg(long, default_value = "expense")]
        group: String,
        #[arg(long, default_value = "#9e9e9e")]
        color: String,
        #[arg(long, default_value = "")]
        icon: String,
    },
    /// List categories.
    List,
    /// Delete a category and its rules.
    Delete {
        name: String,
    },
}
