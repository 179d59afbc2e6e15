use std::path::PathBuf;

use colored::Colorize;
use comfy_table::{Cell, Table};

use crate::cli::{file_name, read_lossy};
use crate::error::Result;
use crate::fmt::amount_or_blank;
use crate::normalize::strip_bom;
use crate::parsers::{detect, scores};

const PREVIEW_ROWS: usize = 5;

pub fn run(file: &str) -> Result<()> {
    let path = PathBuf::from(file);
    let raw = read_lossy(&path)?;
    let content = strip_bom(&raw);
    let filename = file_name(&path);

    let mut ranked: Vec<_> = scores(content, &filename)
        .into_iter()
        .filter(|(_, score)| *score > 0.0)
        .collect();
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1));

    if !ranked.is_empty() {
        let mut table = Table::new();
        table.set_header(vec!["Bank", "Key", "Confidence"]);
        for (parser, score) in &ranked {
            table.add_row(vec![
                Cell::new(parser.name()),
                Cell::new(parser.key()),
                Cell::new(format!("{score:.2}")),
            ]);
        }
        println!("{table}");
    }

    match detect(content, &filename) {
        Some(detection) => {
            let outcome = detection.parser.parse(content);
            println!(
                "{} {} ({:.2})",
                "Detected".green().bold(),
                detection.parser.name(),
                detection.confidence
            );
            println!(
                "{} transactions parsed, {} malformed rows skipped",
                outcome.transactions.len(),
                outcome.skipped
            );
            if !outcome.transactions.is_empty() {
                let mut preview = Table::new();
                preview.set_header(vec!["Date", "Narration", "Withdrawal", "Deposit"]);
                for tx in outcome.transactions.iter().take(PREVIEW_ROWS) {
                    preview.add_row(vec![
                        Cell::new(&tx.date),
                        Cell::new(&tx.narration),
                        Cell::new(amount_or_blank(tx.withdrawal)),
                        Cell::new(amount_or_blank(tx.deposit)),
                    ]);
                }
                println!("{preview}");
            }
        }
        None => {
            println!(
                "{}",
                "No supported bank format detected. Use `passbook import <file> --columns <aliases.json>`."
                    .yellow()
            );
        }
    }
    Ok(())
}
