//! Pure normalization helpers shared by every statement parser and the
//! generic column-alias import.

use std::sync::OnceLock;

use chrono::NaiveDate;
use regex::Regex;

const MONTHS: [&str; 12] = [
    "jan", "feb", "mar", "apr", "may", "jun", "jul", "aug", "sep", "oct", "nov", "dec",
];

fn day_month_name_year() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(\d{1,2})\s+([A-Za-z]{3})\s+(\d{4})$").expect("valid regex"))
}

fn day_month_year4() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(\d{1,2})[/-](\d{1,2})[/-](\d{4})$").expect("valid regex"))
}

fn day_month_year2() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(\d{1,2})[/-](\d{1,2})[/-](\d{2})$").expect("valid regex"))
}

fn iso(year: u32, month: u32, day: u32) -> String {
    format!("{year:04}-{month:02}-{day:02}")
}

fn month_number(abbrev: &str) -> Option<u32> {
    let lower = abbrev.to_ascii_lowercase();
    MONTHS.iter().position(|m| *m == lower).map(|i| i as u32 + 1)
}

/// Two-digit years above 50 belong to the 1900s, the rest to the 2000s.
fn expand_year(yy: u32) -> u32 {
    if yy > 50 {
        1900 + yy
    } else {
        2000 + yy
    }
}

/// Convert one of the three statement date shapes to `YYYY-MM-DD`:
/// `DD MMM YYYY`, `DD/MM/YYYY` (or `-`), and `DD/MM/YY` (or `-`).
///
/// Anything else is returned trimmed but otherwise unchanged; callers that
/// need a real date check the result with [`is_iso_date`].
pub fn normalize_date(raw: &str) -> String {
    let s = raw.trim();

    if let Some(c) = day_month_name_year().captures(s) {
        if let Some(month) = month_number(&c[2]) {
            let day: u32 = c[1].parse().unwrap_or(0);
            let year: u32 = c[3].parse().unwrap_or(0);
            return iso(year, month, day);
        }
        return s.to_string();
    }

    if let Some(c) = day_month_year4().captures(s) {
        let day: u32 = c[1].parse().unwrap_or(0);
        let month: u32 = c[2].parse().unwrap_or(0);
        let year: u32 = c[3].parse().unwrap_or(0);
        return iso(year, month, day);
    }

    if let Some(c) = day_month_year2().captures(s) {
        let day: u32 = c[1].parse().unwrap_or(0);
        let month: u32 = c[2].parse().unwrap_or(0);
        let yy: u32 = c[3].parse().unwrap_or(0);
        return iso(expand_year(yy), month, day);
    }

    s.to_string()
}

/// True when `s` is a real calendar date written as `YYYY-MM-DD`.
pub fn is_iso_date(s: &str) -> bool {
    s.len() == 10 && NaiveDate::parse_from_str(s, "%Y-%m-%d").is_ok()
}

/// Parse a statement amount cell. Thousands separators and parentheses are
/// stripped; empty or unparseable cells become 0.
///
/// Parenthesised values stay positive.
pub fn parse_amount(raw: &str) -> f64 {
    let s = raw.replace(',', "").replace(['(', ')'], "");
    s.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
}

/// Split one delimited line into trimmed cells. Quoted cells may contain
/// commas, and `""` inside quotes is a literal quote.
pub fn split_cells(line: &str) -> Vec<String> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(line.as_bytes());
    let mut record = csv::StringRecord::new();
    match rdr.read_record(&mut record) {
        Ok(true) => record.iter().map(|cell| cell.trim().to_string()).collect(),
        _ => Vec::new(),
    }
}

pub fn has_digit(s: &str) -> bool {
    s.chars().any(|c| c.is_ascii_digit())
}

/// `CR` or `C` (any case) marks a credit; every other indicator is a debit.
pub fn is_credit_indicator(raw: &str) -> bool {
    let s = raw.trim();
    s.eq_ignore_ascii_case("cr") || s.eq_ignore_ascii_case("c")
}

/// Split a single signed-or-unsigned amount into `(withdrawal, deposit)`
/// using a debit/credit indicator cell.
pub fn split_by_indicator(amount: f64, indicator: &str) -> (f64, f64) {
    if is_credit_indicator(indicator) {
        (0.0, amount.abs())
    } else {
        (amount.abs(), 0.0)
    }
}

/// Strip a UTF-8 byte-order mark some bank portals prepend to exports.
pub fn strip_bom(content: &str) -> &str {
    content.strip_prefix('\u{feff}').unwrap_or(content)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_date_shapes() {
        assert_eq!(normalize_date("31/01/24"), "2024-01-31");
        assert_eq!(normalize_date("31 Jan 2024"), "2024-01-31");
        assert_eq!(normalize_date("05-06-1998"), "1998-06-05");
        assert_eq!(normalize_date("5 sep 2023"), "2023-09-05");
        assert_eq!(normalize_date("01-12-2023"), "2023-12-01");
        assert_eq!(normalize_date(" 15/08/2022 "), "2022-08-15");
    }

    #[test]
    fn test_normalize_date_pivot_year() {
        assert_eq!(normalize_date("01/01/51"), "1951-01-01");
        assert_eq!(normalize_date("01/01/50"), "2050-01-01");
        assert_eq!(normalize_date("01-01-99"), "1999-01-01");
        assert_eq!(normalize_date("01-01-00"), "2000-01-01");
    }

    #[test]
    fn test_normalize_date_passes_unknown_shapes_through() {
        assert_eq!(normalize_date("2024-01-31"), "2024-01-31");
        assert_eq!(normalize_date("31-Jan-2024"), "31-Jan-2024");
        assert_eq!(normalize_date("31 Foo 2024"), "31 Foo 2024");
        assert_eq!(normalize_date("Opening Balance"), "Opening Balance");
    }

    #[test]
    fn test_is_iso_date() {
        assert!(is_iso_date("2024-01-31"));
        assert!(!is_iso_date("2024-02-30"));
        assert!(!is_iso_date("31-Jan-2024"));
        assert!(!is_iso_date("2024-1-31"));
        assert!(!is_iso_date(&normalize_date("31/13/2024")));
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("1,23,456.00"), 123456.0);
        assert_eq!(parse_amount(""), 0.0);
        assert_eq!(parse_amount("(500)"), 500.0);
        assert_eq!(parse_amount("  42.50 "), 42.5);
        assert_eq!(parse_amount("-12.00"), -12.0);
        assert_eq!(parse_amount("not_a_number"), 0.0);
        assert_eq!(parse_amount("inf"), 0.0);
    }

    #[test]
    fn test_split_cells() {
        assert_eq!(split_cells(r#"a,"b,c","d""e""#), vec!["a", "b,c", "d\"e"]);
        assert_eq!(split_cells("one, two ,three"), vec!["one", "two", "three"]);
        assert_eq!(split_cells("x,,"), vec!["x", "", ""]);
        assert!(split_cells("").is_empty());
    }

    #[test]
    fn test_indicator_split() {
        assert_eq!(split_by_indicator(250.0, "CR"), (0.0, 250.0));
        assert_eq!(split_by_indicator(250.0, " c "), (0.0, 250.0));
        assert_eq!(split_by_indicator(250.0, "DR"), (250.0, 0.0));
        assert_eq!(split_by_indicator(-75.0, ""), (75.0, 0.0));
    }

    #[test]
    fn test_strip_bom() {
        assert_eq!(strip_bom("\u{feff}Date,Narration"), "Date,Narration");
        assert_eq!(strip_bom("Date"), "Date");
    }
}
