use std::sync::OnceLock;

use regex::Regex;
use tracing::info;

use crate::db::Store;
use crate::error::{PassbookError, Result};
use crate::models::{CategoryRule, ConditionField, ConditionOp, Transaction};

pub const UNCATEGORIZED: &str = "Uncategorized";

/// `eq` conditions compare amounts within half a paisa.
const EQ_TOLERANCE: f64 = 0.005;

/// Leading words that name a transfer rail or an account movement rather
/// than an employer; a payroll-suffix capture starting with one is rejected.
const NON_EMPLOYER_LEADS: &[&str] = &[
    "NEFT", "RTGS", "IMPS", "UPI", "ACH", "TRANSFER", "TRF", "CASH", "ATM", "CHQ", "BY", "TO", "FROM", "SELF",
];

/// Corporate suffixes dropped from extracted merchant names.
const NOISE_TOKENS: &[&str] = &["LIMITED", "LTD", "PRIVATE", "PVT", "SOLUTIONS", "TECHNOLOGIES"];

#[derive(Debug, Clone, PartialEq)]
pub struct Categorization {
    pub category: String,
    pub merchant: String,
    /// Rule that decided the category, if any.
    pub rule_id: Option<i64>,
}

// ---------------------------------------------------------------------------
// Rule matching
// ---------------------------------------------------------------------------

fn keyword(rule: &CategoryRule) -> Option<&str> {
    rule.keyword.as_deref().filter(|k| !k.trim().is_empty())
}

fn keyword_matches(keyword: &str, narration: &str, merchant: &str) -> bool {
    let needle = keyword.to_lowercase();
    narration.to_lowercase().contains(&needle) || merchant.to_lowercase().contains(&needle)
}

fn condition_matches(rule: &CategoryRule, withdrawal: f64, deposit: f64) -> bool {
    let Some(field) = rule.condition_field else {
        return false;
    };
    let (Some(op), Some(value)) = (rule.condition_op, rule.condition_value) else {
        return false;
    };
    let actual = match field {
        ConditionField::Withdrawal => withdrawal,
        ConditionField::Deposit => deposit,
    };
    match op {
        ConditionOp::Gt => actual > value,
        ConditionOp::Lt => actual < value,
        ConditionOp::Gte => actual >= value,
        ConditionOp::Lte => actual <= value,
        ConditionOp::Eq => (actual - value).abs() < EQ_TOLERANCE,
        ConditionOp::Between => rule
            .condition_value2
            .is_some_and(|upper| actual >= value && actual <= upper),
    }
}

/// Evaluate one rule against raw transaction fields. Keyword and numeric
/// clauses combine with AND; a rule with neither never matches.
pub fn matches_fields(
    rule: &CategoryRule,
    narration: &str,
    merchant: &str,
    withdrawal: f64,
    deposit: f64,
) -> bool {
    match (keyword(rule), rule.condition_field) {
        (None, None) => false,
        (Some(k), None) => keyword_matches(k, narration, merchant),
        (None, Some(_)) => condition_matches(rule, withdrawal, deposit),
        (Some(k), Some(_)) => {
            keyword_matches(k, narration, merchant) && condition_matches(rule, withdrawal, deposit)
        }
    }
}

pub fn matches(rule: &CategoryRule, tx: &Transaction) -> bool {
    matches_fields(rule, &tx.narration, &tx.merchant, tx.withdrawal, tx.deposit)
}

/// Reject rules that could never be stored meaningfully.
pub fn validate_rule(rule: &CategoryRule) -> Result<()> {
    if rule.is_inert() {
        return Err(PassbookError::InvalidRule(
            "a rule needs a keyword or an amount condition".into(),
        ));
    }
    if rule.condition_field.is_some() {
        let Some(op) = rule.condition_op else {
            return Err(PassbookError::InvalidRule("condition is missing an operator".into()));
        };
        let Some(low) = rule.condition_value else {
            return Err(PassbookError::InvalidRule("condition is missing a value".into()));
        };
        if op == ConditionOp::Between {
            match rule.condition_value2 {
                None => {
                    return Err(PassbookError::InvalidRule(
                        "between needs both a lower and an upper value".into(),
                    ))
                }
                Some(high) if high < low => {
                    return Err(PassbookError::InvalidRule(format!(
                        "between range is empty ({low} > {high})"
                    )))
                }
                _ => {}
            }
        }
    } else if rule.condition_op.is_some() || rule.condition_value.is_some() {
        return Err(PassbookError::InvalidRule(
            "condition operator given without a field (withdrawal or deposit)".into(),
        ));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Merchant extraction
// ---------------------------------------------------------------------------

fn merchant_patterns() -> &'static [(&'static str, Regex)] {
    static PATTERNS: OnceLock<Vec<(&'static str, Regex)>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        [
            ("upi", r"(?i)^UPI[-/](?:(?:DR|CR|P2M|P2A)/)?(?:\d+[-/])?([^-/@]+)"),
            ("neft_credit", r"(?i)^NEFT[\s-]*CR[-/\s]+[A-Z]{4}0[A-Z0-9]{6}[-/]([^-/]+)"),
            ("ach_debit", r"(?i)^ACH[\s-]*D[-/\s]+([^-/]+)"),
            ("imps", r"(?i)^IMPS[-/](?:\d+[-/])?([^-/]+)"),
            ("salary_prefix", r"(?i)^SAL(?:ARY)?[-\s]+(?:CR(?:EDIT)?[-\s]+)?([^-/\d][^-/]*)"),
            ("neft_payroll", r"(?i)^(?:NEFT|RTGS)[\s-]+(?:CR[\s-]+)?([A-Z][A-Z0-9 &.]*?)\s+(?:SALARY|PAYROLL)\b"),
            ("payroll_suffix", r"(?i)^([A-Z][A-Z0-9 &.]*?)\s+(?:SALARY|PAYROLL)\b"),
        ]
        .into_iter()
        .map(|(label, re)| (label, Regex::new(re).expect("valid regex")))
        .collect()
    })
}

fn clean_merchant(raw: &str) -> String {
    raw.split_whitespace()
        .filter(|token| {
            let bare = token.trim_matches(|c| c == '.' || c == ',').to_uppercase();
            !NOISE_TOKENS.contains(&bare.as_str())
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn leads_with_non_employer(capture: &str) -> bool {
    capture
        .split_whitespace()
        .next()
        .is_some_and(|first| NON_EMPLOYER_LEADS.contains(&first.to_uppercase().as_str()))
}

/// Display merchant for a narration: the first matching pattern's capture,
/// with corporate suffixes removed. Empty when no pattern applies.
pub fn extract_merchant(narration: &str) -> String {
    let narration = narration.trim();
    merchant_patterns()
        .iter()
        .find_map(|(label, re)| {
            let m = re.captures(narration)?.get(1)?;
            if matches!(*label, "neft_payroll" | "payroll_suffix") && leads_with_non_employer(m.as_str()) {
                return None;
            }
            Some(m)
        })
        .map(|m| clean_merchant(m.as_str()))
        .unwrap_or_default()
}

// ---------------------------------------------------------------------------
// Categorization
// ---------------------------------------------------------------------------

/// Pick the category for one transaction. The highest priority matching
/// rule wins; among equal priorities the lowest rule id wins.
pub fn categorize(tx: &Transaction, rules: &[CategoryRule]) -> Categorization {
    let merchant = extract_merchant(&tx.narration);
    let mut best: Option<&CategoryRule> = None;
    for rule in rules {
        if !matches_fields(rule, &tx.narration, &merchant, tx.withdrawal, tx.deposit) {
            continue;
        }
        best = match best {
            Some(b) if b.priority > rule.priority => Some(b),
            Some(b) if b.priority == rule.priority && b.id <= rule.id => Some(b),
            _ => Some(rule),
        };
    }
    Categorization {
        category: best
            .map(|r| r.category.clone())
            .unwrap_or_else(|| UNCATEGORIZED.to_string()),
        merchant,
        rule_id: best.map(|r| r.id),
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RecategorizeResult {
    pub total: usize,
    pub categorized: usize,
    pub uncategorized: usize,
    pub changed: usize,
}

/// Re-run the current rule set over every stored transaction in one atomic
/// batch. Only rows whose category or merchant changes are written.
pub fn recategorize_all<S: Store>(store: &S) -> Result<RecategorizeResult> {
    store.atomically(|s| {
        let rules = s.rules()?;
        let mut result = RecategorizeResult::default();
        for tx in s.transactions()? {
            let outcome = categorize(&tx, &rules);
            result.total += 1;
            if outcome.category == UNCATEGORIZED {
                result.uncategorized += 1;
            } else {
                result.categorized += 1;
            }
            if outcome.category == tx.category && outcome.merchant == tx.merchant {
                continue;
            }
            if let Some(id) = tx.id {
                s.update_categorization(id, &outcome.category, &outcome.merchant)?;
                result.changed += 1;
            }
        }
        info!(
            total = result.total,
            categorized = result.categorized,
            changed = result.changed,
            "recategorized transactions"
        );
        Ok(result)
    })
}
