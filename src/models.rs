use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Intermediate representation from a statement parser before categorization.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParsedTransaction {
    pub date: String,
    pub narration: String,
    pub ref_no: String,
    pub value_date: String,
    pub withdrawal: f64,
    pub deposit: f64,
    pub closing_balance: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Transaction {
    pub id: Option<i64>,
    pub date: String,
    pub narration: String,
    pub ref_no: String,
    pub value_date: String,
    pub withdrawal: f64,
    pub deposit: f64,
    pub closing_balance: f64,
    pub category: String,
    pub merchant: String,
    pub bank: String,
    pub import_id: Option<i64>,
}

impl Transaction {
    pub fn from_parsed(parsed: ParsedTransaction, bank: &str) -> Self {
        Self {
            id: None,
            date: parsed.date,
            narration: parsed.narration,
            ref_no: parsed.ref_no,
            value_date: parsed.value_date,
            withdrawal: parsed.withdrawal,
            deposit: parsed.deposit,
            closing_balance: parsed.closing_balance,
            category: String::new(),
            merchant: String::new(),
            bank: bank.to_string(),
            import_id: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub color: String,
    pub icon: String,
    pub group: String,
}

/// Amount column a numeric rule condition reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConditionField {
    Withdrawal,
    Deposit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConditionOp {
    Gt,
    Lt,
    Gte,
    Lte,
    Eq,
    Between,
}

impl ConditionField {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Withdrawal => "withdrawal",
            Self::Deposit => "deposit",
        }
    }
}

impl ConditionOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Gt => "gt",
            Self::Lt => "lt",
            Self::Gte => "gte",
            Self::Lte => "lte",
            Self::Eq => "eq",
            Self::Between => "between",
        }
    }
}

impl FromStr for ConditionField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "withdrawal" => Ok(Self::Withdrawal),
            "deposit" => Ok(Self::Deposit),
            other => Err(format!("unknown condition field '{other}' (expected withdrawal or deposit)")),
        }
    }
}

impl FromStr for ConditionOp {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "gt" => Ok(Self::Gt),
            "lt" => Ok(Self::Lt),
            "gte" => Ok(Self::Gte),
            "lte" => Ok(Self::Lte),
            "eq" => Ok(Self::Eq),
            "between" => Ok(Self::Between),
            other => Err(format!(
                "unknown condition op '{other}' (expected gt, lt, gte, lte, eq or between)"
            )),
        }
    }
}

impl fmt::Display for ConditionField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for ConditionOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Default)]
pub struct CategoryRule {
    pub id: i64,
    /// Category name, resolved from the rule's category row when loaded.
    pub category: String,
    pub keyword: Option<String>,
    pub priority: i64,
    pub condition_field: Option<ConditionField>,
    pub condition_op: Option<ConditionOp>,
    pub condition_value: Option<f64>,
    pub condition_value2: Option<f64>,
}

impl CategoryRule {
    /// A rule with neither a keyword nor a condition field can never match.
    pub fn is_inert(&self) -> bool {
        let no_keyword = self.keyword.as_deref().map_or(true, |k| k.trim().is_empty());
        no_keyword && self.condition_field.is_none()
    }

    /// Short human-readable description of the rule's matching clauses.
    pub fn describe(&self) -> String {
        let mut parts = Vec::new();
        if let Some(k) = self.keyword.as_deref().filter(|k| !k.trim().is_empty()) {
            parts.push(format!("keyword '{k}'"));
        }
        if let Some(field) = self.condition_field {
            let op = self.condition_op.map(|o| o.as_str()).unwrap_or("?");
            let v1 = self.condition_value.map(|v| v.to_string()).unwrap_or_else(|| "?".into());
            match self.condition_op {
                Some(ConditionOp::Between) => {
                    let v2 = self.condition_value2.map(|v| v.to_string()).unwrap_or_else(|| "?".into());
                    parts.push(format!("{field} between {v1} and {v2}"));
                }
                _ => parts.push(format!("{field} {op} {v1}")),
            }
        }
        if parts.is_empty() {
            "(inert)".to_string()
        } else {
            parts.join(" and ")
        }
    }
}

#[derive(Debug, Clone)]
pub struct ImportRecord {
    pub id: Option<i64>,
    pub filename: String,
    pub bank: String,
    pub checksum: String,
    pub record_count: i64,
    pub date_range_start: Option<String>,
    pub date_range_end: Option<String>,
    pub imported_at: Option<String>,
}

/// Logical statement columns a delimited layout can resolve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Date,
    Narration,
    RefNo,
    ValueDate,
    Withdrawal,
    Deposit,
    Amount,
    Indicator,
    ClosingBalance,
}
