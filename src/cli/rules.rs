use comfy_table::{Cell, Table};
use rusqlite::{params, Connection};

use crate::categorizer::{matches, recategorize_all, validate_rule};
use crate::cli::open_db;
use crate::db::{category_id, Store};
use crate::error::{PassbookError, Result};
use crate::models::{CategoryRule, ConditionField, ConditionOp};

#[allow(clippy::too_many_arguments)]
pub fn add(
    category: &str,
    keyword: Option<String>,
    priority: i64,
    field: Option<ConditionField>,
    op: Option<ConditionOp>,
    value: Option<f64>,
    value2: Option<f64>,
) -> Result<()> {
    let conn = open_db()?;
    let rule = CategoryRule {
        category: category.to_string(),
        keyword: keyword.filter(|k| !k.trim().is_empty()),
        priority,
        condition_field: field,
        condition_op: op,
        condition_value: value,
        condition_value2: value2,
        ..Default::default()
    };
    let id = add_rule(&conn, &rule)?;
    println!("Added rule {id}: {} \u{2192} {category}", rule.describe());
    Ok(())
}

pub fn list() -> Result<()> {
    let conn = open_db()?;
    let mut rules = conn.rules()?;
    rules.sort_by(|a, b| b.priority.cmp(&a.priority).then(a.id.cmp(&b.id)));
    let txs = conn.transactions()?;

    let mut table = Table::new();
    table.set_header(vec!["ID", "Category", "Priority", "Matches", "Hits"]);
    for rule in &rules {
        let hits = txs.iter().filter(|tx| matches(rule, tx)).count();
        table.add_row(vec![
            Cell::new(rule.id),
            Cell::new(&rule.category),
            Cell::new(rule.priority),
            Cell::new(rule.describe()),
            Cell::new(hits),
        ]);
    }
    println!("Rules\n{table}");
    Ok(())
}

pub fn delete(id: i64) -> Result<()> {
    let conn = open_db()?;
    delete_rule(&conn, id)?;
    println!("Deleted rule {id}");
    Ok(())
}

pub fn apply() -> Result<()> {
    let conn = open_db()?;
    let result = recategorize_all(&conn)?;
    println!(
        "Applied rules to {} transactions ({} changed, {} uncategorized)",
        result.total, result.changed, result.uncategorized
    );
    Ok(())
}

// ---------------------------------------------------------------------------
// Data-layer functions
// ---------------------------------------------------------------------------

/// Validate and store a rule against the category named in `rule.category`.
pub fn add_rule(conn: &Connection, rule: &CategoryRule) -> Result<i64> {
    validate_rule(rule)?;
    let cat_id = category_id(conn, &rule.category)?
        .ok_or_else(|| PassbookError::UnknownCategory(rule.category.clone()))?;
    conn.execute(
        "INSERT INTO category_rules \
         (category_id, keyword, priority, condition_field, condition_op, condition_value, condition_value2) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            cat_id,
            rule.keyword,
            rule.priority,
            rule.condition_field.map(|f| f.as_str()),
            rule.condition_op.map(|o| o.as_str()),
            rule.condition_value,
            rule.condition_value2,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn delete_rule(conn: &Connection, id: i64) -> Result<()> {
    let deleted = conn.execute("DELETE FROM category_rules WHERE id = ?1", [id])?;
    if deleted == 0 {
        return Err(PassbookError::Other(format!("No rule with ID {id}")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{get_connection, init_db};
    use crate::error::ErrorKind;

    fn test_db() -> (tempfile::TempDir, Connection) {
        let dir = tempfile::tempdir().unwrap();
        let conn = get_connection(&dir.path().join("test.db")).unwrap();
        init_db(&conn).unwrap();
        (dir, conn)
    }

    #[test]
    fn test_add_condition_rule_round_trips() {
        let (_dir, conn) = test_db();
        let rule = CategoryRule {
            category: "Rent".into(),
            priority: 7,
            condition_field: Some(ConditionField::Withdrawal),
            condition_op: Some(ConditionOp::Between),
            condition_value: Some(15000.0),
            condition_value2: Some(25000.0),
            ..Default::default()
        };
        let id = add_rule(&conn, &rule).unwrap();
        let stored = conn.rules().unwrap().into_iter().find(|r| r.id == id).unwrap();
        assert_eq!(stored.category, "Rent");
        assert_eq!(stored.condition_op, Some(ConditionOp::Between));
        assert_eq!(stored.condition_value2, Some(25000.0));
        assert!(stored.keyword.is_none());
    }

    #[test]
    fn test_add_rule_rejects_unknown_category_and_inert_rules() {
        let (_dir, conn) = test_db();
        let unknown = CategoryRule {
            category: "Nope".into(),
            keyword: Some("x".into()),
            ..Default::default()
        };
        assert_eq!(add_rule(&conn, &unknown).unwrap_err().kind(), ErrorKind::UnknownCategory);
        let inert = CategoryRule { category: "Rent".into(), ..Default::default() };
        assert_eq!(add_rule(&conn, &inert).unwrap_err().kind(), ErrorKind::InvalidRule);
    }

    #[test]
    fn test_delete_rule() {
        let (_dir, conn) = test_db();
        let before = conn.rules().unwrap().len();
        let id = conn.rules().unwrap()[0].id;
        delete_rule(&conn, id).unwrap();
        assert_eq!(conn.rules().unwrap().len(), before - 1);
        assert!(delete_rule(&conn, id).is_err());
    }
}
