use comfy_table::{Cell, Table};
use rusqlite::{params, Connection};

use crate::categorizer::UNCATEGORIZED;
use crate::cli::open_db;
use crate::db::category_id;
use crate::error::{PassbookError, Result};
use crate::models::Category;

const GROUPS: &[&str] = &["income", "expense", "transfer"];

pub fn add(name: &str, group: &str, color: &str, icon: &str) -> Result<()> {
    let conn = open_db()?;
    add_category(&conn, name, group, color, icon)?;
    println!("Added category: {name}");
    Ok(())
}

pub fn list() -> Result<()> {
    let conn = open_db()?;
    let categories = list_categories(&conn)?;

    let mut table = Table::new();
    table.set_header(vec!["ID", "Name", "Group", "Color", "Icon"]);
    for cat in categories {
        table.add_row(vec![
            Cell::new(cat.id),
            Cell::new(cat.name),
            Cell::new(cat.group),
            Cell::new(cat.color),
            Cell::new(cat.icon),
        ]);
    }
    println!("Categories\n{table}");
    Ok(())
}

pub fn delete(name: &str) -> Result<()> {
    let conn = open_db()?;
    let removed_rules = delete_category(&conn, name)?;
    println!("Deleted category {name} ({removed_rules} rules removed)");
    Ok(())
}

// ---------------------------------------------------------------------------
// Data-layer functions
// ---------------------------------------------------------------------------

pub fn list_categories(conn: &Connection) -> Result<Vec<Category>> {
    let mut stmt = conn.prepare(
        "SELECT id, name, color, icon, category_group FROM categories \
         ORDER BY CASE category_group WHEN 'income' THEN 0 WHEN 'expense' THEN 1 ELSE 2 END, name ASC",
    )?;
    let categories = stmt
        .query_map([], |row| {
            Ok(Category {
                id: row.get(0)?,
                name: row.get(1)?,
                color: row.get(2)?,
                icon: row.get(3)?,
                group: row.get(4)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(categories)
}

pub fn add_category(conn: &Connection, name: &str, group: &str, color: &str, icon: &str) -> Result<i64> {
    let name = name.trim();
    if name.is_empty() {
        return Err(PassbookError::Other("Name is required".into()));
    }
    if !GROUPS.contains(&group) {
        return Err(PassbookError::Other(format!(
            "Invalid category group: {group} (must be one of {})",
            GROUPS.join(", ")
        )));
    }
    if category_id(conn, name)?.is_some() {
        return Err(PassbookError::Other(format!("Category already exists: {name}")));
    }
    conn.execute(
        "INSERT INTO categories (name, color, icon, category_group) VALUES (?1, ?2, ?3, ?4)",
        params![name, color, icon, group],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Delete a category; its rules go with it. Returns how many rules were removed.
pub fn delete_category(conn: &Connection, name: &str) -> Result<usize> {
    if name == UNCATEGORIZED {
        return Err(PassbookError::Other(format!("{UNCATEGORIZED} cannot be deleted")));
    }
    let id = category_id(conn, name)?.ok_or_else(|| PassbookError::UnknownCategory(name.to_string()))?;
    let rules: i64 = conn.query_row(
        "SELECT count(*) FROM category_rules WHERE category_id = ?1",
        [id],
        |r| r.get(0),
    )?;
    conn.execute("DELETE FROM categories WHERE id = ?1", [id])?;
    Ok(rules as usize)
}
