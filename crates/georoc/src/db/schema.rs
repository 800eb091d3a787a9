//! Column discovery and table definitions.

use std::collections::HashSet;

use rusqlite::Connection;

use crate::error::Result;
use crate::record::FieldType;

/// A data column of the `sample` table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub name: String,
    pub field_type: FieldType,
}

impl Column {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        let field_type = FieldType::of(&name);
        Self { name, field_type }
    }

    /// Ordering key: plain names first, then names with digits, then
    /// parenthesized units; alphabetical within each group.
    fn sort_key(&self) -> (bool, bool, &str) {
        (
            self.name.contains('('),
            self.name.chars().any(|c| c.is_ascii_digit()),
            &self.name,
        )
    }
}

/// Build the sorted union of `names`, typing each column.
pub fn discover<I, S>(names: I) -> Vec<Column>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen = HashSet::new();
    let mut columns: Vec<Column> = names
        .into_iter()
        .filter(|name| !name.as_ref().is_empty() && seen.insert(name.as_ref().to_string()))
        .map(|name| Column::new(name.as_ref()))
        .collect();
    columns.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));
    columns
}

/// Quote an SQL identifier.
pub fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// `CREATE TABLE` statement for the `sample` table.
pub fn sample_table_sql(columns: &[Column]) -> String {
    let mut lines = vec![
        "    id TEXT PRIMARY KEY".to_string(),
        "    file_id TEXT NOT NULL".to_string(),
        "    name TEXT".to_string(),
    ];
    lines.extend(
        columns
            .iter()
            .map(|c| format!("    {} {}", quote_identifier(&c.name), c.field_type.sql_type())),
    );
    lines.push("    FOREIGN KEY (file_id) REFERENCES file(id)".to_string());
    format!("CREATE TABLE sample (\n{}\n);", lines.join(",\n"))
}

/// Create the four tables.
pub fn create_tables(conn: &Connection, columns: &[Column]) -> Result<()> {
    conn.execute_batch(
        "CREATE TABLE file (id TEXT PRIMARY KEY, date TEXT NOT NULL, section TEXT NOT NULL);
         CREATE TABLE reference (id INTEGER PRIMARY KEY, reference TEXT NOT NULL);",
    )?;
    conn.execute_batch(&sample_table_sql(columns))?;
    conn.execute_batch(
        "CREATE TABLE citation (
             sample_id TEXT NOT NULL,
             reference_id INTEGER NOT NULL,
             fields TEXT NOT NULL,
             FOREIGN KEY (sample_id) REFERENCES sample(id),
             FOREIGN KEY (reference_id) REFERENCES reference(id)
         );",
    )?;
    Ok(())
}

/// `INSERT` statement for a sample row: id, file, name, then `columns`.
pub fn insert_sample_sql(columns: &[Column]) -> String {
    let names: Vec<String> = ["id", "file_id", "name"]
        .iter()
        .map(|s| s.to_string())
        .chain(columns.iter().map(|c| quote_identifier(&c.name)))
        .collect();
    let placeholders = vec!["?"; names.len()];
    format!(
        "INSERT INTO sample ({}) VALUES ({})",
        names.join(", "),
        placeholders.join(", ")
    )
}
