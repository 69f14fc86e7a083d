/// DDL rendering: `CREATE TABLE IF NOT EXISTS` plus one
/// `CREATE INDEX IF NOT EXISTS` per index group.

use crate::executor::Statement;
use crate::types::{Column, ForeignKey, Table};

fn foreign_key_clause(fk: &ForeignKey) -> String {
    let (null, on_delete) = if fk.nullable {
        ("", "SET NULL")
    } else {
        (" NOT NULL", "CASCADE")
    };
    format!(
        "{} BIGINT{null} REFERENCES {} ({}) ON DELETE {on_delete}",
        fk.column, fk.referenced_table, fk.referenced_column
    )
}

fn column_clause(column: &Column) -> String {
    let mut clause = format!("{} {}{}", column.name, column.data_type, column.attr());
    if let Some(default) = &column.default {
        clause.push_str(" DEFAULT ");
        clause.push_str(default);
    }
    if let Some(check) = &column.check {
        clause.push_str(" CHECK (");
        clause.push_str(check);
        clause.push(')');
    }
    clause
}

/// Foreign keys first, then columns, then one UNIQUE clause per group.
#[must_use]
pub fn create_table_sql(table: &Table) -> String {
    let clauses: Vec<String> = table
        .foreign_keys
        .iter()
        .map(foreign_key_clause)
        .chain(table.columns.iter().map(column_clause))
        .chain(
            table
                .unique_constraints()
                .into_iter()
                .map(|group| format!("UNIQUE ({})", group.join(", "))),
        )
        .collect();
    format!(
        "CREATE TABLE IF NOT EXISTS {} (\n    {}\n)",
        table.name,
        clauses.join(",\n    ")
    )
}

#[must_use]
pub fn create_index_sql(table: &Table) -> Vec<String> {
    table
        .index_groups()
        .into_iter()
        .map(|group| {
            format!(
                "CREATE INDEX IF NOT EXISTS {}_{}_idx ON {} ({})",
                table.name,
                group.join("_"),
                table.name,
                group.join(", ")
            )
        })
        .collect()
}

/// Statements to run, in order, to create `table` and its indexes.
#[must_use]
pub fn create_statements(table: &Table) -> Vec<Statement> {
    std::iter::once(create_table_sql(table))
        .chain(create_index_sql(table))
        .map(|sql| Statement::new(sql, Vec::new()))
        .collect()
}
