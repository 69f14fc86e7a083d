use crate::executor::Statement;
use crate::types::{OrmError, Result, Table, Value};
use super::select::resolve_column;
use super::{assignments, conjunction};

/// What an update has to do: move the row within its group first, then
/// (optionally) write the remaining columns.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdatePlan {
    pub reorder: bool,
    pub statement: Option<Statement>,
}

/// Bound value for a foreign key, or an error when a required reference is
/// missing. Absent nullable references are written as NULL.
fn foreign_key_value(table: &Table, idx: usize) -> Result<Value> {
    let fk = &table.foreign_keys[idx];
    if !fk.value.is_empty_key() {
        return Ok(fk.value.clone());
    }
    if fk.nullable {
        Ok(Value::Null)
    } else {
        Err(OrmError::EmptyForeignKey(fk.field.clone()))
    }
}

/// INSERT returning the generated identity.
///
/// Foreign keys come first, then plain columns without the identity. The
/// position column is filled by a subquery that appends the row to the end
/// of its parent group.
pub fn compile_insert(table: &Table) -> Result<Statement> {
    let mut names = Vec::new();
    let mut values = Vec::new();
    let mut args = Vec::new();

    for (idx, fk) in table.foreign_keys.iter().enumerate() {
        args.push(foreign_key_value(table, idx)?);
        names.push(fk.column.clone());
        values.push(format!("${}", args.len()));
    }

    let parent = table.parent_key();
    for column in &table.columns {
        if column.primary_key {
            continue;
        }
        names.push(column.name.clone());
        if column.position {
            let scope = match parent {
                Some(fk) => {
                    args.push(fk.value.clone());
                    format!(" WHERE {} = ${}", fk.column, args.len())
                }
                None => String::new(),
            };
            values.push(format!(
                "(SELECT COALESCE(MAX({}), 0) + 1 FROM {}{scope})",
                column.name, table.name
            ));
        } else {
            args.push(column.value.clone());
            values.push(format!("${}", args.len()));
        }
    }

    let returning = table
        .identity_column()
        .map(|c| format!(" RETURNING {}", c.name))
        .unwrap_or_default();
    let sql = if names.is_empty() {
        format!("INSERT INTO {} DEFAULT VALUES{returning}", table.name)
    } else {
        format!(
            "INSERT INTO {} ({}) VALUES ({}){returning}",
            table.name,
            names.join(", "),
            values.join(", ")
        )
    };
    Ok(Statement::new(sql, args))
}

/// UPDATE by identity.
///
/// `only` restricts the write to the named fields (logical or SQL names).
/// The position column is never written here: selecting it sets
/// [`UpdatePlan::reorder`]. A full update only reorders when the record
/// carries a position.
pub fn compile_update(table: &Table, only: Option<&[&str]>) -> Result<UpdatePlan> {
    let identity = table.identity_column().ok_or(OrmError::NoRowId)?;
    let id = table.identity();
    if id == 0 {
        return Err(OrmError::NoRowId);
    }

    let selected: Option<Vec<&str>> = match only {
        Some([]) => return Err(OrmError::NoFieldsToUpdate),
        Some(names) => Some(
            names
                .iter()
                .map(|name| resolve_column(table, name))
                .collect::<Result<_>>()?,
        ),
        None => None,
    };
    let wants = |column: &str| selected.as_ref().is_none_or(|s| s.contains(&column));

    let mut names = Vec::new();
    let mut args = Vec::new();
    for (idx, fk) in table.foreign_keys.iter().enumerate() {
        if wants(fk.column.as_str()) {
            args.push(foreign_key_value(table, idx)?);
            names.push(fk.column.clone());
        }
    }

    let mut reorder = false;
    for column in &table.columns {
        if column.primary_key || !wants(column.name.as_str()) {
            continue;
        }
        if column.position {
            reorder = selected.is_some() || !column.value.is_empty_key();
            continue;
        }
        args.push(column.value.clone());
        names.push(column.name.clone());
    }

    if names.is_empty() && !reorder {
        return Err(OrmError::NoFieldsToUpdate);
    }

    let statement = (!names.is_empty()).then(|| {
        args.push(Value::Integer(id));
        Statement::new(
            format!(
                "UPDATE {} SET {} WHERE {} = ${}",
                table.name,
                assignments(&names),
                identity.name,
                args.len()
            ),
            args,
        )
    });
    Ok(UpdatePlan { reorder, statement })
}

pub fn compile_delete_by_id(table: &Table, id: i64) -> Result<Statement> {
    let identity = table.identity_column().ok_or(OrmError::NoRowId)?;
    if id == 0 {
        return Err(OrmError::NoRowId);
    }
    Ok(Statement::new(
        format!("DELETE FROM {} WHERE {} = $1", table.name, identity.name),
        vec![Value::Integer(id)],
    ))
}

/// DELETE matching the record's current values on every named field.
pub fn compile_delete_where(table: &Table, fields: &[&str]) -> Result<Statement> {
    if fields.is_empty() {
        return Err(OrmError::NoFieldsToDelete);
    }
    let mut names = Vec::with_capacity(fields.len());
    let mut args = Vec::with_capacity(fields.len());
    for field in fields {
        let column = resolve_column(table, field)?;
        let value = table
            .column(column)
            .map(|c| c.value.clone())
            .or_else(|| table.foreign_key(column).map(|fk| fk.value.clone()))
            .unwrap_or(Value::Null);
        names.push(column.to_string());
        args.push(value);
    }
    Ok(Statement::new(
        format!("DELETE FROM {} WHERE {}", table.name, conjunction(&names)),
        args,
    ))
}
