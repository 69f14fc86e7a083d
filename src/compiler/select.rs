use crate::executor::Statement;
use crate::filter::{Filters, Operand};
use crate::types::{OrmError, Result, Table, Value};
use super::materialize::{Projection, ResultShape};

/// A read statement plus the plan for turning its rows into records.
/// COUNT statements carry no projection.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledSelect {
    pub statement: Statement,
    pub projection: Option<Projection>,
}

/// Compiles a filtered SELECT, or a COUNT when `filters.count` is set.
///
/// `max_limit` is the safety ceiling; a caller limit can only lower it.
pub fn compile_select(
    table: &Table,
    filters: &Filters,
    shape: ResultShape,
    max_limit: i64,
) -> Result<CompiledSelect> {
    if filters.fields.is_empty() {
        return Err(OrmError::NoValues);
    }

    let (clauses, args) = predicates(table, filters)?;
    if clauses.is_empty() && filters.limit == 0 {
        return Err(OrmError::NoSearchValues);
    }
    let where_clause = if clauses.is_empty() {
        String::new()
    } else {
        format!(" WHERE {}", clauses.join(" AND "))
    };

    if filters.count {
        return Ok(CompiledSelect {
            statement: Statement::new(
                format!("SELECT COUNT(*) FROM {}{where_clause}", table.name),
                args,
            ),
            projection: None,
        });
    }

    let projection = Projection::of(table);
    let mut sql = format!(
        "SELECT {} FROM {}{where_clause}",
        projection.select_list(),
        table.name
    );
    if let Some(order) = order_clause(table, filters, shape)? {
        sql.push_str(" ORDER BY ");
        sql.push_str(&order);
    }
    let limit = if filters.limit > 0 {
        filters.limit.min(max_limit)
    } else {
        max_limit
    };
    sql.push_str(&format!(" LIMIT {limit}"));
    if filters.offset > 0 {
        sql.push_str(&format!(" OFFSET {}", filters.offset));
    }

    Ok(CompiledSelect {
        statement: Statement::new(sql, args),
        projection: Some(projection),
    })
}

/// Every row, capped at `max_limit`.
#[must_use]
pub fn compile_select_all(table: &Table, max_limit: i64) -> CompiledSelect {
    let projection = Projection::of(table);
    let sql = format!(
        "SELECT {} FROM {} LIMIT {max_limit}",
        projection.select_list(),
        table.name
    );
    CompiledSelect {
        statement: Statement::new(sql, Vec::new()),
        projection: Some(projection),
    }
}

pub fn compile_select_by_id(table: &Table, id: i64) -> Result<CompiledSelect> {
    let identity = table.identity_column().ok_or(OrmError::NoRowId)?;
    if id == 0 {
        return Err(OrmError::NoRowId);
    }
    let projection = Projection::of(table);
    let sql = format!(
        "SELECT {} FROM {} WHERE {} = $1",
        projection.select_list(),
        table.name,
        identity.name
    );
    Ok(CompiledSelect {
        statement: Statement::new(sql, vec![Value::Integer(id)]),
        projection: Some(projection),
    })
}

fn predicates(table: &Table, filters: &Filters) -> Result<(Vec<String>, Vec<Value>)> {
    let targets = table
        .columns
        .iter()
        .map(|c| (&c.field, &c.name, &c.value))
        .chain(table.foreign_keys.iter().map(|fk| (&fk.field, &fk.column, &fk.value)));

    let mut clauses = Vec::new();
    let mut args = Vec::new();
    for (field, column, snapshot) in targets {
        let Some(term) = filters.term(field, column) else {
            continue;
        };
        let literal = if term.use_value {
            term.value.clone()
        } else {
            snapshot.clone()
        };
        let n = args.len() + 1;
        let clause = match term.operand {
            Operand::Equal => format!("{column} = ${n}"),
            Operand::Greater => format!("{column} > ${n}"),
            Operand::Less => format!("{column} < ${n}"),
            Operand::NotEqual => format!("{column} != ${n}"),
            Operand::Contains => format!("{column} LIKE '%' || ${n} || '%'"),
            Operand::In => {
                if literal.homogeneous_array().is_none() {
                    return Err(OrmError::WrongMembershipValue(field.clone()));
                }
                format!("{column} = ANY(${n})")
            }
        };
        clauses.push(clause);
        args.push(literal);
    }
    Ok((clauses, args))
}

fn order_clause(table: &Table, filters: &Filters, shape: ResultShape) -> Result<Option<String>> {
    if !filters.order.fields.is_empty() {
        let direction = if filters.order.desc { "DESC" } else { "ASC" };
        let terms = filters
            .order
            .fields
            .iter()
            .map(|field| resolve_column(table, field).map(|column| format!("{column} {direction}")))
            .collect::<Result<Vec<_>>>()?;
        return Ok(Some(terms.join(", ")));
    }

    // Map results are keyed by identity, so row order does not matter.
    if shape == ResultShape::Map {
        return Ok(None);
    }
    let implicit: Vec<&str> = table
        .order_key()
        .map(|fk| fk.column.as_str())
        .into_iter()
        .chain(table.position_column().map(|c| c.name.as_str()))
        .collect();
    Ok((!implicit.is_empty()).then(|| implicit.join(", ")))
}

/// SQL name for a logical field or column name.
pub(crate) fn resolve_column<'t>(table: &'t Table, name: &str) -> Result<&'t str> {
    table
        .column(name)
        .map(|c| c.name.as_str())
        .or_else(|| table.foreign_key(name).map(|fk| fk.column.as_str()))
        .ok_or_else(|| OrmError::UnknownField(name.to_string()))
}
