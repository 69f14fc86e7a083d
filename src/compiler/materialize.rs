use std::collections::BTreeMap;
use crate::types::{Record, Result, Row, Table};

/// How read results are handed back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResultShape {
    /// Rows in statement order.
    #[default]
    List,
    /// Rows keyed by identity; row order is irrelevant.
    Map,
}

#[derive(Debug, Clone, PartialEq)]
pub enum QueryOutput<R> {
    List(Vec<R>),
    Map(BTreeMap<i64, R>),
    Count(i64),
}

impl<R> QueryOutput<R> {
    /// Records in list order (map results in key order); empty for counts.
    #[must_use]
    pub fn into_list(self) -> Vec<R> {
        match self {
            Self::List(rows) => rows,
            Self::Map(map) => map.into_values().collect(),
            Self::Count(_) => Vec::new(),
        }
    }

    #[must_use]
    pub fn into_map(self) -> BTreeMap<i64, R> {
        match self {
            Self::Map(map) => map,
            _ => BTreeMap::new(),
        }
    }

    #[must_use]
    pub const fn count(&self) -> Option<i64> {
        match self {
            Self::Count(n) => Some(*n),
            _ => None,
        }
    }
}

/// Output columns of a read and the record field each one fills.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Projection {
    pub exprs: Vec<String>,
    pub fields: Vec<String>,
    /// Output index of the identity column.
    pub identity: Option<usize>,
}

impl Projection {
    /// Plain columns in declaration order, then foreign keys.
    #[must_use]
    pub fn of(table: &Table) -> Self {
        let mut projection = Self::default();
        for column in &table.columns {
            if column.primary_key {
                projection.identity = Some(projection.exprs.len());
            }
            projection.exprs.push(column.name.clone());
            projection.fields.push(column.field.clone());
        }
        for fk in &table.foreign_keys {
            projection.exprs.push(fk.select_expr());
            projection.fields.push(fk.field.clone());
        }
        projection
    }

    #[must_use]
    pub fn select_list(&self) -> String {
        self.exprs.join(", ")
    }
}

/// Builds a fresh record from one row. Reference fields receive an
/// identity-only stub.
pub fn build_record<R: Record>(projection: &Projection, row: Row) -> Result<R> {
    let mut record = R::default();
    for (field, value) in projection.fields.iter().zip(row.values) {
        record.set_value(field, value)?;
    }
    Ok(record)
}

pub fn materialize<R: Record>(
    projection: &Projection,
    rows: Vec<Row>,
    shape: ResultShape,
) -> Result<QueryOutput<R>> {
    match shape {
        ResultShape::List => rows
            .into_iter()
            .map(|row| build_record(projection, row))
            .collect::<Result<Vec<R>>>()
            .map(QueryOutput::List),
        ResultShape::Map => {
            let mut map = BTreeMap::new();
            for row in rows {
                let key = projection.identity.map_or(0, |idx| row.int_or_zero(idx));
                let record = build_record(projection, row)?;
                // A zero identity can only come from a degenerate row.
                if key != 0 {
                    map.insert(key, record);
                }
            }
            Ok(QueryOutput::Map(map))
        }
    }
}
