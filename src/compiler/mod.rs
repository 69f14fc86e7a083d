/// Query compiler: table description + filter specification -> statement.
///
/// Structure:
/// - select: filtered, by-identity and unfiltered reads, COUNT
/// - dml: INSERT / UPDATE / DELETE
/// - materialize: turning result rows back into records

pub mod select;
pub mod dml;
pub mod materialize;

#[cfg(test)]
pub(crate) mod fixtures;

pub use select::{compile_select, compile_select_all, compile_select_by_id, CompiledSelect};
pub use dml::{compile_delete_by_id, compile_delete_where, compile_insert, compile_update, UpdatePlan};
pub use materialize::{materialize, Projection, QueryOutput, ResultShape};

/// `$start, $start+1, ...` for `count` placeholders.
#[must_use]
pub fn placeholders(count: usize, start: usize) -> String {
    (start..start + count)
        .map(|i| format!("${i}"))
        .collect::<Vec<_>>()
        .join(", ")
}

/// `a = $1, b = $2` as used in SET lists.
#[must_use]
pub fn assignments(names: &[String]) -> String {
    equal_placeholders(names, ", ")
}

/// `a = $1 AND b = $2` as used in WHERE clauses.
#[must_use]
pub fn conjunction(names: &[String]) -> String {
    equal_placeholders(names, " AND ")
}

fn equal_placeholders(names: &[String], separator: &str) -> String {
    names
        .iter()
        .enumerate()
        .map(|(i, name)| format!("{name} = ${}", i + 1))
        .collect::<Vec<_>>()
        .join(separator)
}
