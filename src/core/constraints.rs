use serde::{Deserialize, Serialize};
use super::value::Value;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ForeignKey {
    pub field: String,
    pub column: String,
    /// Identity of the referenced row, `Value::Null` when the reference is absent.
    pub value: Value,
    pub referenced_table: String,
    pub referenced_column: String,
    pub nullable: bool,
}

impl ForeignKey {
    /// Expression used to read the key back; nullable keys come back as 0.
    #[must_use]
    pub fn select_expr(&self) -> String {
        if self.nullable {
            format!("COALESCE({}, 0)", self.column)
        } else {
            self.column.clone()
        }
    }
}

/// Membership of one column in a uniqueness or index group.
/// An empty label means the column forms a constraint on its own.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GroupEntry {
    pub column: String,
    pub label: String,
}

/// Folds group entries into column lists, one per constraint.
///
/// Labels are visited in ascending order and columns keep their declaration
/// order inside a label. Unlabelled entries sort first and never merge.
#[must_use]
pub fn group_columns(entries: &[GroupEntry]) -> Vec<Vec<String>> {
    let mut sorted: Vec<&GroupEntry> = entries.iter().collect();
    sorted.sort_by(|a, b| a.label.cmp(&b.label));

    let mut groups: Vec<Vec<String>> = Vec::new();
    let mut current_label: Option<&str> = None;
    for entry in sorted {
        let joins_previous = !entry.label.is_empty() && current_label == Some(entry.label.as_str());
        match groups.last_mut() {
            Some(last) if joins_previous => last.push(entry.column.clone()),
            _ => groups.push(vec![entry.column.clone()]),
        }
        current_label = Some(entry.label.as_str());
    }
    groups
}
