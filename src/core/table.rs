use serde::{Deserialize, Serialize};
use super::column::Column;
use super::constraints::{group_columns, ForeignKey, GroupEntry};
use super::value::Value;

/// Normalized description of one record type's table.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Table {
    pub name: String,
    pub columns: Vec<Column>,
    pub foreign_keys: Vec<ForeignKey>,
    pub unique: Vec<GroupEntry>,
    pub indexes: Vec<GroupEntry>,
}

impl Table {
    #[must_use]
    pub fn new(name: String) -> Self {
        Self {
            name,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn get_column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    /// Looks a column up by logical field name first, then by SQL name.
    #[must_use]
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns
            .iter()
            .find(|c| c.field == name)
            .or_else(|| self.columns.iter().find(|c| c.name == name))
    }

    #[must_use]
    pub fn foreign_key(&self, name: &str) -> Option<&ForeignKey> {
        self.foreign_keys
            .iter()
            .find(|fk| fk.field == name)
            .or_else(|| self.foreign_keys.iter().find(|fk| fk.column == name))
    }

    #[must_use]
    pub fn identity_column(&self) -> Option<&Column> {
        self.columns.iter().find(|c| c.primary_key)
    }

    /// Identity value of the record the table was derived from, 0 when unset.
    #[must_use]
    pub fn identity(&self) -> i64 {
        self.identity_column()
            .and_then(|c| c.value.as_int())
            .unwrap_or(0)
    }

    #[must_use]
    pub fn position_column(&self) -> Option<&Column> {
        self.columns.iter().find(|c| c.position)
    }

    /// The first non-nullable foreign key; it defines the sibling group.
    #[must_use]
    pub fn parent_key(&self) -> Option<&ForeignKey> {
        self.foreign_keys.iter().find(|fk| !fk.nullable)
    }

    /// Column used for the implicit list ordering: the parent key, or the
    /// first foreign key when every reference is nullable.
    #[must_use]
    pub fn order_key(&self) -> Option<&ForeignKey> {
        self.parent_key().or_else(|| self.foreign_keys.first())
    }

    #[must_use]
    pub fn unique_constraints(&self) -> Vec<Vec<String>> {
        group_columns(&self.unique)
    }

    #[must_use]
    pub fn index_groups(&self) -> Vec<Vec<String>> {
        group_columns(&self.indexes)
    }

    /// Value snapshot of a field, covering both plain columns and references.
    #[must_use]
    pub fn field_value(&self, field: &str) -> Option<&Value> {
        self.columns
            .iter()
            .find(|c| c.field == field)
            .map(|c| &c.value)
            .or_else(|| {
                self.foreign_keys
                    .iter()
                    .find(|fk| fk.field == field)
                    .map(|fk| &fk.value)
            })
    }
}
