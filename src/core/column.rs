use serde::{Deserialize, Serialize};
use super::data_type::DataType;
use super::value::Value;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Column {
    /// Logical field name on the record.
    pub field: String,
    /// SQL column name taken from the tag.
    pub name: String,
    /// Snapshot of the field value at derivation time.
    pub value: Value,
    pub data_type: DataType,
    pub nullable: bool,
    pub primary_key: bool,
    pub default: Option<String>,
    pub check: Option<String>,
    pub position: bool,
}

impl Column {
    /// Constraint suffix rendered after the type in DDL.
    #[must_use]
    pub fn attr(&self) -> String {
        let mut attr = String::new();
        if !self.nullable {
            attr.push_str(" NOT NULL");
        }
        if self.primary_key {
            attr.push_str(" PRIMARY KEY");
        }
        attr
    }
}
