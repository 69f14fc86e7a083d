use serde::{Deserialize, Serialize};
use super::value::Value;

/// One result row as returned by an executor, columns in projection order.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Row {
    pub values: Vec<Value>,
}

impl Row {
    pub fn new(values: Vec<Value>) -> Self {
        Self { values }
    }

    #[must_use]
    pub fn get(&self, idx: usize) -> Option<&Value> {
        self.values.get(idx)
    }

    /// Reads column `idx` as an integer, treating NULL and missing columns as 0.
    #[must_use]
    pub fn int_or_zero(&self, idx: usize) -> i64 {
        self.get(idx).and_then(Value::as_int).unwrap_or(0)
    }
}
