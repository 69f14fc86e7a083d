/// Filter specifications and the fluent builder that produces them.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;
use crate::types::{OrmError, Result, Value};

/// Comparison applied by one filter term.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Operand {
    #[default]
    #[serde(rename = "=")]
    Equal,
    #[serde(rename = ">")]
    Greater,
    #[serde(rename = "<")]
    Less,
    #[serde(rename = "!=")]
    NotEqual,
    #[serde(rename = "CONTAINS")]
    Contains,
    #[serde(rename = "IN")]
    In,
}

impl Operand {
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Equal => "=",
            Self::Greater => ">",
            Self::Less => "<",
            Self::NotEqual => "!=",
            Self::Contains => "CONTAINS",
            Self::In => "IN",
        }
    }
}

impl FromStr for Operand {
    type Err = OrmError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_uppercase().as_str() {
            "=" => Ok(Self::Equal),
            ">" => Ok(Self::Greater),
            "<" => Ok(Self::Less),
            "!=" | "<>" => Ok(Self::NotEqual),
            "CONTAINS" => Ok(Self::Contains),
            "IN" => Ok(Self::In),
            _ => Err(OrmError::InvalidOperand(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterTerm {
    /// Term takes part in the predicate.
    pub flag: bool,
    /// Compare against `value` instead of the record's current field value.
    pub use_value: bool,
    pub value: Value,
    pub operand: Operand,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Order {
    pub desc: bool,
    pub fields: Vec<String>,
}

/// Immutable filter specification consumed by the query compiler.
///
/// Terms are keyed by logical field name or SQL column name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Filters {
    pub fields: BTreeMap<String, FilterTerm>,
    pub order: Order,
    /// 0 means "no caller limit".
    pub limit: i64,
    /// 0 means "no offset".
    pub offset: i64,
    pub count: bool,
}

impl Filters {
    #[must_use]
    pub fn builder() -> FilterBuilder {
        FilterBuilder::new()
    }

    /// The active term for a field, looked up by field name then column name.
    #[must_use]
    pub fn term(&self, field: &str, column: &str) -> Option<&FilterTerm> {
        self.fields
            .get(field)
            .filter(|t| t.flag)
            .or_else(|| self.fields.get(column).filter(|t| t.flag))
    }
}

/// Fluent accumulator for [`Filters`].
///
/// The first failure is kept and every later call becomes a no-op, so a
/// chain only needs checking once at [`build`](Self::build).
#[derive(Debug, Default)]
pub struct FilterBuilder {
    filters: Filters,
    error: Option<OrmError>,
}

impl FilterBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn equals(self, field: &str, value: Option<Value>) -> Self {
        self.term(field, Ok(Operand::Equal), value)
    }

    #[must_use]
    pub fn greater(self, field: &str, value: Option<Value>) -> Self {
        self.term(field, Ok(Operand::Greater), value)
    }

    #[must_use]
    pub fn less(self, field: &str, value: Option<Value>) -> Self {
        self.term(field, Ok(Operand::Less), value)
    }

    #[must_use]
    pub fn not_equal(self, field: &str, value: Option<Value>) -> Self {
        self.term(field, Ok(Operand::NotEqual), value)
    }

    #[must_use]
    pub fn contains(self, field: &str, value: Option<Value>) -> Self {
        self.term(field, Ok(Operand::Contains), value)
    }

    #[must_use]
    pub fn member_of(self, field: &str, value: Option<Value>) -> Self {
        self.term(field, Ok(Operand::In), value)
    }

    /// Adds a term from a textual operand code (`=`, `>`, `<`, `!=`, `CONTAINS`, `IN`).
    #[must_use]
    pub fn operand(self, field: &str, code: &str, value: Option<Value>) -> Self {
        self.term(field, code.parse(), value)
    }

    #[must_use]
    pub fn set_limit(mut self, limit: i64) -> Self {
        if self.error.is_none() {
            if limit < 1 {
                self.error = Some(OrmError::InvalidLimit(limit));
            } else {
                self.filters.limit = limit;
            }
        }
        self
    }

    #[must_use]
    pub fn set_offset(mut self, offset: i64) -> Self {
        if self.error.is_none() {
            if offset < 1 {
                self.error = Some(OrmError::InvalidOffset(offset));
            } else {
                self.filters.offset = offset;
            }
        }
        self
    }

    #[must_use]
    pub fn set_order(mut self, fields: &[&str], desc: bool) -> Self {
        if self.error.is_none() {
            if fields.is_empty() {
                self.error = Some(OrmError::EmptyOrder);
            } else {
                self.filters.order = Order {
                    desc,
                    fields: fields.iter().map(ToString::to_string).collect(),
                };
            }
        }
        self
    }

    #[must_use]
    pub fn count_only(mut self) -> Self {
        if self.error.is_none() {
            self.filters.count = true;
        }
        self
    }

    #[must_use]
    pub const fn error(&self) -> Option<&OrmError> {
        self.error.as_ref()
    }

    pub fn build(self) -> Result<Filters> {
        match self.error {
            Some(err) => Err(err),
            None => Ok(self.filters),
        }
    }

    fn term(mut self, field: &str, operand: Result<Operand>, value: Option<Value>) -> Self {
        if self.error.is_some() {
            return self;
        }
        match operand {
            Ok(operand) => {
                self.filters.fields.insert(
                    field.to_string(),
                    FilterTerm {
                        flag: true,
                        use_value: value.is_some(),
                        value: value.unwrap_or(Value::Null),
                        operand,
                    },
                );
            }
            Err(err) => self.error = Some(err),
        }
        self
    }
}
