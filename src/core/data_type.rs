use serde::{Deserialize, Serialize};

/// SQL column types a record field can map to.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum DataType {
    Boolean,
    Integer,
    BigInt,
    BigSerial,    // Auto-incrementing BIGINT, identity columns only
    Varchar,
    Float,
    Timestamp,
}

impl DataType {
    #[must_use]
    pub const fn as_sql(&self) -> &'static str {
        match self {
            Self::Boolean => "BOOLEAN",
            Self::Integer => "INTEGER",
            Self::BigInt => "BIGINT",
            Self::BigSerial => "BIGSERIAL",
            Self::Varchar => "VARCHAR",
            Self::Float => "FLOAT",
            Self::Timestamp => "TIMESTAMP",
        }
    }
}

impl std::fmt::Display for DataType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_sql())
    }
}
