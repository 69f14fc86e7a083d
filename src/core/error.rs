use thiserror::Error;

pub type Result<T> = std::result::Result<T, OrmError>;

#[derive(Error, Debug)]
pub enum OrmError {
    // Record definition
    #[error("Invalid tag '{tag}': {reason}")]
    InvalidTag { tag: String, reason: String },
    #[error("No columns in table '{0}'")]
    NoColumns(String),
    #[error("Invalid table name '{0}'")]
    InvalidTableName(String),
    #[error("Field '{0}' not found")]
    UnknownField(String),
    #[error("Type mismatch for field '{field}': expected {expected}")]
    TypeMismatch { field: String, expected: &'static str },

    // Caller input
    #[error("no values")]
    NoValues,
    #[error("no search values")]
    NoSearchValues,
    #[error("wrong membership value for '{0}'")]
    WrongMembershipValue(String),
    #[error("Invalid operand '{0}'")]
    InvalidOperand(String),
    #[error("Invalid limit {0}, must be at least 1")]
    InvalidLimit(i64),
    #[error("Invalid offset {0}, must be at least 1")]
    InvalidOffset(i64),
    #[error("Order requires at least one field")]
    EmptyOrder,
    #[error("empty foreign key value for '{0}'")]
    EmptyForeignKey(String),
    #[error("no row id")]
    NoRowId,
    #[error("no fields to update")]
    NoFieldsToUpdate,
    #[error("no fields to delete")]
    NoFieldsToDelete,
    #[error("no new id returned")]
    NoIdentityReturned,

    // Position reordering
    #[error("no position or id column")]
    NoPositionOrId,
    #[error("no parent column name")]
    NoParentColumn,
    #[error("no parent column")]
    NoParent,
    #[error("row not found")]
    RowNotFound,
    #[error("Invalid position {0}")]
    InvalidPosition(i64),

    // Storage and environment
    #[error("Storage error: {0}")]
    Storage(#[source] Box<dyn std::error::Error + Send + Sync>),
    #[error("Config error: {0}")]
    Config(#[from] config::ConfigError),
}

impl OrmError {
    /// Wraps an executor failure without altering it.
    pub fn storage<E>(err: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        Self::Storage(err.into())
    }

    pub(crate) fn invalid_tag(tag: &str, reason: impl Into<String>) -> Self {
        Self::InvalidTag {
            tag: tag.to_string(),
            reason: reason.into(),
        }
    }
}
