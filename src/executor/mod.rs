/// Executor boundary - the only collaborator contract of the crate.
///
/// Connection acquisition, pooling and retries live behind these traits.
/// Implementations report their own failures through `OrmError::storage`.

mod traced;

pub use traced::Traced;

use crate::types::{Result, Row, Value};

/// SQL text with `$n` placeholders and the arguments bound to them, in order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Statement {
    pub sql: String,
    pub args: Vec<Value>,
}

impl Statement {
    pub fn new(sql: impl Into<String>, args: Vec<Value>) -> Self {
        Self {
            sql: sql.into(),
            args,
        }
    }
}

impl std::fmt::Display for Statement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.sql)
    }
}

pub trait Executor {
    /// Runs a statement and returns the number of affected rows.
    fn execute(&mut self, statement: &Statement) -> Result<u64>;

    /// Runs a statement and returns its first row, if any.
    fn query_row(&mut self, statement: &Statement) -> Result<Option<Row>>;

    /// Runs a statement and returns all rows in engine order.
    fn query(&mut self, statement: &Statement) -> Result<Vec<Row>>;
}

/// An open transaction. Dropping it without `commit` must not commit.
pub trait Transaction: Executor {
    fn commit(self) -> Result<()>;

    fn rollback(self) -> Result<()>;
}

pub trait Connection: Executor {
    type Tx<'a>: Transaction
    where
        Self: 'a;

    fn begin(&mut self) -> Result<Self::Tx<'_>>;
}

impl<E: Executor + ?Sized> Executor for &mut E {
    fn execute(&mut self, statement: &Statement) -> Result<u64> {
        (**self).execute(statement)
    }

    fn query_row(&mut self, statement: &Statement) -> Result<Option<Row>> {
        (**self).query_row(statement)
    }

    fn query(&mut self, statement: &Statement) -> Result<Vec<Row>> {
        (**self).query(statement)
    }
}
