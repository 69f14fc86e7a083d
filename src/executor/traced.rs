use crate::types::{Result, Row};
use super::{Executor, Statement};

/// Wraps an executor so every statement is logged, and every failure is
/// logged together with the statement and its arguments.
pub struct Traced<'a, E: ?Sized> {
    inner: &'a mut E,
    log_statements: bool,
}

impl<'a, E: Executor + ?Sized> Traced<'a, E> {
    pub fn new(inner: &'a mut E, log_statements: bool) -> Self {
        Self {
            inner,
            log_statements,
        }
    }

    fn run<T>(
        &mut self,
        statement: &Statement,
        op: impl FnOnce(&mut E, &Statement) -> Result<T>,
    ) -> Result<T> {
        if self.log_statements {
            tracing::debug!(sql = %statement.sql, args = ?statement.args, "executing statement");
        }
        op(self.inner, statement).inspect_err(|err| {
            tracing::error!(
                sql = %statement.sql,
                args = ?statement.args,
                error = %err,
                "statement failed"
            );
        })
    }
}

impl<E: Executor + ?Sized> Executor for Traced<'_, E> {
    fn execute(&mut self, statement: &Statement) -> Result<u64> {
        self.run(statement, |e, s| e.execute(s))
    }

    fn query_row(&mut self, statement: &Statement) -> Result<Option<Row>> {
        self.run(statement, |e, s| e.query_row(s))
    }

    fn query(&mut self, statement: &Statement) -> Result<Vec<Row>> {
        self.run(statement, |e, s| e.query(s))
    }
}
