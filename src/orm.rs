//! Record-level operations over a [`Connection`].
//!
//! Every call derives a fresh [`Table`] from the record it is given, compiles
//! one statement and runs it. Only position moves open a transaction.

use std::collections::BTreeMap;
use crate::compiler::materialize::build_record;
use crate::compiler::{
    compile_delete_by_id, compile_delete_where, compile_insert, compile_select,
    compile_select_all, compile_select_by_id, compile_update, materialize, Projection,
    QueryOutput, ResultShape,
};
use crate::ddl::create_statements;
use crate::executor::{Connection, Executor, Statement, Traced};
use crate::filter::Filters;
use crate::reorder::move_position;
use crate::schema::build_table;
use crate::types::{OrmConfig, OrmError, Record, Result, Table};

pub struct Orm<C> {
    conn: C,
    config: OrmConfig,
}

impl<C: Connection> Orm<C> {
    pub fn new(conn: C) -> Self {
        Self::with_config(conn, OrmConfig::default())
    }

    pub fn with_config(conn: C, config: OrmConfig) -> Self {
        tracing::debug!(
            max_limit = config.max_limit,
            log_statements = config.log_statements,
            "orm initialized"
        );
        Self { conn, config }
    }

    pub const fn config(&self) -> &OrmConfig {
        &self.config
    }

    /// The underlying connection, for statements this crate does not build.
    pub fn connection(&mut self) -> &mut C {
        &mut self.conn
    }

    pub fn into_inner(self) -> C {
        self.conn
    }

    fn traced(&mut self) -> Traced<'_, C> {
        Traced::new(&mut self.conn, self.config.log_statements)
    }

    pub fn get_table<R: Record>(&self, record: &R) -> Result<Table> {
        build_table(record)
    }

    /// Creates the record's table and indexes unless they already exist.
    pub fn create_table<R: Record>(&mut self, record: &R) -> Result<()> {
        let table = build_table(record)?;
        let statements = create_statements(&table);
        let mut exec = self.traced();
        for statement in &statements {
            exec.execute(statement)?;
        }
        tracing::info!(table = %table.name, indexes = statements.len() - 1, "table ensured");
        Ok(())
    }

    /// Inserts the record and returns its new identity. The position column,
    /// if any, is set to the end of the record's parent group.
    pub fn insert_row<R: Record>(&mut self, record: &R) -> Result<i64> {
        let table = build_table(record)?;
        let statement = compile_insert(&table)?;
        let id = self
            .traced()
            .query_row(&statement)?
            .map_or(0, |row| row.int_or_zero(0));
        if id == 0 {
            return Err(OrmError::NoIdentityReturned);
        }
        tracing::debug!(table = %table.name, id, "row inserted");
        Ok(id)
    }

    /// Writes the record back by identity.
    ///
    /// `only` limits the write to the named fields. Selecting the position
    /// field moves the row within its group before anything else is written.
    /// A move only renumbers the group named by the record's parent key. Do
    /// not change the parent and the position in one call; the stored position
    /// still belongs to the old group.
    pub fn update_row<R: Record>(&mut self, record: &R, only: Option<&[&str]>) -> Result<()> {
        let table = build_table(record)?;
        let plan = compile_update(&table, only)?;
        if plan.reorder {
            move_position(&mut self.conn, &table, self.config.log_statements)?;
        }
        if let Some(statement) = plan.statement {
            self.traced().execute(&statement)?;
        }
        Ok(())
    }

    /// Deletes the row matching the record's identity.
    pub fn delete_row<R: Record>(&mut self, record: &R) -> Result<u64> {
        let table = build_table(record)?;
        let statement = compile_delete_by_id(&table, table.identity())?;
        self.traced().execute(&statement)
    }

    pub fn delete_row_by_id<R: Record>(&mut self, record: &R, id: i64) -> Result<u64> {
        let table = build_table(record)?;
        let statement = compile_delete_by_id(&table, id)?;
        self.traced().execute(&statement)
    }

    /// Deletes every row equal to the record on all of `fields`.
    pub fn delete_rows<R: Record>(&mut self, record: &R, fields: &[&str]) -> Result<u64> {
        let table = build_table(record)?;
        let statement = compile_delete_where(&table, fields)?;
        self.traced().execute(&statement)
    }

    /// Loads one row. An `id` of 0 uses the record's own identity.
    pub fn get_by_id<R: Record>(&mut self, record: &R, id: i64) -> Result<Option<R>> {
        let table = build_table(record)?;
        let id = if id == 0 { table.identity() } else { id };
        let compiled = compile_select_by_id(&table, id)?;
        let Some(projection) = compiled.projection else {
            return Ok(None);
        };
        self.traced()
            .query_row(&compiled.statement)?
            .map(|row| build_record(&projection, row))
            .transpose()
    }

    pub fn get_all<R: Record>(&mut self, record: &R, shape: ResultShape) -> Result<QueryOutput<R>> {
        let table = build_table(record)?;
        let compiled = compile_select_all(&table, self.config.max_limit);
        self.run_select(compiled.statement, compiled.projection, shape)
    }

    pub fn get_by_filter<R: Record>(
        &mut self,
        record: &R,
        filters: &Filters,
        shape: ResultShape,
    ) -> Result<QueryOutput<R>> {
        let table = build_table(record)?;
        let compiled = compile_select(&table, filters, shape, self.config.max_limit)?;
        self.run_select(compiled.statement, compiled.projection, shape)
    }

    pub fn find<R: Record>(&mut self, record: &R, filters: &Filters) -> Result<Vec<R>> {
        self.get_by_filter(record, filters, ResultShape::List)
            .map(QueryOutput::into_list)
    }

    pub fn find_map<R: Record>(&mut self, record: &R, filters: &Filters) -> Result<BTreeMap<i64, R>> {
        self.get_by_filter(record, filters, ResultShape::Map)
            .map(QueryOutput::into_map)
    }

    pub fn count<R: Record>(&mut self, record: &R, filters: &Filters) -> Result<i64> {
        let filters = Filters {
            count: true,
            ..filters.clone()
        };
        let output = self.get_by_filter(record, &filters, ResultShape::List)?;
        Ok(output.count().unwrap_or(0))
    }

    fn run_select<R: Record>(
        &mut self,
        statement: Statement,
        projection: Option<Projection>,
        shape: ResultShape,
    ) -> Result<QueryOutput<R>> {
        match projection {
            None => {
                let count = self
                    .traced()
                    .query_row(&statement)?
                    .map_or(0, |row| row.int_or_zero(0));
                Ok(QueryOutput::Count(count))
            }
            Some(projection) => {
                let rows = self.traced().query(&statement)?;
                materialize(&projection, rows, shape)
            }
        }
    }
}
