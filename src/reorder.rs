//! Dense per-group position maintenance.
//!
//! Positions are unique inside a parent group, so rows cannot be shifted in
//! place without colliding mid-statement. Each shift negates the affected
//! range while moving it, and a second statement flips the range back:
//!
//! 1. open a slot:  `pos = (pos + 1) * -1 WHERE pos > open_after`, unflip
//! 2. write the moved row into the slot
//! 3. close the gap: `pos = (pos - 1) * -1 WHERE pos > close_after`, unflip
//!
//! Everything runs in one transaction. Negative positions never commit.

use crate::executor::{Connection, Executor, Statement, Traced, Transaction};
use crate::types::{Column, ForeignKey, OrmError, Result, Table, Value};

/// Bounds of the three writes that move a row from `old` to `new`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShiftPlan {
    /// Rows above this position move up by one.
    pub open_after: i64,
    /// Slot the moved row is written into.
    pub target: i64,
    /// Rows above this position move down by one.
    pub close_after: i64,
}

impl ShiftPlan {
    /// `None` when the row already sits at `new`.
    #[must_use]
    pub const fn new(old: i64, new: i64) -> Option<Self> {
        if old == new {
            None
        } else if old < new {
            Some(Self {
                open_after: new,
                target: new + 1,
                close_after: old,
            })
        } else {
            Some(Self {
                open_after: new - 1,
                target: new,
                close_after: old,
            })
        }
    }
}

/// SQL for one table's position column inside one parent group.
struct GroupSql<'t> {
    table: &'t str,
    identity: &'t str,
    position: &'t str,
    parent: &'t str,
}

impl GroupSql<'_> {
    fn lock_row(&self, id: i64) -> Statement {
        Statement::new(
            format!(
                "SELECT {}, {} FROM {} WHERE {} = $1 FOR UPDATE",
                self.position, self.parent, self.table, self.identity
            ),
            vec![Value::Integer(id)],
        )
    }

    fn lock_position(&self, id: i64) -> Statement {
        Statement::new(
            format!(
                "SELECT {} FROM {} WHERE {} = $1 FOR UPDATE",
                self.position, self.table, self.identity
            ),
            vec![Value::Integer(id)],
        )
    }

    fn group_max(&self, parent: &Value) -> Statement {
        Statement::new(
            format!(
                "SELECT COALESCE(MAX({}), 0) FROM {} WHERE {} = $1",
                self.position, self.table, self.parent
            ),
            vec![parent.clone()],
        )
    }

    fn shift(&self, op: char, parent: &Value, after: i64) -> Statement {
        let pos = self.position;
        Statement::new(
            format!(
                "UPDATE {} SET {pos} = ({pos} {op} 1) * -1 WHERE {} = $1 AND {pos} > $2",
                self.table, self.parent
            ),
            vec![parent.clone(), Value::Integer(after)],
        )
    }

    fn unflip(&self, parent: &Value) -> Statement {
        let pos = self.position;
        Statement::new(
            format!(
                "UPDATE {} SET {pos} = {pos} * -1 WHERE {} = $1 AND {pos} < 0",
                self.table, self.parent
            ),
            vec![parent.clone()],
        )
    }

    fn place(&self, id: i64, target: i64) -> Statement {
        Statement::new(
            format!(
                "UPDATE {} SET {} = $2 WHERE {} = $1",
                self.table, self.position, self.identity
            ),
            vec![Value::Integer(id), Value::Integer(target)],
        )
    }
}

/// Moves the row described by `table` to the position held in its snapshot.
///
/// The requested position is clamped to the group size. The parent key is
/// read from storage when the snapshot does not carry it; the current
/// position is always read from storage under a row lock.
pub fn move_position<C: Connection>(conn: &mut C, table: &Table, log_statements: bool) -> Result<()> {
    let (Some(identity), Some(position)) = (table.identity_column(), table.position_column()) else {
        return Err(OrmError::NoPositionOrId);
    };
    let id = table.identity();
    let requested = position.value.as_int().unwrap_or(0);
    if id == 0 || requested == 0 {
        return Err(OrmError::NoPositionOrId);
    }
    if requested < 0 {
        return Err(OrmError::InvalidPosition(requested));
    }
    let parent = table.parent_key().ok_or(OrmError::NoParentColumn)?;

    let sql = GroupSql {
        table: &table.name,
        identity: &identity.name,
        position: &position.name,
        parent: &parent.column,
    };

    let mut tx = conn.begin()?;
    let result = {
        let mut traced = Traced::new(&mut tx, log_statements);
        run_move(&mut traced, &sql, parent, position, id, requested)
    };
    match result {
        Ok(()) => tx.commit(),
        Err(err) => {
            if let Err(rollback_err) = tx.rollback() {
                tracing::warn!(
                    table = %table.name,
                    id,
                    error = %rollback_err,
                    "rollback after failed move also failed"
                );
            }
            Err(err)
        }
    }
}

fn run_move<E: Executor>(
    exec: &mut E,
    sql: &GroupSql<'_>,
    parent: &ForeignKey,
    position: &Column,
    id: i64,
    requested: i64,
) -> Result<()> {
    let mut group = parent.value.clone();
    let old = if group.is_empty_key() {
        let row = exec.query_row(&sql.lock_row(id))?.ok_or(OrmError::RowNotFound)?;
        group = row.get(1).cloned().unwrap_or_default();
        row.int_or_zero(0)
    } else {
        exec.query_row(&sql.lock_position(id))?
            .map_or(0, |row| row.int_or_zero(0))
    };
    if group.is_empty_key() {
        return Err(OrmError::NoParent);
    }
    if old == 0 {
        return Err(OrmError::RowNotFound);
    }

    let max = exec
        .query_row(&sql.group_max(&group))?
        .map_or(0, |row| row.int_or_zero(0));
    let new = requested.min(max.max(old));

    let Some(plan) = ShiftPlan::new(old, new) else {
        tracing::debug!(table = sql.table, column = %position.name, id, old, "position unchanged");
        return Ok(());
    };
    tracing::debug!(table = sql.table, id, old, new, group = %group, "moving row");

    exec.execute(&sql.shift('+', &group, plan.open_after))?;
    exec.execute(&sql.unflip(&group))?;
    exec.execute(&sql.place(id, plan.target))?;
    exec.execute(&sql.shift('-', &group, plan.close_after))?;
    exec.execute(&sql.unflip(&group))?;
    Ok(())
}
