//! In-memory stand-in for a PostgreSQL connection.
//!
//! Only understands the statements compiled for the `order_item` table below,
//! but enforces what the real engine would: a unique position per parent
//! group after every statement, and rollback of uncommitted work.
#![allow(dead_code)]

use tagorm::{
    record, Connection, Executor, OrmError, Ref, Result, Row, Statement, Transaction, Value,
};

record! {
    #[derive(Debug, Clone, Default, PartialEq)]
    pub struct CustomerOrder {
        #[sql = "pkey:id"]
        pub id: i64,
        #[sql = "title"]
        pub title: String,
    }
}

record! {
    #[derive(Debug, Clone, Default, PartialEq)]
    pub struct OrderItem {
        #[sql = "pkey:id"]
        pub id: i64,
        #[sql = "fkey:order_id"]
        pub order: Option<Ref<CustomerOrder>>,
        #[sql = "name"]
        pub name: String,
        #[sql = "position;position"]
        pub position: i64,
    }
}

pub const INSERT_SQL: &str = "INSERT INTO order_item (order_id, name, position) \
    VALUES ($1, $2, (SELECT COALESCE(MAX(position), 0) + 1 FROM order_item WHERE order_id = $3)) \
    RETURNING id";

pub fn item(order: i64, name: &str) -> OrderItem {
    OrderItem {
        order: (order != 0).then(|| Ref::new(order)),
        name: name.to_string(),
        ..OrderItem::default()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StoredItem {
    pub id: i64,
    pub order_id: i64,
    pub name: String,
    pub position: i64,
}

impl StoredItem {
    fn get(&self, column: &str) -> Value {
        match column {
            "id" => Value::Integer(self.id),
            "order_id" => Value::Integer(self.order_id),
            "name" => Value::Text(self.name.clone()),
            "position" => Value::Integer(self.position),
            _ => panic!("unknown column {column}"),
        }
    }

    fn set(&mut self, column: &str, value: Value) {
        match (column, value) {
            ("order_id", Value::Integer(v)) => self.order_id = v,
            ("name", Value::Text(v)) => self.name = v,
            ("position", Value::Integer(v)) => self.position = v,
            (column, value) => panic!("cannot set {column} to {value:?}"),
        }
    }
}

#[derive(Debug, Default)]
pub struct MemoryConnection {
    pub rows: Vec<StoredItem>,
    next_id: i64,
    pub log: Vec<Statement>,
    pub commits: usize,
    pub rollbacks: usize,
    pub fail_rollback: bool,
    fail_on: Option<(String, usize)>,
}

impl MemoryConnection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fails the `nth` (0-based) statement whose SQL contains `pattern`.
    pub fn fail_on(&mut self, pattern: &str, nth: usize) {
        self.fail_on = Some((pattern.to_string(), nth));
    }

    /// Appends rows to the end of a group without logging statements.
    pub fn seed(&mut self, order_id: i64, names: &[&str]) -> Vec<i64> {
        names
            .iter()
            .map(|name| {
                let position = self.next_position(order_id);
                self.next_id += 1;
                self.rows.push(StoredItem {
                    id: self.next_id,
                    order_id,
                    name: (*name).to_string(),
                    position,
                });
                self.next_id
            })
            .collect()
    }

    /// Names of a group in position order, with their positions.
    pub fn group(&self, order_id: i64) -> Vec<(&str, i64)> {
        let mut group: Vec<(&str, i64)> = self
            .rows
            .iter()
            .filter(|r| r.order_id == order_id)
            .map(|r| (r.name.as_str(), r.position))
            .collect();
        group.sort_by_key(|(_, position)| *position);
        group
    }

    /// Number of logged INSERT, UPDATE and DELETE statements.
    pub fn writes(&self) -> usize {
        self.log
            .iter()
            .filter(|s| ["INSERT", "UPDATE", "DELETE"].iter().any(|kw| s.sql.starts_with(kw)))
            .count()
    }

    pub fn clear_log(&mut self) {
        self.log.clear();
    }

    fn next_position(&self, order_id: i64) -> i64 {
        self.rows
            .iter()
            .filter(|r| r.order_id == order_id)
            .map(|r| r.position)
            .max()
            .unwrap_or(0)
            + 1
    }

    fn injected_failure(&mut self, sql: &str) -> bool {
        let fail = match &mut self.fail_on {
            Some((pattern, nth)) if sql.contains(pattern.as_str()) => {
                if *nth == 0 {
                    true
                } else {
                    *nth -= 1;
                    false
                }
            }
            _ => false,
        };
        if fail {
            self.fail_on = None;
        }
        fail
    }

    fn run(&mut self, statement: &Statement) -> Result<(u64, Vec<Row>)> {
        self.log.push(statement.clone());
        let sql = statement.sql.as_str();
        let args = statement.args.as_slice();
        if self.injected_failure(sql) {
            return Err(OrmError::storage("injected failure"));
        }

        if sql.starts_with("CREATE ") {
            return Ok((0, Vec::new()));
        }
        if sql.starts_with("INSERT INTO order_item ") {
            assert_eq!(sql, INSERT_SQL);
            return Ok(self.insert(args));
        }
        if let Some(rest) = sql.strip_prefix("UPDATE order_item SET ") {
            return self.update(rest, args).map(|n| (n, Vec::new()));
        }
        if let Some(cond) = sql.strip_prefix("DELETE FROM order_item WHERE ") {
            let before = self.rows.len();
            self.rows.retain(|row| !matches(row, cond, args));
            return Ok(((before - self.rows.len()) as u64, Vec::new()));
        }
        if let Some(rest) = sql.strip_prefix("SELECT ") {
            return Ok((0, self.select(rest, args)));
        }
        panic!("unexpected statement: {sql}");
    }

    fn insert(&mut self, args: &[Value]) -> (u64, Vec<Row>) {
        let order_id = args[0].as_int().unwrap();
        let position = self.next_position(args[2].as_int().unwrap());
        self.next_id += 1;
        self.rows.push(StoredItem {
            id: self.next_id,
            order_id,
            name: args[1].as_text().unwrap().to_string(),
            position,
        });
        (1, vec![Row::new(vec![Value::Integer(self.next_id)])])
    }

    fn update(&mut self, rest: &str, args: &[Value]) -> Result<u64> {
        let (assigns, cond) = rest.split_once(" WHERE ").expect("UPDATE without WHERE");
        let before = self.rows.clone();
        let mut affected = 0;
        for row in &mut self.rows {
            if !matches(row, cond, args) {
                continue;
            }
            affected += 1;
            for assign in assigns.split(", ") {
                let (column, expr) = assign.split_once(" = ").unwrap();
                let position = row.position;
                let value = match expr {
                    "(position + 1) * -1" => Value::Integer(-(position + 1)),
                    "(position - 1) * -1" => Value::Integer(-(position - 1)),
                    "position * -1" => Value::Integer(-position),
                    placeholder => arg(args, placeholder),
                };
                row.set(column, value);
            }
        }

        let mut seen = std::collections::HashSet::new();
        if !self.rows.iter().all(|r| seen.insert((r.order_id, r.position))) {
            self.rows = before;
            return Err(OrmError::storage(
                "duplicate key value violates unique constraint \"order_item_position\"",
            ));
        }
        Ok(affected)
    }

    fn select(&self, rest: &str, args: &[Value]) -> Vec<Row> {
        let (list, tail) = rest.split_once(" FROM order_item").unwrap();
        let tail = tail.strip_suffix(" FOR UPDATE").unwrap_or(tail);
        let (tail, offset) = match tail.rsplit_once(" OFFSET ") {
            Some((t, n)) => (t, n.parse::<usize>().unwrap()),
            None => (tail, 0),
        };
        let (tail, limit) = match tail.rsplit_once(" LIMIT ") {
            Some((t, n)) => (t, n.parse::<usize>().unwrap()),
            None => (tail, usize::MAX),
        };
        let (tail, order) = match tail.rsplit_once(" ORDER BY ") {
            Some((t, o)) => (t, Some(o)),
            None => (tail, None),
        };
        let cond = tail.strip_prefix(" WHERE ");

        let mut rows: Vec<&StoredItem> = self
            .rows
            .iter()
            .filter(|row| cond.is_none_or(|c| matches(row, c, args)))
            .collect();

        if let Some(order) = order {
            for term in order.split(", ").collect::<Vec<_>>().into_iter().rev() {
                let (column, desc) = match term.split_once(' ') {
                    Some((column, dir)) => (column, dir == "DESC"),
                    None => (term, false),
                };
                rows.sort_by(|a, b| {
                    let ord = compare(&a.get(column), &b.get(column));
                    if desc { ord.reverse() } else { ord }
                });
            }
        }

        match list {
            "COUNT(*)" => vec![Row::new(vec![Value::Integer(rows.len() as i64)])],
            "COALESCE(MAX(position), 0)" => {
                let max = rows.iter().map(|r| r.position).max().unwrap_or(0);
                vec![Row::new(vec![Value::Integer(max)])]
            }
            columns => rows
                .into_iter()
                .skip(offset)
                .take(limit)
                .map(|row| Row::new(columns.split(", ").map(|c| row.get(c)).collect()))
                .collect(),
        }
    }
}

fn arg(args: &[Value], placeholder: &str) -> Value {
    let idx: usize = placeholder
        .strip_prefix('$')
        .and_then(|n| n.parse().ok())
        .unwrap_or_else(|| panic!("not a placeholder: {placeholder}"));
    args[idx - 1].clone()
}

fn compare(a: &Value, b: &Value) -> std::cmp::Ordering {
    match (a, b) {
        (Value::Integer(x), Value::Integer(y)) => x.cmp(y),
        (Value::Text(x), Value::Text(y)) => x.cmp(y),
        _ => std::cmp::Ordering::Equal,
    }
}

fn matches(row: &StoredItem, cond: &str, args: &[Value]) -> bool {
    cond.split(" AND ").all(|predicate| {
        let mut parts = predicate.split_whitespace();
        let (Some(column), Some(op), Some(operand)) = (parts.next(), parts.next(), parts.next())
        else {
            panic!("unsupported predicate: {predicate}");
        };
        let actual = row.get(column);
        // Either a `$n` placeholder or an integer literal such as `position < 0`.
        let expected = operand
            .parse::<i64>()
            .map_or_else(|_| arg(args, operand), Value::Integer);
        match op {
            "=" => actual == expected,
            "!=" => actual != expected,
            ">" => compare(&actual, &expected).is_gt(),
            "<" => compare(&actual, &expected).is_lt(),
            _ => panic!("unsupported operator: {op}"),
        }
    })
}

impl Executor for MemoryConnection {
    fn execute(&mut self, statement: &Statement) -> Result<u64> {
        self.run(statement).map(|(n, _)| n)
    }

    fn query_row(&mut self, statement: &Statement) -> Result<Option<Row>> {
        self.run(statement).map(|(_, rows)| rows.into_iter().next())
    }

    fn query(&mut self, statement: &Statement) -> Result<Vec<Row>> {
        self.run(statement).map(|(_, rows)| rows)
    }
}

pub struct MemoryTx<'a> {
    conn: &'a mut MemoryConnection,
    snapshot: Option<Vec<StoredItem>>,
}

impl Executor for MemoryTx<'_> {
    fn execute(&mut self, statement: &Statement) -> Result<u64> {
        self.conn.execute(statement)
    }

    fn query_row(&mut self, statement: &Statement) -> Result<Option<Row>> {
        self.conn.query_row(statement)
    }

    fn query(&mut self, statement: &Statement) -> Result<Vec<Row>> {
        self.conn.query(statement)
    }
}

impl Transaction for MemoryTx<'_> {
    fn commit(mut self) -> Result<()> {
        if self.conn.rows.iter().any(|r| r.position < 0) {
            return Err(OrmError::storage("negative position at commit"));
        }
        self.snapshot = None;
        self.conn.commits += 1;
        Ok(())
    }

    fn rollback(mut self) -> Result<()> {
        self.conn.rollbacks += 1;
        if self.conn.fail_rollback {
            return Err(OrmError::storage("connection lost"));
        }
        if let Some(snapshot) = self.snapshot.take() {
            self.conn.rows = snapshot;
        }
        Ok(())
    }
}

impl Drop for MemoryTx<'_> {
    fn drop(&mut self) {
        if let Some(snapshot) = self.snapshot.take() {
            self.conn.rows = snapshot;
        }
    }
}

impl Connection for MemoryConnection {
    type Tx<'a>
        = MemoryTx<'a>
    where
        Self: 'a;

    fn begin(&mut self) -> Result<MemoryTx<'_>> {
        Ok(MemoryTx {
            snapshot: Some(self.rows.clone()),
            conn: self,
        })
    }
}
