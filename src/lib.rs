// tagorm - tag-driven table mapping and SQL compilation
// Records declare columns through field tags; statements are compiled at runtime

// Clippy configuration - pedantic is on, these stay quiet
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::manual_let_else)]
#![allow(clippy::option_if_let_else)]
#![allow(clippy::format_push_string)]
#![allow(clippy::items_after_statements)]

// Core structures (values, columns, tables, records, errors, config)
pub mod core;

// Re-export all core types as a types module
pub mod types {
    pub use crate::core::*;
}

// Field tag parser
pub mod parser;

// Record -> table description
pub mod schema;

// Filter specification and its builder
pub mod filter;

// Executor boundary (statements, connections, transactions)
pub mod executor;

// Statement compilation and result materialization
pub mod compiler;

// Position reordering within parent groups
pub mod reorder;

// CREATE TABLE / CREATE INDEX rendering
pub mod ddl;

// Record-level operations
pub mod orm;

// Re-export commonly used types for convenience
pub use core::{
    Column, DataType, FieldDef, FieldKind, ForeignKey, OrmConfig, OrmError, Record, Ref, Result,
    Row, SqlField, Table, Value,
};
pub use compiler::{QueryOutput, ResultShape};
pub use executor::{Connection, Executor, Statement, Transaction};
pub use filter::{FilterBuilder, Filters, Operand};
pub use orm::Orm;
pub use schema::build_table;
