// Module declarations
pub mod error;
pub mod value;
pub mod data_type;
pub mod constraints;
pub mod column;
pub mod row;
pub mod table;
pub mod record;
pub mod naming;
pub mod config;

// Re-exports for convenience
pub use error::{OrmError, Result};
pub use value::Value;
pub use data_type::DataType;
pub use constraints::{group_columns, ForeignKey, GroupEntry};
pub use column::Column;
pub use row::Row;
pub use table::Table;
pub use record::{FieldDef, FieldKind, Record, Ref, SqlField};
pub use naming::{table_name, to_snake_case};
pub use config::{OrmConfig, DEFAULT_MAX_LIMIT};
