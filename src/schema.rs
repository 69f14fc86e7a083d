/// Schema derivation: record fields + tags -> [`Table`].
///
/// A table is derived fresh for every operation from the record's current
/// field values, so column snapshots always reflect the caller's record.

use crate::parser::{parse_tag, GroupKind, Role};
use crate::types::{
    table_name, Column, DataType, FieldKind, ForeignKey, GroupEntry, OrmError, Record, Result,
    Table, Value,
};

/// Table and column a reference field points at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefTarget {
    pub table: String,
    pub column: String,
}

/// Resolves where references to `T` point: its table and identity column.
pub fn ref_target<T: Record>() -> Result<RefTarget> {
    let mut column = "id".to_string();
    for field in T::fields() {
        let Some(tag) = field.tag.map(parse_tag).transpose()?.flatten() else {
            continue;
        };
        if tag.role == Role::PrimaryKey {
            column = tag.name;
            break;
        }
    }
    Ok(RefTarget {
        table: table_name::<T>()?,
        column,
    })
}

const fn data_type_for(kind: FieldKind) -> Option<DataType> {
    match kind {
        FieldKind::Boolean => Some(DataType::Boolean),
        FieldKind::Integer => Some(DataType::Integer),
        FieldKind::BigInt => Some(DataType::BigInt),
        FieldKind::Text => Some(DataType::Varchar),
        FieldKind::Float => Some(DataType::Float),
        FieldKind::Timestamp => Some(DataType::Timestamp),
        FieldKind::Reference(_) | FieldKind::Unsupported(_) => None,
    }
}

/// Derives the table description of `record`.
pub fn build_table<R: Record>(record: &R) -> Result<Table> {
    let mut table = Table::new(table_name::<R>()?);

    for field in R::fields() {
        let Some(tag_text) = field.tag else {
            continue;
        };
        let Some(tag) = parse_tag(tag_text)? else {
            continue;
        };
        let value = record.value(field.name).unwrap_or(Value::Null);

        let data_type = match (tag.role, field.kind) {
            (Role::ForeignKey, FieldKind::Reference(resolve)) => {
                let target = resolve()?;
                push_groups(&mut table, &tag.name, &tag.groups);
                table.foreign_keys.push(ForeignKey {
                    field: field.name.to_string(),
                    column: tag.name,
                    value,
                    referenced_table: target.table,
                    referenced_column: target.column,
                    nullable: tag.nullable,
                });
                continue;
            }
            (Role::ForeignKey, _) => {
                return Err(OrmError::invalid_tag(tag_text, "foreign key on a non-reference field"));
            }
            (Role::PrimaryKey, _) => DataType::BigSerial,
            (Role::Plain, kind) => match data_type_for(kind) {
                Some(data_type) => data_type,
                None => {
                    tracing::warn!(
                        table = %table.name,
                        field = field.name,
                        kind = ?kind,
                        "field type has no column mapping, skipping"
                    );
                    continue;
                }
            },
        };

        if tag.position && table.position_column().is_some() {
            return Err(OrmError::invalid_tag(tag_text, "only one position column per table"));
        }

        push_groups(&mut table, &tag.name, &tag.groups);
        table.columns.push(Column {
            field: field.name.to_string(),
            name: tag.name,
            value,
            data_type,
            nullable: tag.nullable,
            primary_key: tag.role == Role::PrimaryKey,
            default: tag.default,
            check: tag.check,
            position: tag.position,
        });
    }

    if table.columns.is_empty() {
        return Err(OrmError::NoColumns(table.name));
    }

    Ok(table)
}

fn push_groups(table: &mut Table, column: &str, groups: &[(GroupKind, String)]) {
    for (kind, label) in groups {
        let entry = GroupEntry {
            column: column.to_string(),
            label: label.clone(),
        };
        match kind {
            GroupKind::Unique => table.unique.push(entry),
            GroupKind::Index => table.indexes.push(entry),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{record, Ref};
    use chrono::NaiveDateTime;

    record! {
        /// Buyer referenced by ledger entries.
        #[derive(Debug, Clone, Default, PartialEq)]
        struct Customer {
            /// Account number.
            #[sql = "pkey:customer_no"]
            id: i64,
            /// Display name, never persisted.
            nickname: String,
        }
    }

    record! {
        #![table = "ledger_entries"]
        #[derive(Debug, Clone, Default, PartialEq)]
        struct Everything {
            #[sql = "pkey:id"]
            id: i64,
            #[sql = "fkey:customer_id;unique_pair"]
            customer: Option<Ref<Customer>>,
            #[sql = "fkey:referrer_id;null"]
            referrer: Option<Ref<Customer>>,
            #[sql = "active;default=true"]
            active: bool,
            #[sql = "qty;check(qty >= 0)"]
            qty: i32,
            #[sql = "code;unique_pair;index"]
            code: String,
            #[sql = "ratio;null"]
            ratio: f64,
            #[sql = "created_at"]
            created_at: NaiveDateTime,
            #[sql = "blobs"]
            blobs: Vec<u8>,
            scratch: String,
            #[sql = "position;position"]
            position: i64,
        }
    }

    record! {
        #![table = "9bad name"]
        #[derive(Debug, Clone, Default)]
        struct FallbackName {
            #[sql = "pkey:id"]
            id: i64,
        }
    }

    record! {
        #[derive(Debug, Clone, Default)]
        struct NoTags {
            id: i64,
        }
    }

    record! {
        #[derive(Debug, Clone, Default)]
        struct TwoPositions {
            #[sql = "a;position"]
            a: i64,
            #[sql = "b;position"]
            b: i64,
        }
    }

    #[test]
    fn test_types_per_field_kind() {
        let table = build_table(&Everything::default()).unwrap();
        let types: Vec<(&str, DataType)> = table
            .columns
            .iter()
            .map(|c| (c.name.as_str(), c.data_type))
            .collect();
        assert_eq!(
            types,
            vec![
                ("id", DataType::BigSerial),
                ("active", DataType::Boolean),
                ("qty", DataType::Integer),
                ("code", DataType::Varchar),
                ("ratio", DataType::Float),
                ("created_at", DataType::Timestamp),
                ("position", DataType::BigInt),
            ]
        );
    }

    #[test]
    fn test_custom_table_name_and_fallback() {
        assert_eq!(build_table(&Everything::default()).unwrap().name, "ledger_entries");
        assert_eq!(build_table(&FallbackName::default()).unwrap().name, "fallback_name");
    }

    #[test]
    fn test_foreign_keys_stay_out_of_columns() {
        let record = Everything {
            customer: Some(Ref::new(12)),
            ..Everything::default()
        };
        let table = build_table(&record).unwrap();

        assert!(table.column("customer").is_none());
        assert_eq!(table.foreign_keys.len(), 2);
        let customer = &table.foreign_keys[0];
        assert_eq!(customer.column, "customer_id");
        assert_eq!(customer.value, Value::Integer(12));
        assert_eq!(customer.referenced_table, "customer");
        assert_eq!(customer.referenced_column, "customer_no");
        assert!(!customer.nullable);
        assert_eq!(table.foreign_keys[1].value, Value::Null);
        assert!(table.foreign_keys[1].nullable);
    }

    #[test]
    fn test_modifiers_reach_columns() {
        let table = build_table(&Everything::default()).unwrap();
        let active = table.column("active").unwrap();
        assert_eq!(active.default.as_deref(), Some("true"));
        let qty = table.column("qty").unwrap();
        assert_eq!(qty.check.as_deref(), Some("qty >= 0"));
        assert!(table.column("ratio").unwrap().nullable);
        assert!(table.column("position").unwrap().position);
        assert!(table.column("id").unwrap().primary_key);
    }

    #[test]
    fn test_shared_label_builds_one_constraint() {
        let table = build_table(&Everything::default()).unwrap();
        assert_eq!(
            table.unique_constraints(),
            vec![vec!["customer_id".to_string(), "code".to_string()]]
        );
        assert_eq!(table.index_groups(), vec![vec!["code".to_string()]]);
    }

    #[test]
    fn test_derivation_is_deterministic() {
        let record = Everything {
            id: 3,
            code: "X".to_string(),
            ..Everything::default()
        };
        let first = build_table(&record).unwrap();
        let second = build_table(&record).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_untagged_record_has_no_columns() {
        assert!(matches!(
            build_table(&NoTags::default()),
            Err(OrmError::NoColumns(name)) if name == "no_tags"
        ));
    }

    #[test]
    fn test_second_position_column_fails() {
        assert!(matches!(
            build_table(&TwoPositions::default()),
            Err(OrmError::InvalidTag { .. })
        ));
    }

    #[test]
    fn test_documented_fields_keep_their_tags() {
        let fields = Customer::fields();
        assert_eq!(fields.len(), 2);
        assert_eq!(fields[0].tag, Some("pkey:customer_no"));
        assert_eq!(fields[1].tag, None);

        let table = build_table(&Customer { id: 5, nickname: "ann".to_string() }).unwrap();
        assert_eq!(table.columns.len(), 1);
        assert_eq!(table.identity(), 5);
    }

    #[test]
    fn test_ref_target_defaults_to_id() {
        let target = ref_target::<FallbackName>().unwrap();
        assert_eq!(target.table, "fallback_name");
        assert_eq!(target.column, "id");
    }
}
