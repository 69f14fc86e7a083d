use super::error::{OrmError, Result};
use super::record::Record;
use crate::parser::is_valid_identifier;

/// Converts a type name such as `OrderItem` or `HTTPRequest` into
/// `order_item` / `http_request`.
#[must_use]
pub fn to_snake_case(name: &str) -> String {
    let chars: Vec<char> = name.chars().filter(|c| *c != '*').collect();
    let mut out = String::with_capacity(chars.len() + 4);
    for (i, &c) in chars.iter().enumerate() {
        if c.is_ascii_uppercase() && i > 0 {
            let prev = chars[i - 1];
            let next_is_lower = chars.get(i + 1).is_some_and(char::is_ascii_lowercase);
            let boundary = prev.is_ascii_lowercase()
                || prev.is_ascii_digit()
                || (prev.is_ascii_uppercase() && next_is_lower);
            if boundary && prev != '_' {
                out.push('_');
            }
        }
        out.push(c.to_ascii_lowercase());
    }
    out
}

/// Canonical table name of `R`.
///
/// A custom name is used when it converts to a valid identifier; otherwise
/// the type name is converted instead.
pub fn table_name<R: Record>() -> Result<String> {
    if let Some(custom) = R::custom_table_name() {
        let name = to_snake_case(&custom);
        if is_valid_identifier(&name) {
            return Ok(name);
        }
        tracing::warn!(
            record = R::TYPE_NAME,
            custom = %custom,
            "custom table name is not a valid identifier, using type name"
        );
    }

    let name = to_snake_case(R::TYPE_NAME);
    if is_valid_identifier(&name) {
        Ok(name)
    } else {
        Err(OrmError::InvalidTableName(name))
    }
}
