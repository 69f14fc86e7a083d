// Module declarations
mod common;
mod tag;

pub use common::{identifier, is_valid_identifier, MAX_IDENTIFIER_LEN};
pub use tag::{parse_tag, GroupKind, Role, TagDescriptor};
