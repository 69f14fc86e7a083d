use crate::types::{OrmError, Result};
use super::common::{identifier, ws};
use nom::{
    branch::alt,
    bytes::complete::{tag, take_while1},
    character::complete::char,
    combinator::{all_consuming, map, opt, rest, value},
    sequence::{preceded, terminated},
    IResult,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Role {
    #[default]
    Plain,
    PrimaryKey,
    ForeignKey,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupKind {
    Unique,
    Index,
}

/// Structured form of one field tag such as `fkey:order_id;null;index_parent`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TagDescriptor {
    pub role: Role,
    pub name: String,
    pub nullable: bool,
    pub position: bool,
    /// Literal after `default=`.
    pub default: Option<String>,
    /// Expression inside `check(...)`.
    pub check: Option<String>,
    /// Uniqueness and index memberships with their group labels.
    pub groups: Vec<(GroupKind, String)>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Modifier {
    Group(GroupKind, String),
    Null,
    Position,
    Default(String),
    Check(String),
}

fn role(input: &str) -> IResult<&str, Role> {
    terminated(
        alt((
            value(Role::PrimaryKey, alt((tag("primary-key"), tag("pkey")))),
            value(Role::ForeignKey, alt((tag("foreign-key"), tag("fkey")))),
        )),
        char(':'),
    )(input)
}

fn head(input: &str) -> IResult<&str, (Option<Role>, String)> {
    let (input, role) = opt(role)(input)?;
    let (input, name) = ws(identifier)(input)?;
    Ok((input, (role, name)))
}

fn group_label(input: &str) -> IResult<&str, String> {
    map(
        opt(preceded(
            char('_'),
            take_while1(|c: char| c.is_ascii_alphanumeric() || c == '_'),
        )),
        |label: Option<&str>| label.unwrap_or_default().to_string(),
    )(input)
}

fn modifier(input: &str) -> IResult<&str, Modifier> {
    alt((
        map(preceded(tag("unique"), group_label), |label| {
            Modifier::Group(GroupKind::Unique, label)
        }),
        map(preceded(tag("index"), group_label), |label| {
            Modifier::Group(GroupKind::Index, label)
        }),
        value(Modifier::Null, tag("null")),
        value(Modifier::Position, tag("position")),
        map(preceded(tag("default="), rest), |s: &str| {
            Modifier::Default(s.trim().to_string())
        }),
        map(preceded(tag("check"), rest), |s: &str| {
            Modifier::Check(s.trim().to_string())
        }),
    ))(input)
}

/// Parses a field tag. Returns `None` for an empty tag, which keeps the field
/// out of the schema.
pub fn parse_tag(input: &str) -> Result<Option<TagDescriptor>> {
    let mut segments = input.split(';').map(str::trim);
    let head_text = segments.next().unwrap_or_default();
    if head_text.is_empty() {
        return Ok(None);
    }

    let (_, (role, name)) = all_consuming(head)(head_text)
        .map_err(|_| OrmError::invalid_tag(input, "expected [pkey:|fkey:]<column name>"))?;

    let mut descriptor = TagDescriptor {
        role: role.unwrap_or_default(),
        name,
        ..TagDescriptor::default()
    };

    for segment in segments.filter(|s| !s.is_empty()) {
        let Ok((_, parsed)) = all_consuming(modifier)(segment) else {
            tracing::warn!(tag = input, modifier = segment, "ignoring unknown tag modifier");
            continue;
        };
        match parsed {
            Modifier::Group(kind, label) => descriptor.groups.push((kind, label)),
            Modifier::Null => descriptor.nullable = true,
            Modifier::Position => descriptor.position = true,
            Modifier::Default(literal) => {
                if literal.is_empty() {
                    return Err(OrmError::invalid_tag(input, "default= needs a value"));
                }
                descriptor.default = Some(literal);
            }
            Modifier::Check(expr) => {
                let inner = expr
                    .strip_prefix('(')
                    .and_then(|e| e.strip_suffix(')'))
                    .map(str::trim)
                    .filter(|e| !e.is_empty())
                    .ok_or_else(|| OrmError::invalid_tag(input, "check needs a parenthesized expression"))?;
                descriptor.check = Some(inner.to_string());
            }
        }
    }

    Ok(Some(descriptor))
}
