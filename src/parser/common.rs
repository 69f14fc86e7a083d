use nom::{
    bytes::complete::take_while,
    character::complete::{multispace0, satisfy},
    combinator::{all_consuming, map, recognize},
    sequence::{delimited, pair},
    IResult,
};

/// Longest identifier accepted for tables and columns.
pub const MAX_IDENTIFIER_LEN: usize = 64;

pub fn ws<'a, F, O>(inner: F) -> impl FnMut(&'a str) -> IResult<&'a str, O>
where
    F: FnMut(&'a str) -> IResult<&'a str, O>,
{
    delimited(multispace0, inner, multispace0)
}

// [A-Za-z_][A-Za-z0-9_]*
pub fn identifier(input: &str) -> IResult<&str, String> {
    map(
        recognize(pair(
            satisfy(|c| c.is_ascii_alphabetic() || c == '_'),
            take_while(|c: char| c.is_ascii_alphanumeric() || c == '_'),
        )),
        |s: &str| s.to_string(),
    )(input)
}

#[must_use]
pub fn is_valid_identifier(input: &str) -> bool {
    input.len() <= MAX_IDENTIFIER_LEN && all_consuming(identifier)(input).is_ok()
}
