use nom::{
    IResult, Parser,
    branch::alt,
    bytes::complete::{take_while, take_while1},
    character::complete::{char, multispace0, multispace1},
    combinator::all_consuming,
    multi::separated_list1,
    sequence::{delimited, separated_pair},
};
use crate::core::error::{Error, Result};
use crate::core::types::Field;

/// Parses user queries into the fields handed to `Find`.
///
/// Examples:
/// - `level=error` -> one field
/// - `level=error code=500` -> both must match (AND)
/// - `msg="connection reset"` -> quoted value with spaces
/// - `user=` -> empty value
pub struct QueryParser;

impl QueryParser {
    pub fn new() -> Self {
        QueryParser
    }

    pub fn parse(&self, input: &str) -> Result<Vec<Field<'static>>> {
        if input.trim().is_empty() {
            return Err(Error::invalid_input("empty query"));
        }

        let (_, pairs) = query(input)
            .map_err(|e| Error::invalid_input(format!("invalid query {:?}: {}", input, e)))?;

        Ok(pairs.into_iter()
            .map(|(key, value)| Field::new(key.as_bytes().to_vec(), value.as_bytes().to_vec()))
            .collect())
    }
}

impl Default for QueryParser {
    fn default() -> Self {
        Self::new()
    }
}

fn query(input: &str) -> IResult<&str, Vec<(&str, &str)>> {
    all_consuming(delimited(
        multispace0,
        separated_list1(multispace1, pair),
        multispace0,
    ))
    .parse(input)
}

fn pair(input: &str) -> IResult<&str, (&str, &str)> {
    separated_pair(key, char('='), value).parse(input)
}

fn key(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| !c.is_whitespace() && c != '=' && c != '"').parse(input)
}

fn value(input: &str) -> IResult<&str, &str> {
    alt((quoted, take_while(|c: char| !c.is_whitespace() && c != '"'))).parse(input)
}

fn quoted(input: &str) -> IResult<&str, &str> {
    delimited(char('"'), take_while(|c: char| c != '"'), char('"')).parse(input)
}
