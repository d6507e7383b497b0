pub mod error;
pub mod schema;
pub mod select;

use nom::{
  branch::alt,
  bytes::complete::{tag, take_while1},
  character::complete::multispace0,
  combinator::map,
  sequence::delimited,
  IResult, Parser,
};

/// Leading/trailing whitespace around a sub-parser.
fn ws<'a, O, P>(inner: P) -> impl Parser<&'a str, Output = O, Error = nom::error::Error<&'a str>>
where
  P: Parser<&'a str, Output = O, Error = nom::error::Error<&'a str>>,
{
  delimited(multispace0, inner, multispace0)
}

/// A table, index, or column name: bare alphanumeric/underscore, or
/// double-quoted to allow anything but a quote.
fn identifier(input: &str) -> IResult<&str, String> {
  let quoted = delimited(tag("\""), take_while1(|c: char| c != '"'), tag("\""));
  let unquoted = take_while1(|c: char| c.is_alphanumeric() || c == '_');
  map(alt((quoted, unquoted)), String::from).parse(input)
}
