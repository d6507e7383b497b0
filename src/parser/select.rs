//! Pattern matcher for the two recognized query shapes:
//!
//! ```sql
//! SELECT COUNT(*) FROM table
//! SELECT col, ... FROM table [WHERE col = literal]
//! ```
//!
//! Keywords are case-insensitive; a trailing semicolon is tolerated.

use nom::{
  branch::alt,
  bytes::complete::{tag, tag_no_case, take_while1},
  character::complete::{char, digit1},
  combinator::{map, map_res, opt, recognize},
  multi::separated_list1,
  sequence::{delimited, preceded},
  IResult, Parser,
};

use super::error::finish;
use super::{identifier, ws};

#[derive(Debug, PartialEq)]
pub struct SelectStatement {
  pub projection: Projection,
  pub table: String,
  pub where_clause: Option<Condition>,
}

#[derive(Debug, PartialEq)]
pub enum Projection {
  /// `COUNT(*)`
  Count,
  /// Named columns, in the order requested.
  Columns(Vec<String>),
}

/// The only supported predicate: `column = literal`.
#[derive(Debug, PartialEq)]
pub struct Condition {
  pub column: String,
  pub value: Literal,
}

#[derive(Debug, PartialEq)]
pub enum Literal {
  Integer(i64),
  Real(f64),
  Text(String),
}

fn keyword_guard(ident: String, input: &str) -> IResult<&str, String> {
  // Reserved words cannot double as identifiers; without this, "FROM" would
  // parse as a column name.
  if matches!(ident.to_uppercase().as_str(), "SELECT" | "FROM" | "WHERE" | "COUNT") {
    Err(nom::Err::Error(nom::error::Error::new(input, nom::error::ErrorKind::Verify)))
  } else {
    Ok((input, ident))
  }
}

fn column_name(input: &str) -> IResult<&str, String> {
  let (rest, ident) = identifier(input)?;
  keyword_guard(ident, rest)
}

fn quoted_text(input: &str) -> IResult<&str, Literal> {
  map(
    delimited(char('\''), take_while1(|c: char| c != '\''), char('\'')),
    |s: &str| Literal::Text(s.to_string()),
  )
  .parse(input)
}

fn number(input: &str) -> IResult<&str, Literal> {
  let integer = map_res(recognize((opt(char('-')), digit1)), |s: &str| {
    s.parse::<i64>().map(Literal::Integer)
  });
  let real = map_res(
    recognize((opt(char('-')), digit1, char('.'), digit1)),
    |s: &str| s.parse::<f64>().map(Literal::Real),
  );
  alt((real, integer)).parse(input)
}

fn literal(input: &str) -> IResult<&str, Literal> {
  alt((quoted_text, number, map(column_name, Literal::Text))).parse(input)
}

fn count_projection(input: &str) -> IResult<&str, Projection> {
  map(
    preceded(ws(tag_no_case("COUNT")), (ws(tag("(")), ws(tag("*")), ws(tag(")")))),
    |_| Projection::Count,
  )
  .parse(input)
}

fn column_projection(input: &str) -> IResult<&str, Projection> {
  map(separated_list1(ws(tag(",")), column_name), Projection::Columns).parse(input)
}

fn condition(input: &str) -> IResult<&str, Condition> {
  map(
    (column_name, ws(tag("=")), literal),
    |(column, _, value)| Condition { column, value },
  )
  .parse(input)
}

fn select_statement(input: &str) -> IResult<&str, SelectStatement> {
  map(
    (
      ws(tag_no_case("SELECT")),
      alt((count_projection, column_projection)),
      ws(tag_no_case("FROM")),
      identifier,
      opt(preceded(ws(tag_no_case("WHERE")), condition)),
      opt(ws(tag(";"))),
    ),
    |(_, projection, _, table, where_clause, _)| SelectStatement {
      projection,
      table,
      where_clause,
    },
  )
  .parse(input)
}

pub fn parse(input: &str) -> miette::Result<SelectStatement> {
  finish(input, select_statement(input))
}
