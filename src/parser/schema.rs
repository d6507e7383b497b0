//! The narrow DDL pattern matcher used to bootstrap the schema catalog.
//!
//! Only two shapes are recognized, matching what `sqlite_schema` rows of type
//! "table" and "index" contain:
//!
//! ```sql
//! CREATE TABLE name (col type modifiers..., ...)
//! CREATE INDEX name ON table (col)
//! ```
//!
//! Anything else is rejected; this is a deliberate limitation, not a SQL
//! parser.

use nom::{
  bytes::complete::{tag, tag_no_case, take_while1},
  combinator::{map, opt},
  multi::separated_list1,
  sequence::delimited,
  IResult, Parser,
};

use super::error::finish;
use super::{identifier, ws};

#[derive(Debug, PartialEq)]
pub struct CreateTable {
  pub table_name: String,
  pub columns: Vec<ColumnDef>,
}

/// One column of a CREATE TABLE list: the first token is the name, the second
/// the declared type, and the rest are carried as opaque modifier tokens.
#[derive(Debug, PartialEq)]
pub struct ColumnDef {
  pub name: String,
  pub decl_type: String,
  pub modifiers: Vec<String>,
}

#[derive(Debug, PartialEq)]
pub struct CreateIndex {
  pub index_name: String,
  pub table_name: String,
  pub column: String,
}

impl ColumnDef {
  /// An INTEGER column marked PRIMARY KEY aliases the rowid: its stored value
  /// is absent and the rowid stands in for it.
  pub fn is_rowid_alias(&self) -> bool {
    self.decl_type.eq_ignore_ascii_case("integer")
      && self.modifiers.iter().any(|m| m.eq_ignore_ascii_case("primary"))
  }
}

fn column_def(input: &str) -> IResult<&str, ColumnDef> {
  let (input, name) = ws(identifier).parse(input)?;
  // Everything up to the next comma or closing parenthesis belongs to this
  // column; whitespace-separated tokens are type then modifiers.
  let (input, rest) = opt(take_while1(|c: char| c != ',' && c != ')')).parse(input)?;
  let mut tokens = rest.unwrap_or("").split_whitespace().map(String::from);
  let decl_type = tokens.next().unwrap_or_default();
  let modifiers = tokens.collect();

  Ok((input, ColumnDef { name, decl_type, modifiers }))
}

fn column_list(input: &str) -> IResult<&str, Vec<ColumnDef>> {
  delimited(
    ws(tag("(")),
    separated_list1(tag(","), column_def),
    ws(tag(")")),
  )
  .parse(input)
}

fn if_not_exists(input: &str) -> IResult<&str, Option<()>> {
  opt(map(
    (
      ws(tag_no_case("IF")),
      ws(tag_no_case("NOT")),
      ws(tag_no_case("EXISTS")),
    ),
    |_| (),
  ))
  .parse(input)
}

fn create_table(input: &str) -> IResult<&str, CreateTable> {
  map(
    (
      ws(tag_no_case("CREATE")),
      ws(tag_no_case("TABLE")),
      if_not_exists,
      identifier,
      column_list,
    ),
    |(_, _, _, table_name, columns)| CreateTable { table_name, columns },
  )
  .parse(input)
}

fn create_index(input: &str) -> IResult<&str, CreateIndex> {
  map(
    (
      ws(tag_no_case("CREATE")),
      opt(ws(tag_no_case("UNIQUE"))),
      ws(tag_no_case("INDEX")),
      if_not_exists,
      identifier,
      ws(tag_no_case("ON")),
      identifier,
      delimited(ws(tag("(")), identifier, ws(tag(")"))),
    ),
    |(_, _, _, _, index_name, _, table_name, column)| CreateIndex {
      index_name,
      table_name,
      column,
    },
  )
  .parse(input)
}

pub fn parse_create_table(sql: &str) -> miette::Result<CreateTable> {
  finish(sql, create_table(sql))
}

pub fn parse_create_index(sql: &str) -> miette::Result<CreateIndex> {
  finish(sql, create_index(sql))
}
