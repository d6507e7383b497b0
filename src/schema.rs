use crate::btree::TableScan;
use crate::error::{Error, Result};
use crate::page::cell::TableRow;
use crate::pager::Pager;
use crate::parser::schema::{parse_create_index, parse_create_table, ColumnDef};
use crate::record::Value;

/// The schema table is itself a table b-tree rooted at page 1; its rows are
/// (type, name, tbl_name, rootpage, sql).
pub const SCHEMA_ROOT_PAGE: u32 = 1;

/// Bookkeeping tables hidden from `.tables`-style listings.
const INTERNAL_TABLES: [&str; 2] = ["sqlite_sequence", "sqlite_schema"];

#[derive(Debug)]
pub struct TableSchema {
  pub name: String,
  pub root_page: u32,
  pub columns: Vec<ColumnDef>,
}

#[derive(Debug)]
pub struct IndexSchema {
  pub name: String,
  pub table_name: String,
  pub column: String,
  pub root_page: u32,
}

/// Table and index definitions bootstrapped from page 1. Built once per open
/// database handle and reused; the file never changes underneath it.
#[derive(Debug, Default)]
pub struct Catalog {
  tables: Vec<TableSchema>,
  indexes: Vec<IndexSchema>,
}

impl TableSchema {
  pub fn column_ordinal(&self, name: &str) -> Option<usize> {
    self
      .columns
      .iter()
      .position(|column| column.name.eq_ignore_ascii_case(name))
  }

  /// True when the column at `ordinal` is an INTEGER PRIMARY KEY, i.e. an
  /// alias for the rowid: equality against it can prune the table tree
  /// without any secondary index.
  pub fn is_rowid_alias(&self, ordinal: usize) -> bool {
    self.columns.get(ordinal).map_or(false, ColumnDef::is_rowid_alias)
  }
}

impl Catalog {
  pub fn load(pager: &Pager) -> Result<Catalog> {
    let mut catalog = Catalog::default();

    for row in TableScan::full(pager, SCHEMA_ROOT_PAGE) {
      let row = row?;
      match text_column(&row, 0, "object type")? {
        "table" => {
          let name = text_column(&row, 1, "object name")?.to_string();
          let root_page = root_page_column(&row)?;
          let sql = text_column(&row, 4, "table DDL")?;
          let parsed = parse_create_table(sql)
            .map_err(|e| Error::format(format!("cannot parse DDL of table {name}: {e}")))?;
          catalog.tables.push(TableSchema { name, root_page, columns: parsed.columns });
        }
        "index" => {
          // Automatic indexes (UNIQUE constraints, sqlite_autoindex_*) store
          // no DDL; they have no named column to match against.
          if row.values.get(4).map_or(true, Value::is_null) {
            continue;
          }
          let name = text_column(&row, 1, "object name")?.to_string();
          let root_page = root_page_column(&row)?;
          let sql = text_column(&row, 4, "index DDL")?;
          let parsed = parse_create_index(sql)
            .map_err(|e| Error::format(format!("cannot parse DDL of index {name}: {e}")))?;
          catalog.indexes.push(IndexSchema {
            name,
            table_name: parsed.table_name,
            column: parsed.column,
            root_page,
          });
        }
        // Views and triggers are not queryable by this engine.
        _ => {}
      }
    }

    Ok(catalog)
  }

  pub fn table(&self, name: &str) -> Option<&TableSchema> {
    self
      .tables
      .iter()
      .find(|table| table.name.eq_ignore_ascii_case(name))
  }

  /// A single-column index usable to accelerate `WHERE column = literal`.
  pub fn index_on(&self, table_name: &str, column: &str) -> Option<&IndexSchema> {
    self.indexes.iter().find(|index| {
      index.table_name.eq_ignore_ascii_case(table_name) && index.column.eq_ignore_ascii_case(column)
    })
  }

  /// Table names in schema order, internal bookkeeping tables excluded.
  pub fn table_names(&self) -> Vec<String> {
    self
      .tables
      .iter()
      .map(|table| table.name.clone())
      .filter(|name| !INTERNAL_TABLES.contains(&name.as_str()))
      .collect()
  }
}

fn text_column<'a>(row: &'a TableRow, ordinal: usize, what: &str) -> Result<&'a str> {
  row
    .values
    .get(ordinal)
    .and_then(Value::as_text)
    .ok_or_else(|| Error::format(format!("schema row {} has no text {what}", row.row_id)))
}

fn root_page_column(row: &TableRow) -> Result<u32> {
  let root = row
    .values
    .get(3)
    .and_then(Value::as_integer)
    .ok_or_else(|| Error::format(format!("schema row {} has no root page", row.row_id)))?;
  u32::try_from(root)
    .map_err(|_| Error::format(format!("schema row {} root page {root} out of range", row.row_id)))
}
