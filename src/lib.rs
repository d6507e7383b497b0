//! Read-only engine for the SQLite database file format.
//!
//! Opens a database file and answers schema introspection, row counting, and
//! simple projected/filtered SELECT queries, optionally accelerated by a
//! single-column secondary index. There is no write path: pages are immutable
//! projections of file bytes, re-read on demand through positioned reads.

use std::cell::OnceCell;
use std::cmp::Ordering;
use std::collections::HashSet;
use std::fs::File;
use std::os::unix::fs::FileExt;
use std::path::Path;

pub mod btree;
pub mod error;
pub mod header;
pub mod page;
pub mod pager;
pub mod parser;
pub mod record;
pub mod schema;
pub mod varint;

use btree::TableScan;
use header::{DbHeader, HEADER_SIZE};
use pager::Pager;
use parser::select::{Condition, Literal, Projection, SelectStatement};
use schema::{Catalog, TableSchema, SCHEMA_ROOT_PAGE};

pub use error::{Error, Result};
pub use record::Value;

/// An open database file: the page store plus the lazily built schema
/// catalog. One handle serves any number of sequential queries.
pub struct Database {
  pager: Pager,
  header: DbHeader,
  catalog: OnceCell<Catalog>,
}

/// The `.dbinfo` answer, read from fixed file offsets: the page size at byte
/// 16 and the schema entry count at byte 103 (page 1's cell count, 3 bytes
/// into the b-tree header that follows the 100-byte file header).
#[derive(Debug, Clone, Copy)]
pub struct DbInfo {
  pub page_size: u32,
  pub schema_entry_count: u16,
}

#[derive(Debug, PartialEq)]
pub enum QueryOutput {
  Count(usize),
  Rows(Vec<Vec<Value>>),
}

impl Database {
  pub fn open(path: impl AsRef<Path>) -> Result<Self> {
    let file = File::open(path)?;
    let mut bytes = [0u8; HEADER_SIZE];
    file.read_exact_at(&mut bytes, 0)?;
    let header = DbHeader::try_from(&bytes)?;

    Ok(Self {
      pager: Pager::new(file, header.page_size),
      header,
      catalog: OnceCell::new(),
    })
  }

  pub fn page_size(&self) -> u32 {
    self.header.page_size
  }

  pub fn info(&self) -> Result<DbInfo> {
    let page1 = self.pager.read_page(SCHEMA_ROOT_PAGE)?;
    let schema_entry_count = page1.read_u16(100 + 3)?;
    Ok(DbInfo { page_size: self.header.page_size, schema_entry_count })
  }

  /// Table names in schema order, excluding internal bookkeeping tables.
  pub fn tables(&self) -> Result<Vec<String>> {
    Ok(self.catalog()?.table_names())
  }

  /// Runs one of the two recognized query shapes against the file.
  pub fn query(&self, sql: &str) -> Result<QueryOutput> {
    let statement =
      parser::select::parse(sql).map_err(|report| Error::query(report.to_string()))?;
    self.execute(&statement)
  }

  pub fn execute(&self, statement: &SelectStatement) -> Result<QueryOutput> {
    let catalog = self.catalog()?;
    let table = catalog
      .table(&statement.table)
      .ok_or_else(|| Error::query(format!("unknown table: {}", statement.table)))?;

    match &statement.projection {
      Projection::Count => {
        let mut count = 0;
        for row in TableScan::full(&self.pager, table.root_page) {
          row?;
          count += 1;
        }
        Ok(QueryOutput::Count(count))
      }
      Projection::Columns(names) => {
        let ordinals = names
          .iter()
          .map(|name| column_ordinal(table, name))
          .collect::<Result<Vec<_>>>()?;

        let rows = match &statement.where_clause {
          None => {
            project(TableScan::full(&self.pager, table.root_page), &ordinals, None, None)?
          }
          Some(condition) => self.filtered_rows(catalog, table, condition, &ordinals)?,
        };
        Ok(QueryOutput::Rows(rows))
      }
    }
  }

  /// `WHERE column = literal`: index-assisted when a matching single-column
  /// index exists, a pruned rowid lookup when the column aliases the rowid,
  /// otherwise a full scan with the predicate applied to each decoded row.
  /// Both pruned paths only narrow the candidate rows; equality is re-checked
  /// against the decoded table row either way.
  fn filtered_rows(
    &self,
    catalog: &Catalog,
    table: &TableSchema,
    condition: &Condition,
    ordinals: &[usize],
  ) -> Result<Vec<Vec<Value>>> {
    let ordinal = column_ordinal(table, &condition.column)?;
    let needle = literal_value(&condition.value);
    let predicate = Some((ordinal, &needle));

    if let Some(index) = catalog.index_on(&table.name, &condition.column) {
      let row_ids = btree::index_search(&self.pager, index.root_page, &needle)?;
      let allowed: HashSet<u64> = row_ids.iter().copied().collect();
      let scan = TableScan::filtered(&self.pager, table.root_page, row_ids);
      return project(scan, ordinals, predicate, Some(&allowed));
    }

    if table.is_rowid_alias(ordinal) {
      if let Value::Integer(id) = &needle {
        if let Ok(target) = u64::try_from(*id) {
          let scan = TableScan::filtered(&self.pager, table.root_page, vec![target]);
          return project(scan, ordinals, predicate, None);
        }
        // Rowids are positive; a negative literal matches nothing.
        return Ok(Vec::new());
      }
    }

    project(TableScan::full(&self.pager, table.root_page), ordinals, predicate, None)
  }

  fn catalog(&self) -> Result<&Catalog> {
    if let Some(catalog) = self.catalog.get() {
      return Ok(catalog);
    }
    let catalog = Catalog::load(&self.pager)?;
    Ok(self.catalog.get_or_init(|| catalog))
  }
}

fn column_ordinal(table: &TableSchema, name: &str) -> Result<usize> {
  table
    .column_ordinal(name)
    .ok_or_else(|| Error::query(format!("unknown column: {name}")))
}

fn literal_value(literal: &Literal) -> Value {
  match literal {
    Literal::Integer(i) => Value::Integer(*i),
    Literal::Real(r) => Value::Real(*r),
    Literal::Text(t) => Value::Text(t.clone()),
  }
}

/// Drains a scan into projected rows. `allowed` restricts by rowid membership
/// (the filtered scan over-includes by design); `predicate` re-checks column
/// equality on the decoded values.
fn project(
  scan: TableScan,
  ordinals: &[usize],
  predicate: Option<(usize, &Value)>,
  allowed: Option<&HashSet<u64>>,
) -> Result<Vec<Vec<Value>>> {
  let mut rows = Vec::new();
  for row in scan {
    let row = row?;
    if let Some(ids) = allowed {
      if !ids.contains(&row.row_id) {
        continue;
      }
    }
    if let Some((ordinal, value)) = predicate {
      let hit = row
        .values
        .get(ordinal)
        .map_or(false, |v| v.key_cmp(value) == Ordering::Equal);
      if !hit {
        continue;
      }
    }
    rows.push(
      ordinals
        .iter()
        .map(|&i| row.values.get(i).cloned().unwrap_or(Value::Null))
        .collect(),
    );
  }
  Ok(rows)
}
