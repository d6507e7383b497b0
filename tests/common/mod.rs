//! Builds small but well-formed database files so traversal and query tests
//! run against the real on-disk layout: 100-byte file header, b-tree page
//! headers, cell pointer arrays, varint-framed cells, and record bodies.
#![allow(dead_code)]

use std::io::Write;

use litescan::record::Value;
use litescan::varint;
use tempfile::NamedTempFile;

pub const PAGE_SIZE: usize = 512;

/// Picks a serial type for a value and encodes its body bytes.
fn serial_and_body(value: &Value) -> (u64, Vec<u8>) {
  match value {
    Value::Null => (0, vec![]),
    Value::Zero => (8, vec![]),
    Value::One => (9, vec![]),
    Value::Integer(i) => {
      if let Ok(b) = i8::try_from(*i) {
        (1, vec![b as u8])
      } else if let Ok(s) = i16::try_from(*i) {
        (2, s.to_be_bytes().to_vec())
      } else if let Ok(w) = i32::try_from(*i) {
        (4, w.to_be_bytes().to_vec())
      } else {
        (6, i.to_be_bytes().to_vec())
      }
    }
    Value::Real(r) => (7, r.to_be_bytes().to_vec()),
    Value::Text(t) => (13 + 2 * t.len() as u64, t.as_bytes().to_vec()),
    Value::Blob(b) => (12 + 2 * b.len() as u64, b.clone()),
  }
}

/// Record format: header-length varint, serial-type varints, value bodies.
pub fn record(values: &[Value]) -> Vec<u8> {
  let mut serials = Vec::new();
  let mut body = Vec::new();
  for value in values {
    let (serial, bytes) = serial_and_body(value);
    serials.extend(varint::encode(serial));
    body.extend(bytes);
  }
  let header_len = serials.len() + 1;
  assert!(header_len < 0x80, "test records keep a one-byte header length");

  let mut out = vec![header_len as u8];
  out.extend(serials);
  out.extend(body);
  out
}

/// Assembles a page: b-tree header at `header_offset`, cell pointer array
/// after it, cell bodies packed against the end of the page. Pointer array
/// order equals `cells` order, which must already be key order.
fn page_with_cells(
  kind: u8,
  header_offset: usize,
  right_pointer: Option<u32>,
  cells: &[Vec<u8>],
) -> Vec<u8> {
  let mut page = vec![0u8; PAGE_SIZE];
  let base = header_offset;
  page[base] = kind;
  page[base + 3..base + 5].copy_from_slice(&(cells.len() as u16).to_be_bytes());

  let mut pointer_offset = base + 8;
  if let Some(right) = right_pointer {
    page[base + 8..base + 12].copy_from_slice(&right.to_be_bytes());
    pointer_offset = base + 12;
  }

  let mut content_start = PAGE_SIZE;
  for (i, cell) in cells.iter().enumerate() {
    content_start -= cell.len();
    page[content_start..content_start + cell.len()].copy_from_slice(cell);
    let slot = pointer_offset + 2 * i;
    page[slot..slot + 2].copy_from_slice(&(content_start as u16).to_be_bytes());
  }
  page[base + 5..base + 7].copy_from_slice(&(content_start as u16).to_be_bytes());

  assert!(
    pointer_offset + 2 * cells.len() <= content_start,
    "page overflow: cells collide with pointer array"
  );
  page
}

pub fn table_leaf_page(rows: &[(u64, Vec<Value>)]) -> Vec<u8> {
  let cells: Vec<Vec<u8>> = rows
    .iter()
    .map(|(row_id, values)| {
      let body = record(values);
      let mut cell = varint::encode(body.len() as u64);
      cell.extend(varint::encode(*row_id));
      cell.extend(body);
      cell
    })
    .collect();
  page_with_cells(13, 0, None, &cells)
}

pub fn table_interior_page(entries: &[(u32, u64)], right_pointer: u32) -> Vec<u8> {
  let cells: Vec<Vec<u8>> = entries
    .iter()
    .map(|(child, max_row_id)| {
      let mut cell = child.to_be_bytes().to_vec();
      cell.extend(varint::encode(*max_row_id));
      cell
    })
    .collect();
  page_with_cells(5, 0, Some(right_pointer), &cells)
}

fn index_record(key: &Value, row_id: u64) -> Vec<u8> {
  record(&[key.clone(), Value::Integer(row_id as i64)])
}

pub fn index_leaf_page(entries: &[(Value, u64)]) -> Vec<u8> {
  let cells: Vec<Vec<u8>> = entries
    .iter()
    .map(|(key, row_id)| {
      let body = index_record(key, *row_id);
      let mut cell = varint::encode(body.len() as u64);
      cell.extend(body);
      cell
    })
    .collect();
  page_with_cells(10, 0, None, &cells)
}

pub fn index_interior_page(entries: &[(u32, Value, u64)], right_pointer: u32) -> Vec<u8> {
  let cells: Vec<Vec<u8>> = entries
    .iter()
    .map(|(child, key, row_id)| {
      let body = index_record(key, *row_id);
      let mut cell = child.to_be_bytes().to_vec();
      cell.extend(varint::encode(body.len() as u64));
      cell.extend(body);
      cell
    })
    .collect();
  page_with_cells(2, 0, Some(right_pointer), &cells)
}

/// One row of the schema table: (type, name, tbl_name, rootpage, sql).
pub struct SchemaEntry {
  pub kind: &'static str,
  pub name: String,
  pub table_name: String,
  pub root_page: u32,
  pub sql: Option<String>,
}

pub fn table_entry(name: &str, root_page: u32, sql: &str) -> SchemaEntry {
  SchemaEntry {
    kind: "table",
    name: name.to_string(),
    table_name: name.to_string(),
    root_page,
    sql: Some(sql.to_string()),
  }
}

pub fn index_entry(name: &str, table_name: &str, root_page: u32, sql: &str) -> SchemaEntry {
  SchemaEntry {
    kind: "index",
    name: name.to_string(),
    table_name: table_name.to_string(),
    root_page,
    sql: Some(sql.to_string()),
  }
}

pub struct TestDb {
  pages: Vec<Vec<u8>>,
}

impl TestDb {
  pub fn new() -> Self {
    // Page 1 is reserved for the schema; filled in by `set_schema`.
    Self { pages: vec![vec![0u8; PAGE_SIZE]] }
  }

  /// Appends a page and returns its 1-based page number.
  pub fn add_page(&mut self, page: Vec<u8>) -> u32 {
    self.pages.push(page);
    self.pages.len() as u32
  }

  pub fn set_schema(&mut self, entries: &[SchemaEntry]) {
    let cells: Vec<Vec<u8>> = entries
      .iter()
      .enumerate()
      .map(|(i, entry)| {
        let values = vec![
          Value::Text(entry.kind.to_string()),
          Value::Text(entry.name.clone()),
          Value::Text(entry.table_name.clone()),
          Value::Integer(entry.root_page as i64),
          entry.sql.clone().map_or(Value::Null, Value::Text),
        ];
        let body = record(&values);
        let mut cell = varint::encode(body.len() as u64);
        cell.extend(varint::encode(i as u64 + 1));
        cell.extend(body);
        cell
      })
      .collect();

    let mut page = page_with_cells(13, 100, None, &cells);
    write_file_header(&mut page, self.pages.len() as u32);
    self.pages[0] = page;
  }

  pub fn into_file(self) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("create temp database file");
    for page in &self.pages {
      file.write_all(page).expect("write page");
    }
    file.flush().expect("flush database file");
    file
  }
}

fn write_file_header(page1: &mut [u8], database_size: u32) {
  page1[0..16].copy_from_slice(b"SQLite format 3\0");
  page1[16..18].copy_from_slice(&(PAGE_SIZE as u16).to_be_bytes());
  page1[18] = 1; // write version
  page1[19] = 1; // read version
  page1[21] = 64;
  page1[22] = 32;
  page1[23] = 32;
  page1[28..32].copy_from_slice(&database_size.to_be_bytes());
  page1[56..60].copy_from_slice(&1u32.to_be_bytes()); // UTF-8
}

pub fn text(s: &str) -> Value {
  Value::Text(s.to_string())
}
