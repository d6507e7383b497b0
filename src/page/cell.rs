use super::raw::RawPage;
use super::PageHeader;
use crate::error::{Error, Result};
use crate::record::{Record, Value};

/// Table B-Tree Leaf Cell (header 0x0d):
///
/// ```text
///         A varint which is the total number of bytes of payload, including any overflow
///         A varint which is the integer key, a.k.a. "rowid"
///         The initial portion of the payload that does not spill to overflow pages.
///         A 4-byte big-endian page number for the first page of the overflow page list -
///         omitted if all payload fits on the b-tree page.
/// ```
///
/// Table B-Tree Interior Cell (header 0x05):
///
/// ```text
///         A 4-byte big-endian page number which is the left child pointer.
///         A varint which is the integer key
/// ```
///
/// Index B-Tree Leaf Cell (header 0x0a):
///
/// ```text
///         A varint which is the total number of bytes of key payload, including any overflow
///         The initial portion of the payload that does not spill to overflow pages.
///         A 4-byte big-endian page number for the first page of the overflow page list -
///         omitted if all payload fits on the b-tree page.
/// ```
///
/// Index B-Tree Interior Cell (header 0x02):
///
/// ```text
///         A 4-byte big-endian page number which is the left child pointer.
///         A varint which is the total number of bytes of key payload, including any overflow
///         The initial portion of the payload that does not spill to overflow pages.
///         A 4-byte big-endian page number for the first page of the overflow page list -
///         omitted if all payload fits on the b-tree page.
/// ```
///
/// Index payloads are records whose columns are the indexed key columns
/// followed by the rowid of the indexed table row.
#[derive(Debug, Clone, PartialEq)]
pub struct TableRow {
  pub row_id: u64,
  pub values: Vec<Value>,
}

/// Routing entry of a table interior page: `child` holds every rowid less
/// than or equal to `max_row_id`. Rowids beyond the last entry live under the
/// page's right pointer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableInteriorEntry {
  pub child: u32,
  pub max_row_id: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IndexEntry {
  pub key: Value,
  pub row_id: u64,
  /// First overflow page of a spilled payload. Recorded but never followed.
  pub overflow_page: Option<u32>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IndexInteriorEntry {
  pub left_child: u32,
  pub entry: IndexEntry,
}

macro_rules! read_varint_and_advance {
  ($page:expr, $offset:expr) => {{
    let (value, size) = $page.read_varint($offset)?;
    $offset += size;
    value
  }};
}

/// Reads the cell pointer array: `cell_count` 2-byte offsets starting just
/// past the page header (8 bytes for leaf pages, 12 for interior pages, after
/// the 100-byte file header on page 1).
pub fn cell_pointers(page: &RawPage, header: &PageHeader) -> Result<Vec<usize>> {
  let header_size = if header.kind.is_interior() { 12 } else { 8 };
  let array_start = page.header_offset() + header_size;

  (0..header.cell_count as usize)
    .map(|i| Ok(page.read_u16(array_start + 2 * i)? as usize))
    .collect()
}

pub fn table_leaf(page: &RawPage, offset: usize) -> Result<TableRow> {
  let mut offset = offset;
  let _payload_size = read_varint_and_advance!(page, offset);
  let row_id = read_varint_and_advance!(page, offset);

  let (record, _) = Record::parse(page.tail(offset)?)?;
  let mut values = record.values;
  // Integer-primary-key quirk: the key column stores no value; the rowid
  // stands in for it.
  if let Some(first) = values.first_mut() {
    if first.is_null() {
      *first = Value::Integer(row_id as i64);
    }
  }

  Ok(TableRow { row_id, values })
}

pub fn table_interior(page: &RawPage, offset: usize) -> Result<TableInteriorEntry> {
  let child = page.read_u32(offset)?;
  let (max_row_id, _) = page.read_varint(offset + 4)?;

  Ok(TableInteriorEntry { child, max_row_id })
}

pub fn index_leaf(page: &RawPage, offset: usize) -> Result<IndexEntry> {
  let mut offset = offset;
  let payload_size = read_varint_and_advance!(page, offset);
  index_payload(page, offset, payload_size)
}

pub fn index_interior(page: &RawPage, offset: usize) -> Result<IndexInteriorEntry> {
  let mut offset = offset;
  let left_child = page.read_u32(offset)?;
  offset += 4;
  let payload_size = read_varint_and_advance!(page, offset);
  let entry = index_payload(page, offset, payload_size)?;

  Ok(IndexInteriorEntry { left_child, entry })
}

/// Decodes an index record body at `offset` into (key, rowid). The record's
/// trailing column is the rowid; the column before it is the (single) indexed
/// key. A payload declared longer than what the record consumed locally
/// carries a 4-byte overflow page number after the local portion.
fn index_payload(page: &RawPage, offset: usize, payload_size: u64) -> Result<IndexEntry> {
  let (record, consumed) = Record::parse(page.tail(offset)?)?;

  let mut values = record.values;
  if values.len() < 2 {
    return Err(Error::format(format!(
      "index record has {} column(s), need key and rowid",
      values.len()
    )));
  }
  let row_id = match values.pop() {
    Some(Value::Integer(id)) if id >= 0 => id as u64,
    other => return Err(Error::format(format!("index record rowid is {other:?}"))),
  };
  let key = values.swap_remove(0);

  let overflow_page = if (payload_size as usize) > consumed {
    page.read_u32(offset + consumed).ok().filter(|&p| p != 0)
  } else {
    None
  };

  Ok(IndexEntry { key, row_id, overflow_page })
}
