pub mod cell;
pub mod raw;

use cell::{IndexEntry, IndexInteriorEntry, TableInteriorEntry, TableRow};
use raw::RawPage;

use crate::error::{Error, Result};

/// The b-tree algorithm provides key/data storage with unique and ordered keys
/// on page-oriented storage devices. Two variants of b-trees are used by
/// SQLite: "table b-trees" use a 64-bit signed integer key (the rowid) and
/// store all data in the leaves; "index b-trees" use arbitrary keys and store
/// no data at all.
///
/// A b-tree page is divided into regions in the following order:
///   1. The 100-byte database file header (found on page 1 only)
///   2. The 8 or 12 byte b-tree page header
///   3. The cell pointer array
///   4. Unallocated space
///   5. The cell content area
///   6. The reserved region.
///
/// +------+----+--------------------------------------------------------------------------+
/// |Offset|Size|Description                                                               |
/// +------+----+--------------------------------------------------------------------------+
/// |0     |1   |The b-tree page type: 2 interior index, 5 interior table, 10 leaf index,  |
/// |      |    |13 leaf table. Any other value is an error.                               |
/// |3     |2   |The number of cells on the page.                                          |
/// |8     |4   |The right-most child pointer. Interior b-tree pages only.                 |
/// +------+----+--------------------------------------------------------------------------+
///
/// The cell pointer array follows the header: `cell_count` 2-byte offsets from
/// the start of the page, in key order (ascending rowid for table pages,
/// ascending key for index pages). That ordering is trusted, not re-validated;
/// every binary search below depends on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageKind {
  TableLeaf,
  TableInterior,
  IndexLeaf,
  IndexInterior,
}

impl PageKind {
  pub fn from_byte(byte: u8) -> Result<Self> {
    match byte {
      13 => Ok(PageKind::TableLeaf),
      5 => Ok(PageKind::TableInterior),
      10 => Ok(PageKind::IndexLeaf),
      2 => Ok(PageKind::IndexInterior),
      other => Err(Error::format(format!("unexpected page kind {other:#04x}"))),
    }
  }

  pub fn is_interior(self) -> bool {
    matches!(self, PageKind::TableInterior | PageKind::IndexInterior)
  }
}

#[derive(Debug, Clone, Copy)]
pub struct PageHeader {
  pub kind: PageKind,
  pub cell_count: u16,
  /// Right-most child pointer; present on interior pages only.
  pub right_pointer: Option<u32>,
}

impl PageHeader {
  pub fn parse(page: &RawPage) -> Result<Self> {
    let base = page.header_offset();
    let kind = PageKind::from_byte(page.read_u8(base)?)?;
    let cell_count = page.read_u16(base + 3)?;
    let right_pointer = if kind.is_interior() {
      Some(page.read_u32(base + 8)?)
    } else {
      None
    };
    Ok(Self { kind, cell_count, right_pointer })
  }
}

/// A fully decoded b-tree page: one of the four page shapes, with its cells
/// decoded into typed entries at construction time. Immutable thereafter.
#[derive(Debug, Clone)]
pub enum BtreePage {
  TableLeaf { rows: Vec<TableRow> },
  TableInterior { entries: Vec<TableInteriorEntry>, right_child: u32 },
  IndexLeaf { entries: Vec<IndexEntry> },
  IndexInterior { entries: Vec<IndexInteriorEntry>, right_child: u32 },
}

impl BtreePage {
  pub fn decode(page: &RawPage) -> Result<Self> {
    let header = PageHeader::parse(page)?;
    let pointers = cell::cell_pointers(page, &header)?;

    match header.kind {
      PageKind::TableLeaf => {
        let rows = pointers
          .iter()
          .map(|&offset| cell::table_leaf(page, offset))
          .collect::<Result<_>>()?;
        Ok(BtreePage::TableLeaf { rows })
      }
      PageKind::TableInterior => {
        let entries = pointers
          .iter()
          .map(|&offset| cell::table_interior(page, offset))
          .collect::<Result<_>>()?;
        let right_child = header
          .right_pointer
          .ok_or_else(|| Error::format("interior page without right pointer"))?;
        Ok(BtreePage::TableInterior { entries, right_child })
      }
      PageKind::IndexLeaf => {
        let entries = pointers
          .iter()
          .map(|&offset| cell::index_leaf(page, offset))
          .collect::<Result<_>>()?;
        Ok(BtreePage::IndexLeaf { entries })
      }
      PageKind::IndexInterior => {
        let entries = pointers
          .iter()
          .map(|&offset| cell::index_interior(page, offset))
          .collect::<Result<_>>()?;
        let right_child = header
          .right_pointer
          .ok_or_else(|| Error::format("interior page without right pointer"))?;
        Ok(BtreePage::IndexInterior { entries, right_child })
      }
    }
  }
}
