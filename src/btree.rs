use std::cmp::Ordering;
use std::collections::{HashSet, VecDeque};

use crate::error::{Error, Result};
use crate::page::cell::{IndexEntry, IndexInteriorEntry, TableInteriorEntry, TableRow};
use crate::page::BtreePage;
use crate::pager::Pager;
use crate::record::Value;

/// Depth-first, in-order walk of a table b-tree, yielding rows in ascending
/// rowid order.
///
/// The scan is pull-based: pages are fetched only as the caller consumes rows,
/// so stopping early simply stops reading. Interior pages yield nothing; their
/// children are visited in cell-pointer order with the right pointer last,
/// which is exactly rowid order because the cell pointer array is sorted.
///
/// A filtered scan prunes interior subtrees that cannot contain any target
/// rowid. Pruning over-includes (the right pointer is always descended, and a
/// candidate subtree may hold non-target rows), so callers must still check
/// yielded rows against the target set.
pub struct TableScan<'a> {
  pager: &'a Pager,
  /// Pages still to visit; the top of the stack is visited next.
  stack: Vec<u32>,
  rows: VecDeque<TableRow>,
  filter: Option<Vec<u64>>,
  failed: bool,
}

impl<'a> TableScan<'a> {
  pub fn full(pager: &'a Pager, root: u32) -> Self {
    Self { pager, stack: vec![root], rows: VecDeque::new(), filter: None, failed: false }
  }

  pub fn filtered(pager: &'a Pager, root: u32, target_row_ids: Vec<u64>) -> Self {
    Self {
      pager,
      stack: vec![root],
      rows: VecDeque::new(),
      filter: Some(target_row_ids),
      failed: false,
    }
  }

  fn descend(&mut self, entries: &[TableInteriorEntry], right_child: u32) {
    // The right pointer covers rowids beyond every entry, so it is always a
    // candidate. Push it first: the stack pops in reverse.
    self.stack.push(right_child);

    let limit = match &self.filter {
      None => entries.len(),
      Some(targets) => prune_limit(entries, targets),
    };
    for entry in entries[..limit].iter().rev() {
      self.stack.push(entry.child);
    }
  }
}

/// Number of leading interior entries worth descending into: for each target,
/// binary search the ascending max-rowid sequence for the first entry that
/// could hold it, and keep everything up to the furthest such entry. Targets
/// beyond every entry (and an empty target set) keep no entries; those rowids
/// can only live under the right pointer.
fn prune_limit(entries: &[TableInteriorEntry], targets: &[u64]) -> usize {
  targets
    .iter()
    .filter_map(|&target| {
      let i = entries.partition_point(|entry| entry.max_row_id < target);
      (i < entries.len()).then_some(i)
    })
    .max()
    .map_or(0, |i| i + 1)
}

impl Iterator for TableScan<'_> {
  type Item = Result<TableRow>;

  fn next(&mut self) -> Option<Self::Item> {
    if self.failed {
      return None;
    }
    loop {
      if let Some(row) = self.rows.pop_front() {
        return Some(Ok(row));
      }
      let page_number = self.stack.pop()?;
      let decoded = self
        .pager
        .read_page(page_number)
        .and_then(|page| BtreePage::decode(&page));
      let page = match decoded {
        Ok(page) => page,
        Err(e) => {
          // Tree integrity is gone; abort the whole scan.
          self.failed = true;
          return Some(Err(e));
        }
      };
      match page {
        BtreePage::TableLeaf { rows } => self.rows.extend(rows),
        BtreePage::TableInterior { entries, right_child } => self.descend(&entries, right_child),
        BtreePage::IndexLeaf { .. } | BtreePage::IndexInterior { .. } => {
          self.failed = true;
          return Some(Err(Error::format(format!(
            "page {page_number} is an index page inside a table tree"
          ))));
        }
      }
    }
  }
}

/// Collects the rowids of every index entry equal to `key`, anywhere in the
/// tree rooted at `root`.
///
/// Interior entries are real index rows, so they are matched too, and because
/// duplicate keys can span several children the search descends every child
/// from the first entry with key >= the search key through the right pointer.
/// That over-approximates the candidate set; the caller re-verifies matches
/// against the table anyway. The visited set is an idempotence guard, not a
/// cycle breaker: the format guarantees the tree is acyclic.
pub fn index_search(pager: &Pager, root: u32, key: &Value) -> Result<Vec<u64>> {
  let mut visited = HashSet::new();
  let mut row_ids = Vec::new();
  index_search_page(pager, root, key, &mut visited, &mut row_ids)?;
  Ok(row_ids)
}

fn index_search_page(
  pager: &Pager,
  page_number: u32,
  key: &Value,
  visited: &mut HashSet<u32>,
  row_ids: &mut Vec<u64>,
) -> Result<()> {
  if !visited.insert(page_number) {
    return Ok(());
  }

  let page = BtreePage::decode(&pager.read_page(page_number)?)?;
  match page {
    BtreePage::IndexLeaf { entries } => {
      collect_equal(entries.iter(), key, row_ids);
      Ok(())
    }
    BtreePage::IndexInterior { entries, right_child } => {
      collect_equal(entries.iter().map(|e| &e.entry), key, row_ids);

      let first_candidate = entries
        .partition_point(|entry| entry.entry.key.key_cmp(key) == Ordering::Less);
      for IndexInteriorEntry { left_child, .. } in &entries[first_candidate..] {
        index_search_page(pager, *left_child, key, visited, row_ids)?;
      }
      index_search_page(pager, right_child, key, visited, row_ids)
    }
    BtreePage::TableLeaf { .. } | BtreePage::TableInterior { .. } => Err(Error::format(format!(
      "page {page_number} is a table page inside an index tree"
    ))),
  }
}

fn collect_equal<'a>(
  entries: impl Iterator<Item = &'a IndexEntry>,
  key: &Value,
  row_ids: &mut Vec<u64>,
) {
  for entry in entries {
    if entry.key.key_cmp(key) == Ordering::Equal {
      row_ids.push(entry.row_id);
    }
  }
}
