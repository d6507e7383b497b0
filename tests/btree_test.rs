mod common;

use std::collections::HashSet;
use std::fs::File;

use common::*;
use litescan::btree::{index_search, TableScan};
use litescan::error::Error;
use litescan::pager::Pager;
use litescan::record::Value;

/// A three-leaf table tree: rowids 1..=3, 4..=6 under interior entries,
/// 7..=9 under the right pointer.
fn three_leaf_table() -> (Fixture, u32) {
  let mut db = TestDb::new();
  let leaf_a = db.add_page(table_leaf_page(&[
    (1, vec![Value::Integer(1), text("a")]),
    (2, vec![Value::Integer(2), text("b")]),
    (3, vec![Value::Integer(3), text("c")]),
  ]));
  let leaf_b = db.add_page(table_leaf_page(&[
    (4, vec![Value::Integer(4), text("d")]),
    (5, vec![Value::Integer(5), text("e")]),
    (6, vec![Value::Integer(6), text("f")]),
  ]));
  let leaf_c = db.add_page(table_leaf_page(&[
    (7, vec![Value::Integer(7), text("g")]),
    (8, vec![Value::Integer(8), text("h")]),
    (9, vec![Value::Integer(9), text("i")]),
  ]));
  let root = db.add_page(table_interior_page(&[(leaf_a, 3), (leaf_b, 6)], leaf_c));
  db.set_schema(&[]);
  (open_pager(db), root)
}

struct Fixture {
  pager: Pager,
  // Keeps the temp file alive for as long as the pager reads from it.
  _file: tempfile::NamedTempFile,
}

fn open_pager(db: TestDb) -> Fixture {
  let file = db.into_file();
  let pager = Pager::new(File::open(file.path()).unwrap(), PAGE_SIZE as u32);
  Fixture { pager, _file: file }
}

fn scanned_row_ids(scan: TableScan) -> Vec<u64> {
  scan.map(|row| row.unwrap().row_id).collect()
}

#[test]
fn full_scan_yields_every_row_in_ascending_order() {
  let (db, root) = three_leaf_table();
  let row_ids = scanned_row_ids(TableScan::full(&db.pager, root));
  assert_eq!(row_ids, (1..=9).collect::<Vec<_>>());
}

#[test]
fn full_scan_is_restartable() {
  let (db, root) = three_leaf_table();
  let first = scanned_row_ids(TableScan::full(&db.pager, root));
  let second = scanned_row_ids(TableScan::full(&db.pager, root));
  assert_eq!(first, second);
}

#[test]
fn scan_stops_when_caller_stops_pulling() {
  let (db, root) = three_leaf_table();
  let mut scan = TableScan::full(&db.pager, root);
  assert_eq!(scan.next().unwrap().unwrap().row_id, 1);
  assert_eq!(scan.next().unwrap().unwrap().row_id, 2);
  // Dropping the scan here is the only cancellation mechanism there is.
}

#[test]
fn filtered_scan_output_is_superset_of_targets_and_subset_of_full_scan() {
  let (db, root) = three_leaf_table();
  let full: HashSet<u64> = scanned_row_ids(TableScan::full(&db.pager, root)).into_iter().collect();

  for targets in [vec![2u64, 8], vec![1], vec![6], vec![9], vec![1, 5, 9]] {
    let yielded: HashSet<u64> =
      scanned_row_ids(TableScan::filtered(&db.pager, root, targets.clone()))
        .into_iter()
        .collect();
    for target in &targets {
      assert!(yielded.contains(target), "targets {targets:?} missing {target}");
    }
    assert!(yielded.is_subset(&full), "targets {targets:?} yielded {yielded:?}");
  }
}

#[test]
fn filtered_scan_with_empty_targets_visits_only_the_right_spine() {
  let (db, root) = three_leaf_table();
  let row_ids = scanned_row_ids(TableScan::filtered(&db.pager, root, vec![]));
  // No interior entry survives pruning; the right pointer is still descended.
  assert_eq!(row_ids, vec![7, 8, 9]);
}

#[test]
fn filtered_scan_with_targets_beyond_every_entry_still_reaches_right_pointer() {
  let (db, root) = three_leaf_table();
  let row_ids = scanned_row_ids(TableScan::filtered(&db.pager, root, vec![8, 100]));
  assert_eq!(row_ids, vec![7, 8, 9]);
}

#[test]
fn scan_aborts_on_malformed_page_kind() {
  let mut db = TestDb::new();
  let mut bogus = vec![0u8; PAGE_SIZE];
  bogus[0] = 7; // not a b-tree page kind
  let root = db.add_page(bogus);
  db.set_schema(&[]);
  let db = open_pager(db);

  let mut scan = TableScan::full(&db.pager, root);
  let err = scan.next().unwrap().unwrap_err();
  assert!(matches!(err, Error::Format(_)));
  assert!(scan.next().is_none(), "scan must stop after a decode error");
}

#[test]
fn scan_rejects_index_page_in_table_tree() {
  let mut db = TestDb::new();
  let root = db.add_page(index_leaf_page(&[(text("a"), 1)]));
  db.set_schema(&[]);
  let db = open_pager(db);

  let err = TableScan::full(&db.pager, root).next().unwrap().unwrap_err();
  assert!(matches!(err, Error::Format(_)));
}

/// Index tree with the key "b" spread across a leaf, an interior entry, and
/// another leaf: equality search must find all of them.
fn duplicate_key_index() -> (Fixture, u32) {
  let mut db = TestDb::new();
  let leaf_a = db.add_page(index_leaf_page(&[(text("a"), 1), (text("b"), 2)]));
  let leaf_b = db.add_page(index_leaf_page(&[(text("b"), 4), (text("c"), 5)]));
  let root = db.add_page(index_interior_page(&[(leaf_a, text("b"), 3)], leaf_b));
  db.set_schema(&[]);
  (open_pager(db), root)
}

#[test]
fn index_search_finds_duplicates_across_pages() {
  let (db, root) = duplicate_key_index();
  let mut row_ids = index_search(&db.pager, root, &text("b")).unwrap();
  row_ids.sort_unstable();
  assert_eq!(row_ids, vec![2, 3, 4]);
}

#[test]
fn index_search_single_match_and_miss() {
  let (db, root) = duplicate_key_index();
  assert_eq!(index_search(&db.pager, root, &text("a")).unwrap(), vec![1]);
  assert_eq!(index_search(&db.pager, root, &text("c")).unwrap(), vec![5]);
  assert!(index_search(&db.pager, root, &text("zz")).unwrap().is_empty());
  assert!(index_search(&db.pager, root, &text("0")).unwrap().is_empty());
}

#[test]
fn index_search_rejects_table_page_in_index_tree() {
  let mut db = TestDb::new();
  let root = db.add_page(table_leaf_page(&[(1, vec![Value::Integer(1)])]));
  db.set_schema(&[]);
  let db = open_pager(db);

  assert!(matches!(
    index_search(&db.pager, root, &text("a")),
    Err(Error::Format(_))
  ));
}
