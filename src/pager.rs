use std::fs::File;
use std::os::unix::fs::FileExt;

use crate::error::{Error, Result};
use crate::page::raw::RawPage;

/// Maps 1-based page numbers to raw page buffers.
///
/// Every fetch is a single positioned read of exactly `page_size` bytes at
/// `(page_number - 1) * page_size`; there is no shared seek cursor, so readers
/// holding the same `Pager` cannot corrupt each other's position. Pages are
/// rebuilt fresh on every fetch: the file is never written, so re-reading
/// always returns identical bytes and no cache is needed for correctness.
#[derive(Debug)]
pub struct Pager {
  file: File,
  page_size: u32,
}

impl Pager {
  pub fn new(file: File, page_size: u32) -> Self {
    Self { file, page_size }
  }

  pub fn page_size(&self) -> u32 {
    self.page_size
  }

  pub fn read_page(&self, page_number: u32) -> Result<RawPage> {
    if page_number == 0 {
      return Err(Error::format("page numbers are 1-based"));
    }
    let offset = (page_number - 1) as u64 * self.page_size as u64;
    let mut data = vec![0; self.page_size as usize];
    self.file.read_exact_at(&mut data, offset)?;
    Ok(RawPage::new(data, page_number))
  }
}
