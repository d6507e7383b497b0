use crate::error::{Error, Result};
use crate::varint;

/// A raw page buffer as read from disk, immutable once loaded.
///
/// Page 1 carries the 100-byte database file header ahead of its b-tree
/// header, so its `header_offset` is 100; every other page starts its b-tree
/// header at byte 0. Cell pointer offsets are always relative to the start of
/// the page buffer, header and all.
#[derive(Debug, Clone)]
pub struct RawPage {
  data: Vec<u8>,
  page_number: u32,
}

impl RawPage {
  pub fn new(data: Vec<u8>, page_number: u32) -> Self {
    Self { data, page_number }
  }

  pub fn header_offset(&self) -> usize {
    if self.page_number == 1 { 100 } else { 0 }
  }

  fn at(&self, offset: usize) -> Result<u8> {
    self
      .data
      .get(offset)
      .copied()
      .ok_or_else(|| self.out_of_bounds(offset, 1))
  }

  fn out_of_bounds(&self, offset: usize, size: usize) -> Error {
    Error::format(format!(
      "read of {size} bytes at offset {offset} past end of page {} ({} bytes)",
      self.page_number,
      self.data.len()
    ))
  }

  pub fn read_u8(&self, offset: usize) -> Result<u8> {
    self.at(offset)
  }

  pub fn read_u16(&self, offset: usize) -> Result<u16> {
    Ok(u16::from_be_bytes([self.at(offset)?, self.at(offset + 1)?]))
  }

  pub fn read_u32(&self, offset: usize) -> Result<u32> {
    Ok(u32::from_be_bytes([
      self.at(offset)?,
      self.at(offset + 1)?,
      self.at(offset + 2)?,
      self.at(offset + 3)?,
    ]))
  }

  /// Slice from `offset` to the end of the page. Record parsing starts here
  /// and stops on its own; whatever does not fit locally was spilled to an
  /// overflow page and is deliberately left behind.
  pub fn tail(&self, offset: usize) -> Result<&[u8]> {
    self
      .data
      .get(offset..)
      .ok_or_else(|| self.out_of_bounds(offset, 0))
  }

  pub fn read_varint(&self, offset: usize) -> Result<(u64, usize)> {
    varint::decode(self.tail(offset)?)
  }
}
