use crate::error::{Error, Result};

pub const HEADER_SIZE: usize = 100;
const MAGIC: &[u8; 16] = b"SQLite format 3\0";

/// # [Database File Header](https://www.sqlite.org/fileformat.html#the_database_header)
///
/// The first 100 bytes of the database file comprise the database file header.
/// All multibyte fields are stored big-endian. Fields this engine consults:
///
/// +------+----+-----------------------------------------------------------------------------------------+
/// |Offset|Size|Description                                                                              |
/// +------+----+-----------------------------------------------------------------------------------------+
/// |0     |16  |The header string: "SQLite format 3\000"                                                 |
/// |16    |2   |The database page size in bytes. Must be a power of two between 512 and 32768 inclusive, |
/// |      |    |or the value 1 representing a page size of 65536.                                        |
/// |21    |1   |Maximum embedded payload fraction. Must be 64.                                           |
/// |22    |1   |Minimum embedded payload fraction. Must be 32.                                           |
/// |23    |1   |Leaf payload fraction. Must be 32.                                                       |
/// |56    |4   |The database text encoding. 1 means UTF-8, 2 UTF-16le, 3 UTF-16be.                       |
/// +------+----+-----------------------------------------------------------------------------------------+
///
/// Text decoding throughout the engine assumes UTF-8, so the other two
/// encodings are rejected here rather than failing value by value mid-scan.
#[derive(Debug, Clone, Copy)]
pub struct DbHeader {
  pub page_size: u32,
  pub text_encoding: u32,
}

impl TryFrom<&[u8; HEADER_SIZE]> for DbHeader {
  type Error = Error;

  fn try_from(bytes: &[u8; HEADER_SIZE]) -> Result<Self> {
    if &bytes[0..16] != MAGIC {
      return Err(Error::format("missing SQLite magic string"));
    }

    let raw_page_size = u16::from_be_bytes([bytes[16], bytes[17]]);
    let page_size = match raw_page_size {
      1 => 65536,
      n if n.is_power_of_two() && (512..=32768).contains(&n) => n as u32,
      n => return Err(Error::format(format!("invalid page size {n}"))),
    };

    let max_embedded_payload_fraction = bytes[21];
    let min_embedded_payload_fraction = bytes[22];
    let leaf_payload_fraction = bytes[23];
    if (max_embedded_payload_fraction, min_embedded_payload_fraction, leaf_payload_fraction)
      != (64, 32, 32)
    {
      return Err(Error::format("invalid payload fractions"));
    }

    let text_encoding = u32::from_be_bytes(bytes[56..60].try_into().unwrap());
    if text_encoding != 1 {
      return Err(Error::format(format!(
        "unsupported text encoding {text_encoding} (only 1, UTF-8, is readable)"
      )));
    }

    Ok(DbHeader { page_size, text_encoding })
  }
}
