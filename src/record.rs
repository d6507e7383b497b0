use std::cmp::Ordering;
use std::fmt::{self, Display, Formatter};

use bytes::Buf;

use crate::error::{Error, Result};
use crate::varint;

/// # [Record Format](https://www.sqlite.org/fileformat.html#record-format)
///
/// A record contains a header and a body, in that order. The header begins with
/// a single varint which determines the total number of bytes in the header,
/// including the size varint itself. Following the size varint are one or more
/// additional varints, one per column. These "serial type" numbers determine the
/// datatype of each column:
///
/// +-------------+------------+----------------------------------------------------------+
/// |Serial Type  |Content Size|Meaning                                                   |
/// +-------------+------------+----------------------------------------------------------+
/// |0            |0           |Value is a NULL.                                          |
/// |1            |1           |Value is an 8-bit twos-complement integer.                |
/// |2            |2           |Value is a big-endian 16-bit twos-complement integer.     |
/// |3            |3           |Value is a big-endian 24-bit twos-complement integer.     |
/// |4            |4           |Value is a big-endian 32-bit twos-complement integer.     |
/// |5            |6           |Value is a big-endian 48-bit twos-complement integer.     |
/// |6            |8           |Value is a big-endian 64-bit twos-complement integer.     |
/// |7            |8           |Value is a big-endian IEEE 754-2008 64-bit float.         |
/// |8            |0           |Value is the integer 0. (Schema format 4 and higher.)     |
/// |9            |0           |Value is the integer 1. (Schema format 4 and higher.)     |
/// |10, 11       |variable    |Reserved for internal use; never appear in a well-formed  |
/// |             |            |database file.                                            |
/// |N>=12, even  |(N-12)/2    |Value is a BLOB that is (N-12)/2 bytes in length.         |
/// |N>=13, odd   |(N-13)/2    |Value is a string (N-13)/2 bytes in length, no nul.       |
/// +-------------+------------+----------------------------------------------------------+
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
  pub values: Vec<Value>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
  Null,
  Integer(i64),
  Real(f64),
  /// Serial type 8: the constant integer 0, stored with zero content bytes.
  Zero,
  /// Serial type 9: the constant integer 1, stored with zero content bytes.
  One,
  Text(String),
  Blob(Vec<u8>),
}

impl Value {
  /// Decodes the value described by `serial_type` from the front of `buf`,
  /// advancing the cursor past its content bytes. Text and blob lengths are
  /// clamped to the remaining buffer: oversized payloads that spilled to
  /// overflow pages are truncated to the portion stored locally.
  pub fn decode(serial_type: u64, buf: &mut impl Buf) -> Result<Value> {
    match serial_type {
      0 => Ok(Value::Null),
      1 => Ok(Value::Integer(read_twos_complement(buf, 1)?)),
      2 => Ok(Value::Integer(read_twos_complement(buf, 2)?)),
      3 => Ok(Value::Integer(read_twos_complement(buf, 3)?)),
      4 => Ok(Value::Integer(read_twos_complement(buf, 4)?)),
      5 => Ok(Value::Integer(read_twos_complement(buf, 6)?)),
      6 => Ok(Value::Integer(read_twos_complement(buf, 8)?)),
      7 => {
        if buf.remaining() < 8 {
          return Err(Error::format("truncated 8-byte float"));
        }
        Ok(Value::Real(buf.get_f64()))
      }
      8 => Ok(Value::Zero),
      9 => Ok(Value::One),
      10 | 11 => Err(Error::UnsupportedSerialType(serial_type)),
      n if n >= 12 && n % 2 == 0 => {
        let len = ((n - 12) / 2) as usize;
        let take = len.min(buf.remaining());
        Ok(Value::Blob(buf.copy_to_bytes(take).to_vec()))
      }
      n => {
        let len = ((n - 13) / 2) as usize;
        let take = len.min(buf.remaining());
        let bytes = buf.copy_to_bytes(take);
        let text = String::from_utf8(bytes.to_vec())
          .map_err(|e| Error::format(format!("text value is not valid UTF-8: {e}")))?;
        Ok(Value::Text(text))
      }
    }
  }

  pub fn as_integer(&self) -> Option<i64> {
    match self {
      Value::Integer(value) => Some(*value),
      Value::Zero => Some(0),
      Value::One => Some(1),
      _ => None,
    }
  }

  pub fn as_text(&self) -> Option<&str> {
    match self {
      Value::Text(value) => Some(value),
      _ => None,
    }
  }

  pub fn is_null(&self) -> bool {
    matches!(self, Value::Null)
  }

  /// Index-key ordering: nulls sort before numerics, numerics before text,
  /// text before blobs. Two exact integers compare exactly; mixed
  /// integer/real comparisons go through f64.
  pub fn key_cmp(&self, other: &Value) -> Ordering {
    fn rank(value: &Value) -> u8 {
      match value {
        Value::Null => 0,
        Value::Integer(_) | Value::Real(_) | Value::Zero | Value::One => 1,
        Value::Text(_) => 2,
        Value::Blob(_) => 3,
      }
    }

    match rank(self).cmp(&rank(other)) {
      Ordering::Equal => {}
      unequal => return unequal,
    }

    match (self, other) {
      (Value::Text(a), Value::Text(b)) => a.cmp(b),
      (Value::Blob(a), Value::Blob(b)) => a.cmp(b),
      _ => match (self.as_integer(), other.as_integer()) {
        (Some(a), Some(b)) => a.cmp(&b),
        _ => {
          let a = self.as_real().unwrap_or(0.0);
          let b = other.as_real().unwrap_or(0.0);
          a.partial_cmp(&b).unwrap_or(Ordering::Equal)
        }
      },
    }
  }

  fn as_real(&self) -> Option<f64> {
    match self {
      Value::Real(value) => Some(*value),
      _ => self.as_integer().map(|i| i as f64),
    }
  }
}

impl Display for Value {
  fn fmt(&self, f: &mut Formatter) -> fmt::Result {
    match self {
      Value::Null => write!(f, "NULL"),
      Value::Integer(value) => write!(f, "{}", value),
      Value::Real(value) => write!(f, "{}", value),
      Value::Zero => write!(f, "0"),
      Value::One => write!(f, "1"),
      Value::Text(value) => write!(f, "{}", value),
      Value::Blob(value) => write!(f, "{:?}", value),
    }
  }
}

/// Reads a `width`-byte big-endian magnitude and reinterprets it as a
/// twos-complement signed integer: if the top bit of the stored width is set,
/// the value is `magnitude - 2^(width*8)`.
fn read_twos_complement(buf: &mut impl Buf, width: usize) -> Result<i64> {
  if buf.remaining() < width {
    return Err(Error::format(format!("truncated {width}-byte integer")));
  }
  let mut magnitude: u64 = 0;
  for _ in 0..width {
    magnitude = (magnitude << 8) | buf.get_u8() as u64;
  }
  if width == 8 {
    return Ok(magnitude as i64);
  }
  let sign_bit = 1u64 << (width * 8 - 1);
  if magnitude & sign_bit != 0 {
    Ok(magnitude as i64 - (1i64 << (width * 8)))
  } else {
    Ok(magnitude as i64)
  }
}

impl Record {
  /// Parses the record starting at `data[0]`, returning it along with the
  /// number of bytes consumed (header plus body). Cell decoders use the
  /// consumed count to spot a trailing overflow-page marker.
  pub fn parse(data: &[u8]) -> Result<(Record, usize)> {
    let (header_len, header_len_size) = varint::decode(data)?;
    let header_len = header_len as usize;
    if header_len < header_len_size || header_len > data.len() {
      return Err(Error::format(format!("record header length {header_len} out of bounds")));
    }

    let mut serial_types = Vec::new();
    let mut offset = header_len_size;
    while offset < header_len {
      let (serial_type, size) = varint::decode(&data[offset..header_len])?;
      serial_types.push(serial_type);
      offset += size;
    }

    let mut body = &data[header_len..];
    let body_len = body.len();
    let mut values = Vec::with_capacity(serial_types.len());
    for &serial_type in &serial_types {
      values.push(Value::decode(serial_type, &mut body)?);
    }

    let consumed = header_len + (body_len - body.remaining());
    Ok((Record { values }, consumed))
  }
}
