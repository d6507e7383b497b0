use crate::error::{Error, Result};

/// # [Variable-Length Integers](https://www.sqlite.org/fileformat.html#varint)
///
/// A variable-length integer or "varint" is a static Huffman encoding of 64-bit
/// twos-complement integers that uses less space for small positive values.
/// A varint is between 1 and 9 bytes in length. The varint consists of either
/// zero or more bytes which have the high-order bit set followed by a single byte
/// with the high-order bit clear, or nine bytes, whichever is shorter.
/// The lower seven bits of each of the first eight bytes and all 8 bits of the
/// ninth byte are used to reconstruct the 64-bit twos-complement integer.
/// Varints are big-endian: bits taken from the earlier byte of the varint are more
/// significant than bits taken from the later bytes.
///
/// Decodes the varint at the start of `data`, returning the value and the
/// number of bytes it occupied. Running off the end of the buffer while the
/// high bit is still set is a format error.
pub fn decode(data: &[u8]) -> Result<(u64, usize)> {
  let mut value: u64 = 0;

  for (i, &byte) in data.iter().take(9).enumerate() {
    if i == 8 {
      // Ninth byte contributes all 8 of its bits.
      return Ok(((value << 8) | byte as u64, 9));
    }
    value = (value << 7) | (byte & 0x7F) as u64;
    if byte & 0x80 == 0 {
      return Ok((value, i + 1));
    }
  }

  Err(Error::format("varint extends past end of buffer"))
}

/// Inverse of [`decode`]. The engine itself never writes varints; this exists
/// so tests can build well-formed pages and exercise the round-trip property.
pub fn encode(value: u64) -> Vec<u8> {
  if value >> 56 != 0 {
    // Needs the full nine bytes: eight 7-bit groups then the low 8 bits.
    let mut out = Vec::with_capacity(9);
    let high = value >> 8;
    for i in (0..8).rev() {
      out.push((((high >> (7 * i)) & 0x7F) as u8) | 0x80);
    }
    out.push((value & 0xFF) as u8);
    return out;
  }

  let mut groups = Vec::new();
  let mut rest = value;
  loop {
    groups.push((rest & 0x7F) as u8);
    rest >>= 7;
    if rest == 0 {
      break;
    }
  }
  groups.reverse();
  let last = groups.len() - 1;
  for (i, group) in groups.iter_mut().enumerate() {
    if i != last {
      *group |= 0x80;
    }
  }
  groups
}
