use thiserror::Error;

/// Failure classes of the read-only engine.
///
/// `Format` and `UnsupportedSerialType` abort the page or value being decoded
/// and are never retried: the file is assumed static, so a malformed byte will
/// stay malformed. `Query` is a user-facing failure and leaves the catalog and
/// page state untouched.
#[derive(Debug, Error)]
pub enum Error {
  #[error("failed to access database file: {0}")]
  FileAccess(#[from] std::io::Error),

  #[error("malformed database file: {0}")]
  Format(String),

  #[error("serial type {0} is reserved for internal use and cannot be decoded")]
  UnsupportedSerialType(u64),

  #[error("{0}")]
  Query(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
  pub fn format(msg: impl Into<String>) -> Self {
    Error::Format(msg.into())
  }

  pub fn query(msg: impl Into<String>) -> Self {
    Error::Query(msg.into())
  }
}
