use miette::{Diagnostic, SourceSpan};
use thiserror::Error;

/// Span-carrying diagnostic for text that does not match one of the narrow
/// recognized shapes. This is deliberately not a general SQL error type: the
/// engine pattern-matches two query shapes and two DDL shapes, nothing more.
#[derive(Error, Debug, Diagnostic)]
#[error("unrecognized statement: {message}")]
pub struct SqlError {
  pub message: String,
  #[source_code]
  pub input: String,
  #[label("here")]
  pub span: SourceSpan,
}

impl SqlError {
  pub fn new(message: impl Into<String>, input: &str, offset: usize, len: usize) -> miette::Report {
    miette::Report::new(SqlError {
      message: message.into(),
      input: input.to_string(),
      span: SourceSpan::new(offset.into(), len.max(1)),
    })
  }
}

/// Folds a nom result into a diagnostic, rejecting unparsed trailing input.
/// Shared by the DDL and SELECT entry points.
pub fn finish<T>(input: &str, result: nom::IResult<&str, T>) -> miette::Result<T> {
  match result {
    Ok((remaining, parsed)) => {
      if remaining.trim().is_empty() {
        Ok(parsed)
      } else {
        let offset = input.len() - remaining.len();
        Err(SqlError::new(
          format!("unparsed input remaining: '{}'", remaining.trim_end()),
          input,
          offset,
          remaining.len(),
        ))
      }
    }
    Err(nom::Err::Error(e) | nom::Err::Failure(e)) => {
      let offset = input.len() - e.input.len();
      Err(SqlError::new("invalid syntax", input, offset, 1))
    }
    Err(nom::Err::Incomplete(_)) => Err(miette::miette!("incomplete input")),
  }
}
