use std::path::PathBuf;

use thiserror::Error;

/// Everything that can abort a run. Nothing here is recovered from: callers propagate
/// with `?` up to `main`.
#[derive(Debug, Error)]
pub enum Error {
  #[error("unknown column {column:?} (available: {})", available.join(", "))]
  UnknownColumn {
    column: String,
    available: Vec<String>,
  },

  #[error("configuration error: {0}")]
  Config(String),

  #[error("data shape error: {0}")]
  Shape(String),

  #[error("model used for prediction before it was fitted")]
  NotFitted,

  #[error("training failed: {0}")]
  Fit(String),

  #[error("line {line}: {message}")]
  Parse { line: usize, message: String },

  #[error("{}: {source}", path.display())]
  Io {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("rendering failed: {0}")]
  Render(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
  pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
    Error::Io {
      path: path.into(),
      source,
    }
  }
}
