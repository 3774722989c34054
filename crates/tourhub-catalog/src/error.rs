//! Error types for `tourhub-catalog`.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
  #[error("unknown budget range: {0:?}")]
  UnknownBudget(String),

  #[error("unknown destination type: {0:?}")]
  UnknownDestinationKind(String),

  #[error("unknown sort order: {0:?}")]
  UnknownSort(String),

  #[error("unknown status: {0:?}")]
  UnknownStatus(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
