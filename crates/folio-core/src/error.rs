//! Error types for `folio-core`.

use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum Error {
  #[error("document not found: {0}")]
  DocumentNotFound(Uuid),

  #[error("user not found: {0}")]
  UserNotFound(Uuid),

  #[error("no user with email {0:?}")]
  EmailNotFound(String),

  #[error("caller lacks {required} access")]
  Forbidden { required: &'static str },

  #[error("unknown access level: {0:?}")]
  UnknownAccessLevel(String),

  #[error("cannot grant access to the document owner")]
  GranteeIsOwner,

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),

  #[error("storage error: {0}")]
  Storage(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
