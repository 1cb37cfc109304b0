//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("unauthorized")]
  Unauthorized,

  #[error("precondition failed")]
  PreconditionFailed,

  #[error("bad request: {0}")]
  BadRequest(String),

  #[error(transparent)]
  Core(#[from] folio_core::Error),
}

/// Lift a store error into the API taxonomy.
pub fn store_err<E: Into<folio_core::Error>>(e: E) -> ApiError {
  ApiError::Core(e.into())
}

impl ApiError {
  fn status(&self) -> StatusCode {
    use folio_core::Error as Core;
    match self {
      ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
      ApiError::PreconditionFailed => StatusCode::PRECONDITION_FAILED,
      ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
      ApiError::Core(core) => match core {
        Core::DocumentNotFound(_) | Core::UserNotFound(_) | Core::EmailNotFound(_) => {
          StatusCode::NOT_FOUND
        }
        Core::Forbidden { .. } => StatusCode::FORBIDDEN,
        Core::UnknownAccessLevel(_) | Core::GranteeIsOwner => StatusCode::BAD_REQUEST,
        Core::Serialization(_) | Core::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
      },
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    (self.status(), Json(json!({ "error": self.to_string() }))).into_response()
  }
}
