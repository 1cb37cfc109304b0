//! Caller identity extraction.
//!
//! Folio trusts the upstream gateway to authenticate requests; the
//! gateway forwards the authenticated user's id in the `x-folio-user`
//! header. Requests without a parseable id are rejected before any
//! handler runs. There is no process-wide session state: identity is an
//! explicit per-request value.

use axum::{extract::FromRequestParts, http::request::Parts};
use uuid::Uuid;

use crate::error::ApiError;

/// Header carrying the authenticated caller's user id.
pub const CALLER_HEADER: &str = "x-folio-user";

/// The authenticated caller, as asserted by the upstream gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Caller(pub Uuid);

impl<S: Send + Sync> FromRequestParts<S> for Caller {
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    _state: &S,
  ) -> Result<Self, Self::Rejection> {
    let raw = parts
      .headers
      .get(CALLER_HEADER)
      .and_then(|v| v.to_str().ok())
      .ok_or(ApiError::Unauthorized)?;
    let id = Uuid::parse_str(raw).map_err(|_| ApiError::Unauthorized)?;
    Ok(Caller(id))
  }
}
