//! Handlers for sharing and access management.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST`   | `/documents/:id/share` | Owner only; body `{"email":…,"access_level":…}` |
//! | `DELETE` | `/documents/:id/share/:user` | Owner only |
//! | `GET`    | `/documents/:id/members` | Any role |
//! | `GET`    | `/documents/:id/role` | Caller's own role; 403 when none |

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
};
use folio_core::{
  document::{AccessLevel, Document, DocumentMember, Role},
  notify::{ShareEvent, ShareNotifier as _},
  store::DocumentStore,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  AppState,
  caller::Caller,
  error::{ApiError, store_err},
};

// ─── Grant ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ShareBody {
  pub email:        String,
  pub access_level: String,
}

#[derive(Debug, Serialize)]
pub struct ShareResponse {
  pub message:  String,
  pub document: Document,
}

/// `POST /documents/:id/share`
pub async fn grant<S>(
  State(state): State<AppState<S>>,
  Path(id): Path<Uuid>,
  caller: Caller,
  Json(body): Json<ShareBody>,
) -> Result<Json<ShareResponse>, ApiError>
where
  S: DocumentStore + Clone + Send + Sync + 'static,
  S::Error: Into<folio_core::Error>,
{
  let level: AccessLevel = body.access_level.parse()?;

  let document = state
    .store
    .grant_access(id, caller.0, &body.email, level)
    .await
    .map_err(store_err)?;

  // Only after the grant has committed.
  state.notifier.publish(ShareEvent {
    document_id:  id,
    shared_with:  body.email.clone(),
    access_level: level,
  });

  Ok(Json(ShareResponse {
    message: format!("document shared with {} as {}", body.email, level),
    document,
  }))
}

// ─── Revoke ──────────────────────────────────────────────────────────────────

/// `DELETE /documents/:id/share/:user`
pub async fn revoke<S>(
  State(state): State<AppState<S>>,
  Path((id, target)): Path<(Uuid, Uuid)>,
  caller: Caller,
) -> Result<StatusCode, ApiError>
where
  S: DocumentStore + Clone + Send + Sync + 'static,
  S::Error: Into<folio_core::Error>,
{
  state
    .store
    .revoke_access(id, caller.0, target)
    .await
    .map_err(store_err)?;
  Ok(StatusCode::NO_CONTENT)
}

// ─── Members ─────────────────────────────────────────────────────────────────

/// `GET /documents/:id/members`
pub async fn members<S>(
  State(state): State<AppState<S>>,
  Path(id): Path<Uuid>,
  caller: Caller,
) -> Result<Json<Vec<DocumentMember>>, ApiError>
where
  S: DocumentStore + Clone + Send + Sync + 'static,
  S::Error: Into<folio_core::Error>,
{
  let members = state
    .store
    .list_members(id, caller.0)
    .await
    .map_err(store_err)?;
  Ok(Json(members))
}

// ─── Role ────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct RoleResponse {
  pub role: Role,
}

/// `GET /documents/:id/role`
///
/// A role of `none` is not an error at the store level; here at the API
/// boundary it becomes a 403.
pub async fn role<S>(
  State(state): State<AppState<S>>,
  Path(id): Path<Uuid>,
  caller: Caller,
) -> Result<Json<RoleResponse>, ApiError>
where
  S: DocumentStore + Clone + Send + Sync + 'static,
  S::Error: Into<folio_core::Error>,
{
  let role = state.store.role_of(id, caller.0).await.map_err(store_err)?;
  if role == Role::None {
    return Err(folio_core::Error::Forbidden { required: "read" }.into());
  }
  Ok(Json(RoleResponse { role }))
}
