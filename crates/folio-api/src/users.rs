//! Handlers for `/users` endpoints — the identity-directory sync point.
//!
//! `PUT /users` is how the upstream identity system provisions or
//! refreshes directory entries; Folio itself stores no credentials.

use axum::{
  Json,
  extract::{Path, State},
};
use folio_core::{
  store::DocumentStore,
  user::{NewUser, User},
};
use uuid::Uuid;

use crate::{
  AppState,
  caller::Caller,
  error::{ApiError, store_err},
};

/// `PUT /users` — body: `{"email":…,"display_name":…}`
pub async fn upsert<S>(
  State(state): State<AppState<S>>,
  _caller: Caller,
  Json(body): Json<NewUser>,
) -> Result<Json<User>, ApiError>
where
  S: DocumentStore + Clone + Send + Sync + 'static,
  S::Error: Into<folio_core::Error>,
{
  let user = state.store.upsert_user(body).await.map_err(store_err)?;
  Ok(Json(user))
}

/// `GET /users/:id`
pub async fn get_one<S>(
  State(state): State<AppState<S>>,
  Path(id): Path<Uuid>,
  _caller: Caller,
) -> Result<Json<User>, ApiError>
where
  S: DocumentStore + Clone + Send + Sync + 'static,
  S::Error: Into<folio_core::Error>,
{
  let user = state
    .store
    .get_user(id)
    .await
    .map_err(store_err)?
    .ok_or(folio_core::Error::UserNotFound(id))?;
  Ok(Json(user))
}
