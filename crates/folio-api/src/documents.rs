//! Handlers for `/documents` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST`   | `/documents` | Body: `{"title":…,"metadata":…}`, both optional |
//! | `GET`    | `/documents/recent` | Caller's own documents |
//! | `GET`    | `/documents/shared` | Documents shared with the caller |
//! | `GET`    | `/documents/:id` | Any role; `ETag` carries the revision |
//! | `PUT`    | `/documents/:id` | Owner/editor; honours `If-Match` |
//! | `DELETE` | `/documents/:id` | Owner only |

use axum::{
  Json,
  extract::{Path, Query, State},
  http::{HeaderMap, HeaderValue, StatusCode, header},
  response::{IntoResponse, Response},
};
use folio_core::{
  document::{Document, DocumentSummary, SharedDocument},
  store::{DEFAULT_LIST_LIMIT, DocumentPatch, DocumentStore, NewDocument},
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
  AppState,
  caller::Caller,
  error::{ApiError, store_err},
  revision,
};

/// Attach the revision tag as an `ETag` header to a document response.
fn with_revision(doc: &Document, status: StatusCode) -> Response {
  let tag = revision::revision_tag(doc);
  let mut res = (status, Json(doc)).into_response();
  if let Ok(value) = HeaderValue::from_str(&tag) {
    res.headers_mut().insert(header::ETAG, value);
  }
  res
}

// ─── Create ──────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct CreateBody {
  pub title:    Option<String>,
  pub metadata: Option<serde_json::Value>,
}

/// `POST /documents` — both fields are optional; `{}` creates an
/// untitled empty document.
pub async fn create<S>(
  State(state): State<AppState<S>>,
  caller: Caller,
  Json(body): Json<CreateBody>,
) -> Result<Response, ApiError>
where
  S: DocumentStore + Clone + Send + Sync + 'static,
  S::Error: Into<folio_core::Error>,
{
  let doc = state
    .store
    .create_document(caller.0, NewDocument { title: body.title, metadata: body.metadata })
    .await
    .map_err(store_err)?;
  Ok(with_revision(&doc, StatusCode::CREATED))
}

// ─── Get one ─────────────────────────────────────────────────────────────────

/// `GET /documents/:id`
pub async fn get_one<S>(
  State(state): State<AppState<S>>,
  Path(id): Path<Uuid>,
  caller: Caller,
) -> Result<Response, ApiError>
where
  S: DocumentStore + Clone + Send + Sync + 'static,
  S::Error: Into<folio_core::Error>,
{
  let doc = state.store.get_document(id, caller.0).await.map_err(store_err)?;
  Ok(with_revision(&doc, StatusCode::OK))
}

// ─── Update ──────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct UpdateBody {
  pub title:   Option<String>,
  pub content: Option<String>,
}

/// `PUT /documents/:id`
pub async fn update<S>(
  State(state): State<AppState<S>>,
  Path(id): Path<Uuid>,
  caller: Caller,
  headers: HeaderMap,
  Json(body): Json<UpdateBody>,
) -> Result<Response, ApiError>
where
  S: DocumentStore + Clone + Send + Sync + 'static,
  S::Error: Into<folio_core::Error>,
{
  if let Some(expected) = headers
    .get(header::IF_MATCH)
    .and_then(|v| v.to_str().ok())
  {
    let current = state.store.get_document(id, caller.0).await.map_err(store_err)?;
    if !revision::matches(&revision::revision_tag(&current), expected) {
      return Err(ApiError::PreconditionFailed);
    }
  }

  let doc = state
    .store
    .update_document(id, caller.0, DocumentPatch { title: body.title, content: body.content })
    .await
    .map_err(store_err)?;
  Ok(with_revision(&doc, StatusCode::OK))
}

// ─── Delete ──────────────────────────────────────────────────────────────────

/// `DELETE /documents/:id`
pub async fn delete_one<S>(
  State(state): State<AppState<S>>,
  Path(id): Path<Uuid>,
  caller: Caller,
) -> Result<StatusCode, ApiError>
where
  S: DocumentStore + Clone + Send + Sync + 'static,
  S::Error: Into<folio_core::Error>,
{
  state.store.delete_document(id, caller.0).await.map_err(store_err)?;
  Ok(StatusCode::NO_CONTENT)
}

// ─── Listings ────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ListParams {
  pub limit: Option<usize>,
}

/// `GET /documents/recent[?limit=<n>]`
pub async fn recent<S>(
  State(state): State<AppState<S>>,
  Query(params): Query<ListParams>,
  caller: Caller,
) -> Result<Json<Vec<DocumentSummary>>, ApiError>
where
  S: DocumentStore + Clone + Send + Sync + 'static,
  S::Error: Into<folio_core::Error>,
{
  let docs = state
    .store
    .list_recent(caller.0, params.limit.unwrap_or(DEFAULT_LIST_LIMIT))
    .await
    .map_err(store_err)?;
  Ok(Json(docs))
}

/// `GET /documents/shared[?limit=<n>]`
pub async fn shared<S>(
  State(state): State<AppState<S>>,
  Query(params): Query<ListParams>,
  caller: Caller,
) -> Result<Json<Vec<SharedDocument>>, ApiError>
where
  S: DocumentStore + Clone + Send + Sync + 'static,
  S::Error: Into<folio_core::Error>,
{
  let docs = state
    .store
    .list_shared(caller.0, params.limit.unwrap_or(DEFAULT_LIST_LIMIT))
    .await
    .map_err(store_err)?;
  Ok(Json(docs))
}
