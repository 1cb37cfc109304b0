//! The `DocumentStore` trait and supporting input types.
//!
//! The trait is implemented by storage backends (e.g.
//! `folio-store-sqlite`). Higher layers (`folio-api`, `folio-server`)
//! depend on this abstraction, not on any concrete backend.

use std::future::Future;

use uuid::Uuid;

use crate::{
  document::{
    AccessLevel, Document, DocumentMember, DocumentSummary, Role,
    SharedDocument,
  },
  index::UserIndex,
  user::{NewUser, User},
};

// ─── Input types ─────────────────────────────────────────────────────────────

/// Caller-supplied fields for [`DocumentStore::create_document`].
#[derive(Debug, Clone, Default)]
pub struct NewDocument {
  /// Defaults to [`crate::document::DEFAULT_TITLE`].
  pub title:    Option<String>,
  /// Defaults to an empty object.
  pub metadata: Option<serde_json::Value>,
}

/// Fields applied by [`DocumentStore::update_document`]. `None` leaves
/// the field untouched.
#[derive(Debug, Clone, Default)]
pub struct DocumentPatch {
  pub title:   Option<String>,
  pub content: Option<String>,
}

/// Default cap for [`DocumentStore::list_recent`] and
/// [`DocumentStore::list_shared`].
pub const DEFAULT_LIST_LIMIT: usize = 10;

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over a Folio document store backend.
///
/// Every operation that touches more than one record (creation with its
/// index entry, grant, revoke, the delete cascade) must be applied
/// atomically: either the document mutation and its index bookkeeping
/// both land, or neither does.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait DocumentStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Identity directory ────────────────────────────────────────────────

  /// Provision or refresh a directory entry, keyed by email. The
  /// `user_id` of an existing entry is preserved.
  fn upsert_user(
    &self,
    input: NewUser,
  ) -> impl Future<Output = Result<User, Self::Error>> + Send + '_;

  /// Retrieve a user by id. Returns `None` if not found.
  fn get_user(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send + '_;

  /// Resolve an email address to a user. Returns `None` if no entry
  /// carries that email.
  fn resolve_email<'a>(
    &'a self,
    email: &'a str,
  ) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send + 'a;

  // ── Documents ─────────────────────────────────────────────────────────

  /// Allocate a new document owned by `owner`, with empty access sets,
  /// and record it in the owner's `created` index.
  fn create_document(
    &self,
    owner: Uuid,
    draft: NewDocument,
  ) -> impl Future<Output = Result<Document, Self::Error>> + Send + '_;

  /// Fetch a document. Errors with the not-found kind if absent and
  /// with the forbidden kind if `caller` holds no role on it.
  fn get_document(
    &self,
    document_id: Uuid,
    caller: Uuid,
  ) -> impl Future<Output = Result<Document, Self::Error>> + Send + '_;

  /// Apply `patch` and refresh `last_modified`. Permitted only when
  /// `caller` is the owner or an editor.
  fn update_document(
    &self,
    document_id: Uuid,
    caller: Uuid,
    patch: DocumentPatch,
  ) -> impl Future<Output = Result<Document, Self::Error>> + Send + '_;

  /// Remove the document and cascade the removal into every index that
  /// references it, all-or-nothing. Owner only.
  fn delete_document(
    &self,
    document_id: Uuid,
    caller: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Sharing ───────────────────────────────────────────────────────────

  /// Grant `grantee_email`'s user `level` access, moving it between
  /// access sets if it already held another level, and record the
  /// document in the grantee's `shared` index. Owner only. Returns the
  /// updated document.
  fn grant_access<'a>(
    &'a self,
    document_id: Uuid,
    granter: Uuid,
    grantee_email: &'a str,
    level: AccessLevel,
  ) -> impl Future<Output = Result<Document, Self::Error>> + Send + 'a;

  /// Strip `target` of any access and drop the document from its
  /// `shared` index. Owner only. Revoking access that was never
  /// granted is a no-op, not an error.
  fn revoke_access(
    &self,
    document_id: Uuid,
    revoker: Uuid,
    target: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// `user`'s effective role on the document.
  fn role_of(
    &self,
    document_id: Uuid,
    user: Uuid,
  ) -> impl Future<Output = Result<Role, Self::Error>> + Send + '_;

  /// Everyone with access, owner first then grant order. `caller` must
  /// hold a role on the document.
  fn list_members(
    &self,
    document_id: Uuid,
    caller: Uuid,
  ) -> impl Future<Output = Result<Vec<DocumentMember>, Self::Error>> + Send + '_;

  // ── Index reads ───────────────────────────────────────────────────────

  /// The user's own documents, most recently modified first.
  fn list_recent(
    &self,
    user: Uuid,
    limit: usize,
  ) -> impl Future<Output = Result<Vec<DocumentSummary>, Self::Error>> + Send + '_;

  /// Documents shared with the user, most recently modified first,
  /// annotated with each owner's public fields.
  fn list_shared(
    &self,
    user: Uuid,
    limit: usize,
  ) -> impl Future<Output = Result<Vec<SharedDocument>, Self::Error>> + Send + '_;

  /// The raw denormalized index for `user`. An unknown user simply has
  /// two empty sets.
  fn index_of(
    &self,
    user: Uuid,
  ) -> impl Future<Output = Result<UserIndex, Self::Error>> + Send + '_;
}
