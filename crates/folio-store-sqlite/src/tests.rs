//! Integration tests for `SqliteStore` against an in-memory database.

use folio_core::{
  document::{AccessLevel, Role},
  store::{DocumentPatch, DocumentStore, NewDocument},
  user::{NewUser, User},
};
use uuid::Uuid;

use crate::{Error, SqliteStore};

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

async fn user(s: &SqliteStore, email: &str, name: &str) -> User {
  s.upsert_user(NewUser {
    email:        email.to_owned(),
    display_name: name.to_owned(),
  })
  .await
  .unwrap()
}

fn is_forbidden(err: &Error) -> bool {
  matches!(err, Error::Core(folio_core::Error::Forbidden { .. }))
}

// ─── Identity directory ──────────────────────────────────────────────────────

#[tokio::test]
async fn upsert_and_get_user() {
  let s = store().await;
  let alice = user(&s, "alice@example.com", "Alice").await;

  let fetched = s.get_user(alice.user_id).await.unwrap().unwrap();
  assert_eq!(fetched.email, "alice@example.com");
  assert_eq!(fetched.display_name, "Alice");
}

#[tokio::test]
async fn upsert_refresh_keeps_user_id() {
  let s = store().await;
  let first = user(&s, "alice@example.com", "Alice").await;
  let second = user(&s, "alice@example.com", "Alice Liddell").await;

  assert_eq!(first.user_id, second.user_id);
  assert_eq!(second.display_name, "Alice Liddell");
}

#[tokio::test]
async fn resolve_unknown_email_returns_none() {
  let s = store().await;
  assert!(s.resolve_email("ghost@example.com").await.unwrap().is_none());
}

// ─── Creation ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn create_applies_defaults() {
  let s = store().await;
  let owner = user(&s, "owner@example.com", "Owner").await;

  let doc = s
    .create_document(owner.user_id, NewDocument::default())
    .await
    .unwrap();

  assert_eq!(doc.title, "Untitled Document");
  assert_eq!(doc.content, "");
  assert_eq!(doc.owner, owner.user_id);
  assert!(doc.editors.is_empty() && doc.reviewers.is_empty() && doc.readers.is_empty());
  assert_eq!(doc.metadata, serde_json::json!({}));
  assert_eq!(doc.created_at, doc.last_modified);

  let fetched = s.get_document(doc.document_id, owner.user_id).await.unwrap();
  assert_eq!(fetched.title, "Untitled Document");
  assert_eq!(fetched.content, "");
}

#[tokio::test]
async fn create_records_created_index_entry() {
  let s = store().await;
  let owner = user(&s, "owner@example.com", "Owner").await;
  let doc = s
    .create_document(owner.user_id, NewDocument::default())
    .await
    .unwrap();

  let idx = s.index_of(owner.user_id).await.unwrap();
  assert_eq!(idx.created, vec![doc.document_id]);
  assert!(idx.shared.is_empty());
}

#[tokio::test]
async fn create_with_unknown_owner_fails() {
  let s = store().await;
  let err = s
    .create_document(Uuid::new_v4(), NewDocument::default())
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Core(folio_core::Error::UserNotFound(_))));
}

// ─── Reads and permissions ───────────────────────────────────────────────────

#[tokio::test]
async fn get_requires_some_role() {
  let s = store().await;
  let owner = user(&s, "owner@example.com", "Owner").await;
  let stranger = user(&s, "stranger@example.com", "Stranger").await;
  let doc = s
    .create_document(owner.user_id, NewDocument::default())
    .await
    .unwrap();

  assert!(s.get_document(doc.document_id, owner.user_id).await.is_ok());

  let err = s
    .get_document(doc.document_id, stranger.user_id)
    .await
    .unwrap_err();
  assert!(is_forbidden(&err));
}

#[tokio::test]
async fn get_missing_document_is_not_found() {
  let s = store().await;
  let owner = user(&s, "owner@example.com", "Owner").await;
  let err = s
    .get_document(Uuid::new_v4(), owner.user_id)
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Core(folio_core::Error::DocumentNotFound(_))));
}

#[tokio::test]
async fn update_by_owner_and_editor_refreshes_last_modified() {
  let s = store().await;
  let owner = user(&s, "owner@example.com", "Owner").await;
  let editor = user(&s, "ed@example.com", "Ed").await;
  let doc = s
    .create_document(owner.user_id, NewDocument::default())
    .await
    .unwrap();
  s.grant_access(doc.document_id, owner.user_id, "ed@example.com", AccessLevel::Editor)
    .await
    .unwrap();

  let updated = s
    .update_document(
      doc.document_id,
      owner.user_id,
      DocumentPatch { title: Some("Plan".to_owned()), content: None },
    )
    .await
    .unwrap();
  assert_eq!(updated.title, "Plan");
  assert_eq!(updated.content, "");
  assert!(updated.last_modified > doc.last_modified);

  let again = s
    .update_document(
      doc.document_id,
      editor.user_id,
      DocumentPatch { title: None, content: Some("draft text".to_owned()) },
    )
    .await
    .unwrap();
  assert_eq!(again.title, "Plan");
  assert_eq!(again.content, "draft text");
  assert!(again.last_modified > updated.last_modified);
}

#[tokio::test]
async fn update_by_reviewer_or_reader_is_forbidden() {
  let s = store().await;
  let owner = user(&s, "owner@example.com", "Owner").await;
  let reviewer = user(&s, "rev@example.com", "Rev").await;
  let doc = s
    .create_document(owner.user_id, NewDocument::default())
    .await
    .unwrap();
  s.grant_access(doc.document_id, owner.user_id, "rev@example.com", AccessLevel::Reviewer)
    .await
    .unwrap();

  let err = s
    .update_document(
      doc.document_id,
      reviewer.user_id,
      DocumentPatch { title: Some("nope".to_owned()), content: None },
    )
    .await
    .unwrap_err();
  assert!(is_forbidden(&err));
}

// ─── Sharing ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn grant_reader_updates_role_and_shared_index() {
  let s = store().await;
  let owner = user(&s, "owner@example.com", "Owner").await;
  let alice = user(&s, "alice@example.com", "Alice").await;
  let doc = s
    .create_document(owner.user_id, NewDocument::default())
    .await
    .unwrap();

  let updated = s
    .grant_access(doc.document_id, owner.user_id, "alice@example.com", AccessLevel::Reader)
    .await
    .unwrap();
  assert_eq!(updated.readers, vec![alice.user_id]);

  assert_eq!(
    s.role_of(doc.document_id, alice.user_id).await.unwrap(),
    Role::Reader
  );

  let shared = s.list_shared(alice.user_id, 10).await.unwrap();
  assert_eq!(shared.len(), 1);
  assert_eq!(shared[0].summary.document_id, doc.document_id);
  assert_eq!(shared[0].owner.email, "owner@example.com");
  assert_eq!(shared[0].owner.display_name, "Owner");
}

#[tokio::test]
async fn grant_is_owner_only_even_for_editors() {
  let s = store().await;
  let owner = user(&s, "owner@example.com", "Owner").await;
  let editor = user(&s, "ed@example.com", "Ed").await;
  user(&s, "alice@example.com", "Alice").await;
  let doc = s
    .create_document(owner.user_id, NewDocument::default())
    .await
    .unwrap();
  s.grant_access(doc.document_id, owner.user_id, "ed@example.com", AccessLevel::Editor)
    .await
    .unwrap();

  let err = s
    .grant_access(doc.document_id, editor.user_id, "alice@example.com", AccessLevel::Reader)
    .await
    .unwrap_err();
  assert!(is_forbidden(&err));
}

#[tokio::test]
async fn grant_to_unknown_email_mutates_nothing() {
  let s = store().await;
  let owner = user(&s, "owner@example.com", "Owner").await;
  let doc = s
    .create_document(owner.user_id, NewDocument::default())
    .await
    .unwrap();

  let err = s
    .grant_access(doc.document_id, owner.user_id, "ghost@example.com", AccessLevel::Reader)
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Core(folio_core::Error::EmailNotFound(_))));

  let fetched = s.get_document(doc.document_id, owner.user_id).await.unwrap();
  assert!(fetched.readers.is_empty());
}

#[tokio::test]
async fn grant_to_owner_is_rejected() {
  let s = store().await;
  let owner = user(&s, "owner@example.com", "Owner").await;
  let doc = s
    .create_document(owner.user_id, NewDocument::default())
    .await
    .unwrap();

  let err = s
    .grant_access(doc.document_id, owner.user_id, "owner@example.com", AccessLevel::Editor)
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Core(folio_core::Error::GranteeIsOwner)));

  let fetched = s.get_document(doc.document_id, owner.user_id).await.unwrap();
  assert_eq!(fetched.role_of(owner.user_id), Role::Owner);
  assert!(fetched.editors.is_empty());
}

#[tokio::test]
async fn regrant_moves_to_most_recent_level() {
  let s = store().await;
  let owner = user(&s, "owner@example.com", "Owner").await;
  let alice = user(&s, "alice@example.com", "Alice").await;
  let doc = s
    .create_document(owner.user_id, NewDocument::default())
    .await
    .unwrap();

  s.grant_access(doc.document_id, owner.user_id, "alice@example.com", AccessLevel::Reader)
    .await
    .unwrap();
  let updated = s
    .grant_access(doc.document_id, owner.user_id, "alice@example.com", AccessLevel::Editor)
    .await
    .unwrap();

  assert_eq!(updated.editors, vec![alice.user_id]);
  assert!(updated.reviewers.is_empty());
  assert!(updated.readers.is_empty());

  // Still exactly one shared-index entry.
  let idx = s.index_of(alice.user_id).await.unwrap();
  assert_eq!(idx.shared, vec![doc.document_id]);
}

#[tokio::test]
async fn grant_then_revoke_round_trips() {
  let s = store().await;
  let owner = user(&s, "owner@example.com", "Owner").await;
  let alice = user(&s, "alice@example.com", "Alice").await;
  let doc = s
    .create_document(owner.user_id, NewDocument::default())
    .await
    .unwrap();
  let before = s.get_document(doc.document_id, owner.user_id).await.unwrap();

  s.grant_access(doc.document_id, owner.user_id, "alice@example.com", AccessLevel::Reviewer)
    .await
    .unwrap();
  s.revoke_access(doc.document_id, owner.user_id, alice.user_id)
    .await
    .unwrap();

  let after = s.get_document(doc.document_id, owner.user_id).await.unwrap();
  assert_eq!(after.editors, before.editors);
  assert_eq!(after.reviewers, before.reviewers);
  assert_eq!(after.readers, before.readers);

  assert_eq!(
    s.role_of(doc.document_id, alice.user_id).await.unwrap(),
    Role::None
  );
  assert!(s.list_shared(alice.user_id, 10).await.unwrap().is_empty());
}

#[tokio::test]
async fn revoke_is_owner_only() {
  let s = store().await;
  let owner = user(&s, "owner@example.com", "Owner").await;
  let alice = user(&s, "alice@example.com", "Alice").await;
  let doc = s
    .create_document(owner.user_id, NewDocument::default())
    .await
    .unwrap();
  s.grant_access(doc.document_id, owner.user_id, "alice@example.com", AccessLevel::Reader)
    .await
    .unwrap();

  let err = s
    .revoke_access(doc.document_id, alice.user_id, alice.user_id)
    .await
    .unwrap_err();
  assert!(is_forbidden(&err));
}

#[tokio::test]
async fn revoke_without_grant_is_a_noop() {
  let s = store().await;
  let owner = user(&s, "owner@example.com", "Owner").await;
  let alice = user(&s, "alice@example.com", "Alice").await;
  let doc = s
    .create_document(owner.user_id, NewDocument::default())
    .await
    .unwrap();

  s.revoke_access(doc.document_id, owner.user_id, alice.user_id)
    .await
    .unwrap();
}

// ─── Deletion ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn delete_cascades_out_of_every_index() {
  let s = store().await;
  let owner = user(&s, "owner@example.com", "Owner").await;
  let alice = user(&s, "alice@example.com", "Alice").await;
  let bob = user(&s, "bob@example.com", "Bob").await;
  let doc = s
    .create_document(owner.user_id, NewDocument::default())
    .await
    .unwrap();
  s.grant_access(doc.document_id, owner.user_id, "alice@example.com", AccessLevel::Editor)
    .await
    .unwrap();
  s.grant_access(doc.document_id, owner.user_id, "bob@example.com", AccessLevel::Reader)
    .await
    .unwrap();

  s.delete_document(doc.document_id, owner.user_id).await.unwrap();

  for caller in [owner.user_id, alice.user_id, bob.user_id] {
    let err = s.get_document(doc.document_id, caller).await.unwrap_err();
    assert!(matches!(err, Error::Core(folio_core::Error::DocumentNotFound(_))));
  }

  assert!(s.index_of(owner.user_id).await.unwrap().created.is_empty());
  assert!(s.index_of(alice.user_id).await.unwrap().shared.is_empty());
  assert!(s.index_of(bob.user_id).await.unwrap().shared.is_empty());
  assert!(s.list_recent(owner.user_id, 10).await.unwrap().is_empty());
  assert!(s.list_shared(alice.user_id, 10).await.unwrap().is_empty());
}

#[tokio::test]
async fn delete_by_editor_is_forbidden_and_leaves_document() {
  let s = store().await;
  let owner = user(&s, "owner@example.com", "Owner").await;
  let editor = user(&s, "ed@example.com", "Ed").await;
  let doc = s
    .create_document(owner.user_id, NewDocument::default())
    .await
    .unwrap();
  s.grant_access(doc.document_id, owner.user_id, "ed@example.com", AccessLevel::Editor)
    .await
    .unwrap();

  let err = s
    .delete_document(doc.document_id, editor.user_id)
    .await
    .unwrap_err();
  assert!(is_forbidden(&err));

  assert!(s.get_document(doc.document_id, owner.user_id).await.is_ok());
}

// ─── Listings ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn list_recent_orders_by_last_modified_and_caps() {
  let s = store().await;
  let owner = user(&s, "owner@example.com", "Owner").await;

  let a = s.create_document(owner.user_id, NewDocument::default()).await.unwrap();
  let b = s.create_document(owner.user_id, NewDocument::default()).await.unwrap();
  let c = s.create_document(owner.user_id, NewDocument::default()).await.unwrap();

  // Touch `a` so it becomes the most recent.
  s.update_document(
    a.document_id,
    owner.user_id,
    DocumentPatch { title: None, content: Some("x".to_owned()) },
  )
  .await
  .unwrap();

  let recent = s.list_recent(owner.user_id, 2).await.unwrap();
  assert_eq!(recent.len(), 2);
  assert_eq!(recent[0].document_id, a.document_id);
  assert_eq!(recent[1].document_id, c.document_id);
  assert!(recent.iter().all(|d| d.document_id != b.document_id));
}

#[tokio::test]
async fn list_members_owner_first_in_grant_order() {
  let s = store().await;
  let owner = user(&s, "owner@example.com", "Owner").await;
  let alice = user(&s, "alice@example.com", "Alice").await;
  let bob = user(&s, "bob@example.com", "Bob").await;
  let doc = s
    .create_document(owner.user_id, NewDocument::default())
    .await
    .unwrap();

  s.grant_access(doc.document_id, owner.user_id, "alice@example.com", AccessLevel::Reader)
    .await
    .unwrap();
  s.grant_access(doc.document_id, owner.user_id, "bob@example.com", AccessLevel::Reader)
    .await
    .unwrap();

  let members = s.list_members(doc.document_id, alice.user_id).await.unwrap();
  let pairs: Vec<(Uuid, Role)> =
    members.iter().map(|m| (m.user.user_id, m.role)).collect();
  assert_eq!(
    pairs,
    vec![
      (owner.user_id, Role::Owner),
      (alice.user_id, Role::Reader),
      (bob.user_id, Role::Reader),
    ]
  );

  let stranger = user(&s, "stranger@example.com", "Stranger").await;
  let err = s
    .list_members(doc.document_id, stranger.user_id)
    .await
    .unwrap_err();
  assert!(is_forbidden(&err));
}

// ─── Invariants ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn access_sets_and_shared_index_stay_consistent() {
  let s = store().await;
  let owner = user(&s, "owner@example.com", "Owner").await;
  let alice = user(&s, "alice@example.com", "Alice").await;
  let bob = user(&s, "bob@example.com", "Bob").await;
  let doc = s
    .create_document(owner.user_id, NewDocument::default())
    .await
    .unwrap();

  s.grant_access(doc.document_id, owner.user_id, "alice@example.com", AccessLevel::Editor)
    .await
    .unwrap();
  s.grant_access(doc.document_id, owner.user_id, "bob@example.com", AccessLevel::Reviewer)
    .await
    .unwrap();
  s.grant_access(doc.document_id, owner.user_id, "bob@example.com", AccessLevel::Reader)
    .await
    .unwrap();
  s.revoke_access(doc.document_id, owner.user_id, alice.user_id)
    .await
    .unwrap();

  let d = s.get_document(doc.document_id, owner.user_id).await.unwrap();

  // Owner is never a grantee; the three sets are pairwise disjoint.
  let mut grantees: Vec<Uuid> = d
    .editors
    .iter()
    .chain(d.reviewers.iter())
    .chain(d.readers.iter())
    .copied()
    .collect();
  assert!(!grantees.contains(&d.owner));
  let total = grantees.len();
  grantees.sort();
  grantees.dedup();
  assert_eq!(grantees.len(), total);

  // Every grantee's shared index references the document, and nobody
  // else's does.
  for u in [alice.user_id, bob.user_id] {
    let idx = s.index_of(u).await.unwrap();
    assert_eq!(
      idx.shared.contains(&doc.document_id),
      grantees.contains(&u),
      "shared index out of sync for {u}"
    );
  }
}
