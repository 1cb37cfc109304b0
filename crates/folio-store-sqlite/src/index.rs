//! Maintenance of the denormalized per-user document index.
//!
//! Every function runs against the caller's open transaction, so the
//! index entries commit or abort together with the document mutation
//! that triggered them. Partial cascades cannot be observed.

use rusqlite::Transaction;
use uuid::Uuid;

use crate::{Result, encode::encode_uuid};

pub const ENTRY_CREATED: &str = "created";
pub const ENTRY_SHARED: &str = "shared";

/// Record the document in its author's `created` index.
pub fn on_document_created(
  tx: &Transaction<'_>,
  document_id: Uuid,
  owner: Uuid,
) -> Result<()> {
  tx.execute(
    "INSERT OR IGNORE INTO user_index (user_id, document_id, entry)
     VALUES (?1, ?2, ?3)",
    rusqlite::params![encode_uuid(owner), encode_uuid(document_id), ENTRY_CREATED],
  )?;
  Ok(())
}

/// Record the document in the grantee's `shared` index. Idempotent.
pub fn on_access_granted(
  tx: &Transaction<'_>,
  document_id: Uuid,
  grantee: Uuid,
) -> Result<()> {
  tx.execute(
    "INSERT OR IGNORE INTO user_index (user_id, document_id, entry)
     VALUES (?1, ?2, ?3)",
    rusqlite::params![encode_uuid(grantee), encode_uuid(document_id), ENTRY_SHARED],
  )?;
  Ok(())
}

/// Drop the document from the target's `shared` index. No error if the
/// entry was never there.
pub fn on_access_revoked(
  tx: &Transaction<'_>,
  document_id: Uuid,
  target: Uuid,
) -> Result<()> {
  tx.execute(
    "DELETE FROM user_index
     WHERE user_id = ?1 AND document_id = ?2 AND entry = ?3",
    rusqlite::params![encode_uuid(target), encode_uuid(document_id), ENTRY_SHARED],
  )?;
  Ok(())
}

/// Cascade a deletion: drop every index entry referencing the document,
/// the author's `created` and all grantees' `shared` alike.
pub fn on_document_deleted(tx: &Transaction<'_>, document_id: Uuid) -> Result<()> {
  tx.execute(
    "DELETE FROM user_index WHERE document_id = ?1",
    rusqlite::params![encode_uuid(document_id)],
  )?;
  Ok(())
}
