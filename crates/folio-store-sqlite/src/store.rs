//! [`SqliteStore`] — the SQLite implementation of [`DocumentStore`].
//!
//! Reads run as plain queries; every mutation that touches more than one
//! record runs inside a [`rusqlite::Transaction`] so the document row,
//! its access rows, and the per-user index commit or abort together.

use std::path::Path;

use chrono::Utc;
use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use folio_core::{
  document::{
    AccessLevel, DEFAULT_TITLE, Document, DocumentMember, DocumentSummary,
    Role, SharedDocument,
  },
  index::UserIndex,
  store::{DocumentPatch, DocumentStore, NewDocument},
  user::{NewUser, User},
};

use crate::{
  Error, Result,
  encode::{
    RawAccessRow, RawDocument, RawSummary, RawUser, decode_dt, decode_level,
    decode_metadata, decode_uuid, encode_dt, encode_level, encode_metadata,
    encode_uuid,
  },
  index,
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Folio document store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted. All
/// calls are serialised onto one connection, so the store itself never
/// interleaves two mutations.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── Row readers ─────────────────────────────────────────────────────────────

fn read_user(conn: &rusqlite::Connection, id: Uuid) -> Result<Option<User>> {
  let id_str = encode_uuid(id);
  let raw: Option<RawUser> = conn
    .query_row(
      "SELECT user_id, email, display_name, created_at
       FROM users WHERE user_id = ?1",
      rusqlite::params![id_str],
      |row| {
        Ok(RawUser {
          user_id:      row.get(0)?,
          email:        row.get(1)?,
          display_name: row.get(2)?,
          created_at:   row.get(3)?,
        })
      },
    )
    .optional()?;
  raw.map(RawUser::into_user).transpose()
}

fn read_user_by_email(
  conn: &rusqlite::Connection,
  email: &str,
) -> Result<Option<User>> {
  let raw: Option<RawUser> = conn
    .query_row(
      "SELECT user_id, email, display_name, created_at
       FROM users WHERE email = ?1",
      rusqlite::params![email],
      |row| {
        Ok(RawUser {
          user_id:      row.get(0)?,
          email:        row.get(1)?,
          display_name: row.get(2)?,
          created_at:   row.get(3)?,
        })
      },
    )
    .optional()?;
  raw.map(RawUser::into_user).transpose()
}

/// Assemble a [`Document`] from its row plus its access rows, the
/// latter in `granted_at` order so member listings preserve grant order.
fn read_document(
  conn: &rusqlite::Connection,
  id: Uuid,
) -> Result<Option<Document>> {
  let id_str = encode_uuid(id);

  let raw: Option<RawDocument> = conn
    .query_row(
      "SELECT document_id, owner_id, title, content,
              created_at, last_modified, metadata
       FROM documents WHERE document_id = ?1",
      rusqlite::params![id_str],
      |row| {
        Ok(RawDocument {
          document_id:   row.get(0)?,
          owner_id:      row.get(1)?,
          title:         row.get(2)?,
          content:       row.get(3)?,
          created_at:    row.get(4)?,
          last_modified: row.get(5)?,
          metadata:      row.get(6)?,
        })
      },
    )
    .optional()?;

  let Some(raw) = raw else {
    return Ok(None);
  };

  let mut stmt = conn.prepare(
    "SELECT user_id, level FROM document_access
     WHERE document_id = ?1
     ORDER BY granted_at, rowid",
  )?;
  let access: Vec<RawAccessRow> = stmt
    .query_map(rusqlite::params![id_str], |row| {
      Ok(RawAccessRow { user_id: row.get(0)?, level: row.get(1)? })
    })?
    .collect::<rusqlite::Result<Vec<_>>>()?;

  let mut doc = Document {
    document_id:   decode_uuid(&raw.document_id)?,
    owner:         decode_uuid(&raw.owner_id)?,
    editors:       vec![],
    reviewers:     vec![],
    readers:       vec![],
    title:         raw.title,
    content:       raw.content,
    created_at:    decode_dt(&raw.created_at)?,
    last_modified: decode_dt(&raw.last_modified)?,
    metadata:      decode_metadata(&raw.metadata)?,
  };

  for row in access {
    let user = decode_uuid(&row.user_id)?;
    match decode_level(&row.level)? {
      AccessLevel::Editor => doc.editors.push(user),
      AccessLevel::Reviewer => doc.reviewers.push(user),
      AccessLevel::Reader => doc.readers.push(user),
    }
  }

  Ok(Some(doc))
}

fn require_document(conn: &rusqlite::Connection, id: Uuid) -> Result<Document> {
  read_document(conn, id)?
    .ok_or_else(|| folio_core::Error::DocumentNotFound(id).into())
}

// ─── Operation bodies ────────────────────────────────────────────────────────
//
// Synchronous functions executed on the connection thread. Mutations
// open their own transaction; reads query directly.

fn upsert_user_body(conn: &mut rusqlite::Connection, input: NewUser) -> Result<User> {
  let user_id_str = encode_uuid(Uuid::new_v4());
  let at_str      = encode_dt(Utc::now());

  conn.execute(
    "INSERT INTO users (user_id, email, display_name, created_at)
     VALUES (?1, ?2, ?3, ?4)
     ON CONFLICT (email)
     DO UPDATE SET display_name = excluded.display_name",
    rusqlite::params![user_id_str, input.email, input.display_name, at_str],
  )?;

  // On conflict the stored user_id and created_at win; read back the
  // authoritative row.
  read_user_by_email(conn, &input.email)?
    .ok_or_else(|| folio_core::Error::EmailNotFound(input.email).into())
}

fn create_document_body(
  conn: &mut rusqlite::Connection,
  owner: Uuid,
  draft: NewDocument,
) -> Result<Document> {
  let tx = conn.transaction()?;

  read_user(&tx, owner)?.ok_or(folio_core::Error::UserNotFound(owner))?;

  let now = Utc::now();
  let doc = Document {
    document_id:   Uuid::new_v4(),
    owner,
    editors:       vec![],
    reviewers:     vec![],
    readers:       vec![],
    title:         draft.title.unwrap_or_else(|| DEFAULT_TITLE.to_owned()),
    content:       String::new(),
    created_at:    now,
    last_modified: now,
    metadata:      draft.metadata.unwrap_or_else(|| serde_json::json!({})),
  };

  tx.execute(
    "INSERT INTO documents (document_id, owner_id, title, content,
                            created_at, last_modified, metadata)
     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
    rusqlite::params![
      encode_uuid(doc.document_id),
      encode_uuid(doc.owner),
      doc.title,
      doc.content,
      encode_dt(doc.created_at),
      encode_dt(doc.last_modified),
      encode_metadata(&doc.metadata)?,
    ],
  )?;
  index::on_document_created(&tx, doc.document_id, owner)?;

  tx.commit()?;
  Ok(doc)
}

fn get_document_body(
  conn: &rusqlite::Connection,
  document_id: Uuid,
  caller: Uuid,
) -> Result<Document> {
  let doc = require_document(conn, document_id)?;
  if !doc.role_of(caller).can_read() {
    return Err(folio_core::Error::Forbidden { required: "read" }.into());
  }
  Ok(doc)
}

fn update_document_body(
  conn: &mut rusqlite::Connection,
  document_id: Uuid,
  caller: Uuid,
  patch: DocumentPatch,
) -> Result<Document> {
  let tx = conn.transaction()?;

  let doc = require_document(&tx, document_id)?;
  if !doc.role_of(caller).can_write() {
    return Err(folio_core::Error::Forbidden { required: "editor" }.into());
  }

  tx.execute(
    "UPDATE documents
     SET title         = COALESCE(?2, title),
         content       = COALESCE(?3, content),
         last_modified = ?4
     WHERE document_id = ?1",
    rusqlite::params![
      encode_uuid(document_id),
      patch.title,
      patch.content,
      encode_dt(Utc::now()),
    ],
  )?;

  let updated = require_document(&tx, document_id)?;
  tx.commit()?;
  Ok(updated)
}

fn delete_document_body(
  conn: &mut rusqlite::Connection,
  document_id: Uuid,
  caller: Uuid,
) -> Result<()> {
  let tx = conn.transaction()?;

  let doc = require_document(&tx, document_id)?;
  if doc.owner != caller {
    return Err(folio_core::Error::Forbidden { required: "owner" }.into());
  }

  let id_str = encode_uuid(document_id);
  index::on_document_deleted(&tx, document_id)?;
  tx.execute(
    "DELETE FROM document_access WHERE document_id = ?1",
    rusqlite::params![id_str],
  )?;
  tx.execute(
    "DELETE FROM documents WHERE document_id = ?1",
    rusqlite::params![id_str],
  )?;

  tx.commit()?;
  Ok(())
}

fn grant_access_body(
  conn: &mut rusqlite::Connection,
  document_id: Uuid,
  granter: Uuid,
  grantee_email: &str,
  level: AccessLevel,
) -> Result<Document> {
  let tx = conn.transaction()?;

  let doc = require_document(&tx, document_id)?;
  if doc.owner != granter {
    return Err(folio_core::Error::Forbidden { required: "owner" }.into());
  }

  let grantee = read_user_by_email(&tx, grantee_email)?
    .ok_or_else(|| folio_core::Error::EmailNotFound(grantee_email.to_owned()))?;
  if grantee.user_id == doc.owner {
    return Err(folio_core::Error::GranteeIsOwner.into());
  }

  // One access row per (document, user): the upsert moves the grantee
  // to the new level and refreshes granted_at, so a re-grant lands at
  // the end of the member listing.
  tx.execute(
    "INSERT INTO document_access (document_id, user_id, level, granted_at)
     VALUES (?1, ?2, ?3, ?4)
     ON CONFLICT (document_id, user_id)
     DO UPDATE SET level = excluded.level, granted_at = excluded.granted_at",
    rusqlite::params![
      encode_uuid(document_id),
      encode_uuid(grantee.user_id),
      encode_level(level),
      encode_dt(Utc::now()),
    ],
  )?;
  index::on_access_granted(&tx, document_id, grantee.user_id)?;

  let updated = require_document(&tx, document_id)?;
  tx.commit()?;
  Ok(updated)
}

fn revoke_access_body(
  conn: &mut rusqlite::Connection,
  document_id: Uuid,
  revoker: Uuid,
  target: Uuid,
) -> Result<()> {
  let tx = conn.transaction()?;

  let doc = require_document(&tx, document_id)?;
  if doc.owner != revoker {
    return Err(folio_core::Error::Forbidden { required: "owner" }.into());
  }

  tx.execute(
    "DELETE FROM document_access WHERE document_id = ?1 AND user_id = ?2",
    rusqlite::params![encode_uuid(document_id), encode_uuid(target)],
  )?;
  index::on_access_revoked(&tx, document_id, target)?;

  tx.commit()?;
  Ok(())
}

fn list_members_body(
  conn: &rusqlite::Connection,
  document_id: Uuid,
  caller: Uuid,
) -> Result<Vec<DocumentMember>> {
  let doc = require_document(conn, document_id)?;
  if !doc.role_of(caller).can_read() {
    return Err(folio_core::Error::Forbidden { required: "read" }.into());
  }

  let mut members = Vec::new();
  for (user_id, role) in doc.members() {
    let user = read_user(conn, user_id)?
      .ok_or(folio_core::Error::UserNotFound(user_id))?;
    members.push(DocumentMember { user: user.public(), role });
  }
  Ok(members)
}

fn list_recent_body(
  conn: &rusqlite::Connection,
  user: Uuid,
  limit: usize,
) -> Result<Vec<DocumentSummary>> {
  let mut stmt = conn.prepare(
    "SELECT d.document_id, d.title, d.created_at, d.last_modified
     FROM user_index i
     JOIN documents d ON d.document_id = i.document_id
     WHERE i.user_id = ?1 AND i.entry = 'created'
     ORDER BY d.last_modified DESC
     LIMIT ?2",
  )?;
  let raws: Vec<RawSummary> = stmt
    .query_map(rusqlite::params![encode_uuid(user), limit as i64], |row| {
      Ok(RawSummary {
        document_id:   row.get(0)?,
        title:         row.get(1)?,
        created_at:    row.get(2)?,
        last_modified: row.get(3)?,
      })
    })?
    .collect::<rusqlite::Result<Vec<_>>>()?;

  raws.into_iter().map(RawSummary::into_summary).collect()
}

fn list_shared_body(
  conn: &rusqlite::Connection,
  user: Uuid,
  limit: usize,
) -> Result<Vec<SharedDocument>> {
  let mut stmt = conn.prepare(
    "SELECT d.document_id, d.title, d.created_at, d.last_modified,
            u.user_id, u.email, u.display_name
     FROM user_index i
     JOIN documents d ON d.document_id = i.document_id
     JOIN users u     ON u.user_id     = d.owner_id
     WHERE i.user_id = ?1 AND i.entry = 'shared'
     ORDER BY d.last_modified DESC
     LIMIT ?2",
  )?;
  let raws: Vec<(RawSummary, RawUser)> = stmt
    .query_map(rusqlite::params![encode_uuid(user), limit as i64], |row| {
      Ok((
        RawSummary {
          document_id:   row.get(0)?,
          title:         row.get(1)?,
          created_at:    row.get(2)?,
          last_modified: row.get(3)?,
        },
        RawUser {
          user_id:      row.get(4)?,
          email:        row.get(5)?,
          display_name: row.get(6)?,
          // Not selected; the public projection drops it anyway.
          created_at:   String::new(),
        },
      ))
    })?
    .collect::<rusqlite::Result<Vec<_>>>()?;

  raws
    .into_iter()
    .map(|(summary, owner)| {
      Ok(SharedDocument {
        summary: summary.into_summary()?,
        owner:   folio_core::user::PublicUser {
          user_id:      decode_uuid(&owner.user_id)?,
          email:        owner.email,
          display_name: owner.display_name,
        },
      })
    })
    .collect()
}

fn index_of_body(conn: &rusqlite::Connection, user: Uuid) -> Result<UserIndex> {
  let mut stmt = conn.prepare(
    "SELECT document_id, entry FROM user_index
     WHERE user_id = ?1
     ORDER BY rowid",
  )?;
  let rows: Vec<(String, String)> = stmt
    .query_map(rusqlite::params![encode_uuid(user)], |row| {
      Ok((row.get(0)?, row.get(1)?))
    })?
    .collect::<rusqlite::Result<Vec<_>>>()?;

  let mut out = UserIndex { user_id: user, ..UserIndex::default() };
  for (doc_str, entry) in rows {
    let doc = decode_uuid(&doc_str)?;
    match entry.as_str() {
      index::ENTRY_CREATED => out.created.push(doc),
      index::ENTRY_SHARED => out.shared.push(doc),
      other => {
        return Err(Error::DateParse(format!("unknown index entry: {other:?}")));
      }
    }
  }
  Ok(out)
}

// ─── DocumentStore impl ──────────────────────────────────────────────────────

impl DocumentStore for SqliteStore {
  type Error = Error;

  // ── Identity directory ────────────────────────────────────────────────────

  async fn upsert_user(&self, input: NewUser) -> Result<User> {
    self
      .conn
      .call(move |conn| Ok(upsert_user_body(conn, input)))
      .await?
  }

  async fn get_user(&self, id: Uuid) -> Result<Option<User>> {
    self.conn.call(move |conn| Ok(read_user(conn, id))).await?
  }

  async fn resolve_email(&self, email: &str) -> Result<Option<User>> {
    let email = email.to_owned();
    self
      .conn
      .call(move |conn| Ok(read_user_by_email(conn, &email)))
      .await?
  }

  // ── Documents ─────────────────────────────────────────────────────────────

  async fn create_document(
    &self,
    owner: Uuid,
    draft: NewDocument,
  ) -> Result<Document> {
    self
      .conn
      .call(move |conn| Ok(create_document_body(conn, owner, draft)))
      .await?
  }

  async fn get_document(&self, document_id: Uuid, caller: Uuid) -> Result<Document> {
    self
      .conn
      .call(move |conn| Ok(get_document_body(conn, document_id, caller)))
      .await?
  }

  async fn update_document(
    &self,
    document_id: Uuid,
    caller: Uuid,
    patch: DocumentPatch,
  ) -> Result<Document> {
    self
      .conn
      .call(move |conn| Ok(update_document_body(conn, document_id, caller, patch)))
      .await?
  }

  async fn delete_document(&self, document_id: Uuid, caller: Uuid) -> Result<()> {
    self
      .conn
      .call(move |conn| Ok(delete_document_body(conn, document_id, caller)))
      .await?
  }

  // ── Sharing ───────────────────────────────────────────────────────────────

  async fn grant_access(
    &self,
    document_id: Uuid,
    granter: Uuid,
    grantee_email: &str,
    level: AccessLevel,
  ) -> Result<Document> {
    let email = grantee_email.to_owned();
    self
      .conn
      .call(move |conn| {
        Ok(grant_access_body(conn, document_id, granter, &email, level))
      })
      .await?
  }

  async fn revoke_access(
    &self,
    document_id: Uuid,
    revoker: Uuid,
    target: Uuid,
  ) -> Result<()> {
    self
      .conn
      .call(move |conn| Ok(revoke_access_body(conn, document_id, revoker, target)))
      .await?
  }

  async fn role_of(&self, document_id: Uuid, user: Uuid) -> Result<Role> {
    self
      .conn
      .call(move |conn| {
        Ok(require_document(conn, document_id).map(|doc| doc.role_of(user)))
      })
      .await?
  }

  async fn list_members(
    &self,
    document_id: Uuid,
    caller: Uuid,
  ) -> Result<Vec<DocumentMember>> {
    self
      .conn
      .call(move |conn| Ok(list_members_body(conn, document_id, caller)))
      .await?
  }

  // ── Index reads ───────────────────────────────────────────────────────────

  async fn list_recent(&self, user: Uuid, limit: usize) -> Result<Vec<DocumentSummary>> {
    self
      .conn
      .call(move |conn| Ok(list_recent_body(conn, user, limit)))
      .await?
  }

  async fn list_shared(&self, user: Uuid, limit: usize) -> Result<Vec<SharedDocument>> {
    self
      .conn
      .call(move |conn| Ok(list_shared_body(conn, user, limit)))
      .await?
  }

  async fn index_of(&self, user: Uuid) -> Result<UserIndex> {
    self
      .conn
      .call(move |conn| Ok(index_of_body(conn, user)))
      .await?
  }
}
