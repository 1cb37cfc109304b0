//! Encoding and decoding helpers between Rust domain types and the
//! plain-text representations stored in SQLite columns.
//!
//! All timestamps are stored as RFC 3339 strings. Metadata is stored as
//! compact JSON. UUIDs are stored as hyphenated lowercase strings.

use chrono::{DateTime, Utc};
use folio_core::{
  document::{AccessLevel, DocumentSummary},
  user::User,
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── AccessLevel ─────────────────────────────────────────────────────────────

pub fn encode_level(level: AccessLevel) -> &'static str { level.as_str() }

pub fn decode_level(s: &str) -> Result<AccessLevel> {
  Ok(s.parse::<AccessLevel>()?)
}

// ─── Metadata ────────────────────────────────────────────────────────────────

pub fn encode_metadata(value: &serde_json::Value) -> Result<String> {
  Ok(serde_json::to_string(value)?)
}

pub fn decode_metadata(s: &str) -> Result<serde_json::Value> {
  Ok(serde_json::from_str(s)?)
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw strings read directly from a `users` row.
pub struct RawUser {
  pub user_id:      String,
  pub email:        String,
  pub display_name: String,
  pub created_at:   String,
}

impl RawUser {
  pub fn into_user(self) -> Result<User> {
    Ok(User {
      user_id:      decode_uuid(&self.user_id)?,
      email:        self.email,
      display_name: self.display_name,
      created_at:   decode_dt(&self.created_at)?,
    })
  }
}

/// Raw strings read from a `documents` row, before the access rows are
/// joined in.
pub struct RawDocument {
  pub document_id:   String,
  pub owner_id:      String,
  pub title:         String,
  pub content:       String,
  pub created_at:    String,
  pub last_modified: String,
  pub metadata:      String,
}

/// A `document_access` row, in `granted_at` order.
pub struct RawAccessRow {
  pub user_id: String,
  pub level:   String,
}

/// Raw strings for a listing row.
pub struct RawSummary {
  pub document_id:   String,
  pub title:         String,
  pub created_at:    String,
  pub last_modified: String,
}

impl RawSummary {
  pub fn into_summary(self) -> Result<DocumentSummary> {
    Ok(DocumentSummary {
      document_id:   decode_uuid(&self.document_id)?,
      title:         self.title,
      created_at:    decode_dt(&self.created_at)?,
      last_modified: decode_dt(&self.last_modified)?,
    })
  }
}
