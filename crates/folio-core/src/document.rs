//! Document — the unit of collaboration.
//!
//! A document carries its own access-control state: a fixed owner plus
//! three mutually exclusive access sets (editors, reviewers, readers).
//! Every permission decision reduces to [`Document::role_of`]; every
//! sharing mutation goes through [`Document::grant`] /
//! [`Document::revoke`], which preserve the set invariants.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result, user::PublicUser};

/// Title assigned when a document is created without one.
pub const DEFAULT_TITLE: &str = "Untitled Document";

// ─── Access levels ───────────────────────────────────────────────────────────

/// The access a grantee can hold on a document. Ownership is not a
/// level; it is fixed at creation and never granted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccessLevel {
  Editor,
  Reviewer,
  Reader,
}

impl AccessLevel {
  pub fn as_str(self) -> &'static str {
    match self {
      AccessLevel::Editor => "editor",
      AccessLevel::Reviewer => "reviewer",
      AccessLevel::Reader => "reader",
    }
  }
}

impl std::str::FromStr for AccessLevel {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self> {
    match s {
      "editor" => Ok(AccessLevel::Editor),
      "reviewer" => Ok(AccessLevel::Reviewer),
      "reader" => Ok(AccessLevel::Reader),
      other => Err(Error::UnknownAccessLevel(other.to_owned())),
    }
  }
}

impl std::fmt::Display for AccessLevel {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(self.as_str())
  }
}

/// The effective role of a user on a document, owner included.
///
/// `None` is a legitimate answer, not an error; the API boundary
/// translates it into a forbidden response where access is required.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
  Owner,
  Editor,
  Reviewer,
  Reader,
  None,
}

impl Role {
  /// Any role at all grants read access.
  pub fn can_read(self) -> bool {
    self != Role::None
  }

  /// Title and content mutation is limited to the owner and editors.
  pub fn can_write(self) -> bool {
    matches!(self, Role::Owner | Role::Editor)
  }
}

impl From<AccessLevel> for Role {
  fn from(level: AccessLevel) -> Self {
    match level {
      AccessLevel::Editor => Role::Editor,
      AccessLevel::Reviewer => Role::Reviewer,
      AccessLevel::Reader => Role::Reader,
    }
  }
}

// ─── Document ────────────────────────────────────────────────────────────────

/// A collaborative text document together with its access state.
///
/// The three access vectors are sets in disguise: a user appears at most
/// once across all of them, never alongside the owner, and in grant
/// order within each vector.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
  pub document_id:   Uuid,
  pub owner:         Uuid,
  pub editors:       Vec<Uuid>,
  pub reviewers:     Vec<Uuid>,
  pub readers:       Vec<Uuid>,
  pub title:         String,
  pub content:       String,
  pub created_at:    DateTime<Utc>,
  pub last_modified: DateTime<Utc>,
  /// Opaque owner-supplied annotations; no schema is enforced.
  pub metadata:      serde_json::Value,
}

impl Document {
  /// Resolve `user`'s effective role.
  ///
  /// Priority order is owner > editor > reviewer > reader > none, so
  /// even an inconsistent record resolves deterministically.
  pub fn role_of(&self, user: Uuid) -> Role {
    if user == self.owner {
      Role::Owner
    } else if self.editors.contains(&user) {
      Role::Editor
    } else if self.reviewers.contains(&user) {
      Role::Reviewer
    } else if self.readers.contains(&user) {
      Role::Reader
    } else {
      Role::None
    }
  }

  /// Place `user` in the access set named by `level`, removing it from
  /// the other two first. Idempotent: re-granting a different level
  /// moves the user (to the end of the new set), never duplicates it.
  pub fn grant(&mut self, user: Uuid, level: AccessLevel) -> Result<()> {
    if user == self.owner {
      return Err(Error::GranteeIsOwner);
    }
    self.revoke(user);
    match level {
      AccessLevel::Editor => self.editors.push(user),
      AccessLevel::Reviewer => self.reviewers.push(user),
      AccessLevel::Reader => self.readers.push(user),
    }
    Ok(())
  }

  /// Remove `user` from all three access sets. A no-op, not an error,
  /// if the user holds no access.
  pub fn revoke(&mut self, user: Uuid) {
    self.editors.retain(|u| *u != user);
    self.reviewers.retain(|u| *u != user);
    self.readers.retain(|u| *u != user);
  }

  /// Everyone with access: the owner first, then editors, reviewers,
  /// and readers, each group in grant order.
  pub fn members(&self) -> Vec<(Uuid, Role)> {
    let mut out = vec![(self.owner, Role::Owner)];
    out.extend(self.editors.iter().map(|u| (*u, Role::Editor)));
    out.extend(self.reviewers.iter().map(|u| (*u, Role::Reviewer)));
    out.extend(self.readers.iter().map(|u| (*u, Role::Reader)));
    out
  }
}

// ─── Read models ─────────────────────────────────────────────────────────────

/// Listing row for a user's own documents.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentSummary {
  pub document_id:   Uuid,
  pub title:         String,
  pub created_at:    DateTime<Utc>,
  pub last_modified: DateTime<Utc>,
}

/// Listing row for a document shared with a user, annotated with the
/// owner's public identity fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SharedDocument {
  #[serde(flatten)]
  pub summary: DocumentSummary,
  pub owner:   PublicUser,
}

/// One entry of an access-management listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentMember {
  pub user: PublicUser,
  pub role: Role,
}
