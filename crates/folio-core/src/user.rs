//! User — the local record of the identity directory.
//!
//! Folio authenticates nobody. Users exist so grants can resolve an
//! email address to an identity and so listings can show who owns a
//! shared document; the upstream identity system provisions them via
//! [`crate::store::DocumentStore::upsert_user`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A directory entry for one identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
  pub user_id:      Uuid,
  /// Unique; the lookup key for grants.
  pub email:        String,
  pub display_name: String,
  pub created_at:   DateTime<Utc>,
}

impl User {
  /// The fields safe to show to other users.
  pub fn public(&self) -> PublicUser {
    PublicUser {
      user_id:      self.user_id,
      email:        self.email.clone(),
      display_name: self.display_name.clone(),
    }
  }
}

/// Fields accepted when the identity system provisions or refreshes a
/// user. Upserts are keyed by email.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewUser {
  pub email:        String,
  pub display_name: String,
}

/// The public projection of a [`User`], embedded in listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicUser {
  pub user_id:      Uuid,
  pub email:        String,
  pub display_name: String,
}
