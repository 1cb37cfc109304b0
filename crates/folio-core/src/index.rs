//! The denormalized per-user document index.
//!
//! `created` and `shared` are a derived view of the documents' access
//! state. The store maintains them inside the same transaction as the
//! mutation that changes them; they are never independently
//! authoritative. Invariant: a document appears in exactly its owner's
//! `created` and in the `shared` of every user holding access to it.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One user's view of the documents they authored or were granted.
///
/// Created lazily on first authorship or grant; an identity with no
/// documents simply has two empty sets.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserIndex {
  pub user_id: Uuid,
  pub created: Vec<Uuid>,
  pub shared:  Vec<Uuid>,
}
