//! The share-notification boundary.
//!
//! Folio's only real-time obligation is telling live sessions that a
//! grant happened. The contract is fire-and-forget: a notification that
//! reaches no listener is dropped, never retried, and never fails the
//! triggering request.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::document::AccessLevel;

/// Emitted after a successful grant and broadcast to all live
/// sessions. Field names on the wire match the frontend contract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShareEvent {
  pub document_id:  Uuid,
  /// Email the document was shared with.
  pub shared_with:  String,
  pub access_level: AccessLevel,
}

/// Sink for [`ShareEvent`]s.
pub trait ShareNotifier: Send + Sync {
  /// Deliver `event` to whoever is listening. Must not block and must
  /// not propagate delivery failures.
  fn publish(&self, event: ShareEvent);
}
