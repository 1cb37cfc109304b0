//! Revision tags for optimistic concurrency.
//!
//! A document's revision is the SHA-256 of its id, its last-modified
//! instant, and its content, hex-encoded and double-quoted so it can be
//! used directly as an HTTP ETag. `GET` responses carry it; `PUT`
//! honours `If-Match` against it.

use folio_core::document::Document;
use sha2::{Digest, Sha256};

/// Compute the revision tag for `doc`, quotes included.
pub fn revision_tag(doc: &Document) -> String {
  let mut hasher = Sha256::new();
  hasher.update(doc.document_id.as_bytes());
  hasher.update(doc.last_modified.timestamp_micros().to_le_bytes());
  hasher.update(doc.content.as_bytes());
  let hash = hasher.finalize();
  format!("\"{}\"", hex::encode(hash))
}

/// Compare a current tag against an `If-Match` header value. Some
/// clients send the tag without the surrounding double-quotes; both
/// forms are accepted.
pub fn matches(current: &str, if_match: &str) -> bool {
  strip_quotes(current) == strip_quotes(if_match)
}

fn strip_quotes(s: &str) -> &str {
  s.trim().trim_matches('"')
}
