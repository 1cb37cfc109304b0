//! Live share-update notifications.
//!
//! Grants publish a [`ShareEvent`] to a broadcast channel; `GET /events`
//! streams the channel to every connected session as Server-Sent
//! Events. Delivery is broadcast-to-all and best-effort: a session that
//! lags past the channel capacity misses events rather than erroring.

use std::convert::Infallible;

use axum::{
  extract::State,
  response::sse::{Event, KeepAlive, Sse},
};
use folio_core::{
  notify::{ShareEvent, ShareNotifier},
  store::DocumentStore,
};
use tokio::sync::broadcast;
use tokio_stream::{Stream, StreamExt as _, wrappers::BroadcastStream};

use crate::AppState;

/// SSE event name emitted on every grant.
pub const SHARE_EVENT: &str = "share-update";

/// Default per-subscriber event buffer.
pub const DEFAULT_CAPACITY: usize = 64;

/// [`ShareNotifier`] backed by a tokio broadcast channel.
pub struct BroadcastNotifier {
  tx: broadcast::Sender<ShareEvent>,
}

impl BroadcastNotifier {
  pub fn new(capacity: usize) -> Self {
    let (tx, _) = broadcast::channel(capacity);
    Self { tx }
  }

  /// Open a live subscription; events published afterwards are
  /// delivered to it.
  pub fn subscribe(&self) -> broadcast::Receiver<ShareEvent> {
    self.tx.subscribe()
  }
}

impl Default for BroadcastNotifier {
  fn default() -> Self {
    Self::new(DEFAULT_CAPACITY)
  }
}

impl ShareNotifier for BroadcastNotifier {
  fn publish(&self, event: ShareEvent) {
    // send fails only when no session is subscribed; the contract is
    // fire-and-forget, so that is not an error.
    let _ = self.tx.send(event);
  }
}

/// `GET /events` — stream share-update events to a live session.
pub async fn stream<S>(
  State(state): State<AppState<S>>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>>
where
  S: DocumentStore + Clone + Send + Sync + 'static,
{
  let rx = state.notifier.subscribe();
  let stream = BroadcastStream::new(rx)
    .filter_map(|event| {
      let event = event.ok()?;
      Event::default().event(SHARE_EVENT).json_data(&event).ok()
    })
    .map(Ok::<Event, Infallible>);

  Sse::new(stream).keep_alive(KeepAlive::default())
}
