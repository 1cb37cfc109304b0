//! JSON REST API for Folio.
//!
//! Exposes an axum [`Router`] backed by any
//! [`folio_core::store::DocumentStore`]. Authentication is the upstream
//! gateway's responsibility; handlers read the already-authenticated
//! caller from the `x-folio-user` header (see [`caller`]).
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", folio_api::router(state.clone()))
//! ```

pub mod access;
pub mod caller;
pub mod documents;
pub mod error;
pub mod events;
pub mod revision;
pub mod users;

use std::sync::Arc;

use axum::{
  Router,
  routing::{delete, get, post, put},
};
use folio_core::store::DocumentStore;

pub use error::ApiError;
pub use events::BroadcastNotifier;

/// Shared state threaded through all axum handlers.
#[derive(Clone)]
pub struct AppState<S: DocumentStore> {
  pub store:    Arc<S>,
  pub notifier: Arc<BroadcastNotifier>,
}

/// Build a fully-materialised API router for `state`.
///
/// The returned `Router<()>` can be nested into any parent router
/// regardless of its own state type.
pub fn router<S>(state: AppState<S>) -> Router
where
  S: DocumentStore + Clone + Send + Sync + 'static,
  S::Error: Into<folio_core::Error> + Send + Sync + 'static,
{
  Router::new()
    // Documents
    .route("/documents", post(documents::create::<S>))
    .route("/documents/recent", get(documents::recent::<S>))
    .route("/documents/shared", get(documents::shared::<S>))
    .route(
      "/documents/{id}",
      get(documents::get_one::<S>)
        .put(documents::update::<S>)
        .delete(documents::delete_one::<S>),
    )
    // Sharing
    .route("/documents/{id}/share", post(access::grant::<S>))
    .route("/documents/{id}/share/{user}", delete(access::revoke::<S>))
    .route("/documents/{id}/members", get(access::members::<S>))
    .route("/documents/{id}/role", get(access::role::<S>))
    // Identity directory
    .route("/users", put(users::upsert::<S>))
    .route("/users/{id}", get(users::get_one::<S>))
    // Live notifications
    .route("/events", get(events::stream::<S>))
    .with_state(state)
}

// ─── Integration tests ───────────────────────────────────────────────────────
