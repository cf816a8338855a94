mod recommendations;

pub use recommendations::{RecommendationFeed, MAX_RATING, MIN_RATING};

use crate::api::{CollectionKind, MovieApi};
use crate::error::{Result, SyncError};
use crate::models::{CollectionEntry, MovieId, Severity};
use crate::navigation::{Navigator, Route};
use crate::notifications::NotificationQueue;
use crate::session::{SessionListener, SessionManager};
use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::watch;

/// Keeps one server-tracked collection (favorites or watchlist) in step with the backend.
///
/// Additions are applied only after the server confirms them; removals are applied
/// immediately. Every mutation ends with a `refetch`, which replaces local state with
/// the server's copy. Cloning yields another handle onto the same collection.
#[derive(Clone)]
pub struct CollectionSynchronizer {
    inner: Arc<CollectionInner>,
}

struct CollectionInner {
    kind: CollectionKind,
    session: SessionManager,
    api: Arc<dyn MovieApi>,
    notifications: NotificationQueue,
    navigator: Arc<dyn Navigator>,
    state: Mutex<CollectionState>,
    next_fetch: AtomicU64,
    updates: watch::Sender<Vec<CollectionEntry>>,
}

#[derive(Default)]
struct CollectionState {
    entries: Vec<CollectionEntry>,
    /// Sequence number of the newest refetch applied; older responses are dropped.
    applied_fetch: u64,
}

impl CollectionSynchronizer {
    pub fn new(
        kind: CollectionKind,
        session: SessionManager,
        api: Arc<dyn MovieApi>,
        notifications: NotificationQueue,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        let (updates, _) = watch::channel(Vec::new());
        let inner = Arc::new(CollectionInner {
            kind,
            session: session.clone(),
            api,
            notifications,
            navigator,
            state: Mutex::new(CollectionState::default()),
            next_fetch: AtomicU64::new(1),
            updates,
        });
        session.add_listener(&inner);
        Self { inner }
    }

    pub fn kind(&self) -> CollectionKind {
        self.inner.kind
    }

    pub fn entries(&self) -> Vec<CollectionEntry> {
        self.inner
            .state
            .lock()
            .map(|state| state.entries.clone())
            .unwrap_or_default()
    }

    pub fn contains(&self, movie_id: MovieId) -> bool {
        self.inner
            .state
            .lock()
            .map(|state| state.entries.iter().any(|e| e.movie_id == movie_id))
            .unwrap_or(false)
    }

    pub fn subscribe(&self) -> watch::Receiver<Vec<CollectionEntry>> {
        self.inner.updates.subscribe()
    }

    /// Ask the server to add `movie_id`, merge the confirmed entry, then reconcile.
    pub async fn add(&self, movie_id: MovieId) -> Result<CollectionEntry> {
        let kind = self.inner.kind;
        let (token, generation) = self.require_session(&format!("add to your {}", kind))?;

        let result = match self.inner.api.add_to_collection(kind, &token, movie_id).await {
            Ok(entry) if self.inner.merge(generation, entry.clone()) => {
                self.inner
                    .notifications
                    .push(format!("Added to {}!", kind), Severity::Success);
                tracing::info!(%kind, movie_id, "added to collection");
                Ok(entry)
            }
            Ok(_) => Err(SyncError::StaleSession),
            Err(e) => {
                tracing::warn!(%kind, movie_id, error = %e, "add to collection failed");
                self.inner
                    .notifications
                    .push(format!("Failed to add to {}", kind), Severity::Error);
                Err(e)
            }
        };

        self.reconcile().await;
        result
    }

    /// Drop `movie_id` locally right away, ask the server to delete it, then reconcile.
    pub async fn remove(&self, movie_id: MovieId) -> Result<()> {
        let kind = self.inner.kind;
        let (token, generation) = self.require_session(&format!("manage your {}", kind))?;

        self.inner
            .mutate(|state| state.entries.retain(|e| e.movie_id != movie_id));

        let result = self
            .inner
            .api
            .remove_from_collection(kind, &token, movie_id)
            .await;
        if !self.inner.session.is_current(generation) {
            tracing::debug!(%kind, movie_id, "discarding remove response for an ended session");
            return Err(SyncError::StaleSession);
        }
        match &result {
            Ok(()) => {
                self.inner
                    .notifications
                    .push(format!("Removed from {}", kind), Severity::Info);
                tracing::info!(%kind, movie_id, "removed from collection");
            }
            Err(e) => {
                tracing::warn!(%kind, movie_id, error = %e, "remove from collection failed");
                self.inner
                    .notifications
                    .push(format!("Failed to remove from {}", kind), Severity::Error);
            }
        }

        self.reconcile().await;
        result
    }

    /// Replace local state with the server's authoritative collection.
    pub async fn refetch(&self) -> Result<Vec<CollectionEntry>> {
        let kind = self.inner.kind;
        let (token, generation) = self
            .inner
            .session
            .access()
            .ok_or(SyncError::Unauthenticated)?;
        let sequence = self.inner.next_fetch.fetch_add(1, Ordering::SeqCst);

        let fetched = self.inner.api.fetch_collection(kind, &token).await?;
        let entries = dedupe(fetched);
        let applied = self
            .inner
            .mutate_current(generation, |state| {
                if sequence <= state.applied_fetch {
                    return false;
                }
                state.entries = entries.clone();
                state.applied_fetch = sequence;
                true
            })
            .ok_or(SyncError::StaleSession)?;
        if applied {
            tracing::debug!(%kind, count = entries.len(), "collection reconciled");
        } else {
            tracing::debug!(%kind, sequence, "dropping out-of-order collection response");
        }
        Ok(self.entries())
    }

    async fn reconcile(&self) {
        if let Err(e) = self.refetch().await {
            tracing::debug!(kind = %self.inner.kind, error = %e, "reconciliation refetch failed");
        }
    }

    fn require_session(&self, action: &str) -> Result<(String, u64)> {
        match self.inner.session.access() {
            Some(access) => Ok(access),
            None => {
                self.inner
                    .notifications
                    .push(format!("Please login to {}", action), Severity::Warning);
                self.inner.navigator.request(Route::Login);
                Err(SyncError::Unauthenticated)
            }
        }
    }
}

impl CollectionInner {
    /// Merge a confirmed entry unless the session that requested it has ended.
    fn merge(&self, generation: u64, entry: CollectionEntry) -> bool {
        self.mutate_current(generation, |state| {
            match state
                .entries
                .iter_mut()
                .find(|existing| existing.movie_id == entry.movie_id)
            {
                Some(existing) => *existing = entry,
                None => state.entries.push(entry),
            }
        })
        .is_some()
    }

    fn mutate<R>(&self, f: impl FnOnce(&mut CollectionState) -> R) -> Option<R> {
        let mut state = self.state.lock().ok()?;
        let out = f(&mut state);
        self.updates.send_replace(state.entries.clone());
        Some(out)
    }

    /// Apply `f` only while `generation` is the live session.
    ///
    /// The generation is checked with the state lock held. Logout clears this state
    /// through the same lock, so a response from an ended session can never land
    /// after the clear.
    fn mutate_current<R>(
        &self,
        generation: u64,
        f: impl FnOnce(&mut CollectionState) -> R,
    ) -> Option<R> {
        let mut state = self.state.lock().ok()?;
        if !self.session.is_current(generation) {
            tracing::debug!(kind = %self.kind, "discarding response for an ended session");
            return None;
        }
        let out = f(&mut state);
        self.updates.send_replace(state.entries.clone());
        Some(out)
    }
}

impl SessionListener for CollectionInner {
    fn session_cleared(&self) {
        self.mutate(|state| state.entries.clear());
    }
}

/// Keep the first occurrence of every movie id, preserving order.
fn dedupe(entries: Vec<CollectionEntry>) -> Vec<CollectionEntry> {
    let mut seen = HashSet::new();
    entries
        .into_iter()
        .filter(|e| seen.insert(e.movie_id))
        .collect()
}
