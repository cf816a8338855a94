mod viewed;

pub use viewed::ViewedMovies;

use crate::models::{MovieId, MovieSummary};
use crate::session::SessionListener;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

pub const WATCH_HISTORY_CAPACITY: usize = 50;
pub const SEARCH_HISTORY_CAPACITY: usize = 20;

/// Something a history can de-duplicate.
pub trait HistoryItem: Clone + Send + 'static {
    type Key: PartialEq;

    fn history_key(&self) -> Self::Key;
}

impl HistoryItem for MovieSummary {
    type Key = MovieId;

    fn history_key(&self) -> MovieId {
        self.id
    }
}

impl HistoryItem for String {
    type Key = String;

    fn history_key(&self) -> String {
        self.clone()
    }
}

/// Most-recent-first list with a fixed capacity and no duplicate keys.
///
/// Cloning yields another handle onto the same list.
pub struct BoundedHistory<T: HistoryItem> {
    inner: Arc<HistoryInner<T>>,
}

struct HistoryInner<T> {
    capacity: usize,
    items: Mutex<VecDeque<T>>,
}

pub type WatchHistory = BoundedHistory<MovieSummary>;
pub type SearchHistory = BoundedHistory<String>;

impl<T: HistoryItem> BoundedHistory<T> {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            inner: Arc::new(HistoryInner {
                capacity,
                items: Mutex::new(VecDeque::with_capacity(capacity)),
            }),
        }
    }

    /// Put `item` at the front, moving an existing copy rather than duplicating it,
    /// then drop the oldest entries beyond capacity.
    pub fn record(&self, item: T) {
        let Ok(mut items) = self.inner.items.lock() else {
            return;
        };
        let key = item.history_key();
        if let Some(position) = items.iter().position(|existing| existing.history_key() == key) {
            items.remove(position);
        }
        items.push_front(item);
        items.truncate(self.inner.capacity);
    }

    pub fn items(&self) -> Vec<T> {
        self.inner
            .items
            .lock()
            .map(|items| items.iter().cloned().collect())
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.inner.items.lock().map(|items| items.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        if let Ok(mut items) = self.inner.items.lock() {
            items.clear();
        }
    }

    pub fn capacity(&self) -> usize {
        self.inner.capacity
    }

    /// Wipe this history whenever `session` ends.
    pub fn clear_on_logout(&self, session: &crate::session::SessionManager) {
        session.add_listener(&self.inner);
    }
}

impl WatchHistory {
    pub fn new() -> Self {
        Self::with_capacity(WATCH_HISTORY_CAPACITY)
    }
}

impl SearchHistory {
    pub fn new() -> Self {
        Self::with_capacity(SEARCH_HISTORY_CAPACITY)
    }
}

impl<T: HistoryItem> Clone for BoundedHistory<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T: HistoryItem> SessionListener for HistoryInner<T> {
    fn session_cleared(&self) {
        if let Ok(mut items) = self.items.lock() {
            items.clear();
        }
    }
}
