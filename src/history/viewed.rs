use crate::models::MovieId;
use crate::storage::{load_json, save_json, DurableStore, VIEWED_MOVIES_KEY};
use std::sync::Arc;

/// Durable list of every movie id the user has opened, oldest first.
#[derive(Clone)]
pub struct ViewedMovies {
    store: Arc<dyn DurableStore>,
}

impl ViewedMovies {
    pub fn new(store: Arc<dyn DurableStore>) -> Self {
        Self { store }
    }

    pub fn ids(&self) -> Vec<MovieId> {
        load_json(self.store.as_ref(), VIEWED_MOVIES_KEY)
            .unwrap_or_else(|e| {
                tracing::debug!(error = %e, "viewed movie list unreadable");
                None
            })
            .unwrap_or_default()
    }

    pub fn record(&self, movie_id: MovieId) {
        let mut ids = self.ids();
        if ids.contains(&movie_id) {
            return;
        }
        ids.push(movie_id);
        if let Err(e) = save_json(self.store.as_ref(), VIEWED_MOVIES_KEY, &ids) {
            tracing::debug!(movie_id, error = %e, "failed to persist viewed movie");
        }
    }
}
