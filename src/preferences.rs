use crate::models::{MovieId, PreferencesPatch, UserPreferences};
use crate::storage::{load_json, save_json, DurableStore, PREFERENCES_KEY};
use std::sync::{Arc, Mutex};

/// Device-level viewing preferences, persisted on every change.
#[derive(Clone)]
pub struct PreferencesStore {
    store: Arc<dyn DurableStore>,
    current: Arc<Mutex<UserPreferences>>,
}

impl PreferencesStore {
    /// Load saved preferences, falling back to defaults when none are stored.
    pub fn load(store: Arc<dyn DurableStore>) -> Self {
        let current = load_json(store.as_ref(), PREFERENCES_KEY)
            .unwrap_or_else(|e| {
                tracing::warn!(error = %e, "stored preferences unreadable; using defaults");
                None
            })
            .unwrap_or_default();
        Self {
            store,
            current: Arc::new(Mutex::new(current)),
        }
    }

    pub fn get(&self) -> UserPreferences {
        self.current
            .lock()
            .map(|p| p.clone())
            .unwrap_or_default()
    }

    pub fn update(&self, patch: PreferencesPatch) -> UserPreferences {
        self.modify(|prefs| prefs.apply(patch))
    }

    pub fn mark_not_interested(&self, movie_id: MovieId) -> UserPreferences {
        self.modify(|prefs| {
            if !prefs.not_interested_movies.contains(&movie_id) {
                prefs.not_interested_movies.push(movie_id);
            }
        })
    }

    fn modify(&self, f: impl FnOnce(&mut UserPreferences)) -> UserPreferences {
        let updated = match self.current.lock() {
            Ok(mut prefs) => {
                f(&mut prefs);
                prefs.clone()
            }
            Err(_) => return UserPreferences::default(),
        };
        if let Err(e) = save_json(self.store.as_ref(), PREFERENCES_KEY, &updated) {
            tracing::warn!(error = %e, "failed to persist preferences");
        }
        updated
    }
}
