use crate::api::{CollectionKind, HttpMovieApi, MovieApi, Registration};
use crate::cache::{CatalogReader, TtlCache};
use crate::collections::{CollectionSynchronizer, RecommendationFeed};
use crate::config::Config;
use crate::error::Result;
use crate::history::{SearchHistory, ViewedMovies, WatchHistory};
use crate::models::{MovieId, MovieSummary, Severity, User};
use crate::navigation::{Navigator, PendingNavigation, Route};
use crate::notifications::NotificationQueue;
use crate::preferences::PreferencesStore;
use crate::session::{SessionManager, REFRESH_DEBOUNCE, REFRESH_INTERVAL};
use crate::storage::{DurableStore, FilesystemStore};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

#[derive(Debug, Clone, Copy)]
pub struct ClientSettings {
    pub refresh_debounce: Duration,
    pub refresh_interval: Duration,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            refresh_debounce: REFRESH_DEBOUNCE,
            refresh_interval: REFRESH_INTERVAL,
        }
    }
}

/// The session-scoped state container: wires every component to the one session.
pub struct MovieClient {
    session: SessionManager,
    favorites: CollectionSynchronizer,
    watchlist: CollectionSynchronizer,
    recommendations: RecommendationFeed,
    catalog: CatalogReader,
    notifications: NotificationQueue,
    navigation: Arc<PendingNavigation>,
    watch_history: WatchHistory,
    search_history: SearchHistory,
    preferences: PreferencesStore,
    settings: ClientSettings,
}

impl MovieClient {
    pub fn new(
        api: Arc<dyn MovieApi>,
        store: Arc<dyn DurableStore>,
        settings: ClientSettings,
    ) -> Self {
        let notifications = NotificationQueue::new();
        let navigation = Arc::new(PendingNavigation::new());
        let session = SessionManager::with_debounce(
            api.clone(),
            store.clone(),
            notifications.clone(),
            settings.refresh_debounce,
        );

        let collection = |kind| {
            CollectionSynchronizer::new(
                kind,
                session.clone(),
                api.clone(),
                notifications.clone(),
                navigation.clone(),
            )
        };
        let favorites = collection(CollectionKind::Favorites);
        let watchlist = collection(CollectionKind::Watchlist);
        let recommendations =
            RecommendationFeed::new(session.clone(), api.clone(), notifications.clone());

        let catalog = CatalogReader::new(
            api,
            TtlCache::new(store.clone()),
            ViewedMovies::new(store.clone()),
        );

        let watch_history = WatchHistory::new();
        let search_history = SearchHistory::new();
        watch_history.clear_on_logout(&session);
        search_history.clear_on_logout(&session);

        Self {
            session,
            favorites,
            watchlist,
            recommendations,
            catalog,
            notifications,
            navigation,
            watch_history,
            search_history,
            preferences: PreferencesStore::load(store),
            settings,
        }
    }

    /// Client talking HTTP to the configured backend and persisting to the data directory.
    pub fn from_config(config: &Config) -> Result<Self> {
        let api = HttpMovieApi::new(&config.api_base_url, config.request_timeout)?;
        let store = FilesystemStore::new(&config.data_dir)?;
        Ok(Self::new(
            Arc::new(api),
            Arc::new(store),
            ClientSettings {
                refresh_debounce: config.refresh_debounce,
                refresh_interval: config.refresh_interval,
            },
        ))
    }

    /// Restore a persisted session, refresh it eagerly and load session data.
    ///
    /// Returns the user when a session survived the refresh.
    pub async fn bootstrap(&self) -> Option<User> {
        self.session.restore()?;
        match self.session.refresh().await {
            Ok(credential) => {
                self.sync_all().await;
                Some(credential.user)
            }
            Err(e) => {
                tracing::info!(error = %e, "stored session could not be refreshed");
                None
            }
        }
    }

    pub async fn login(&self, username: &str, password: &str) -> Result<User> {
        let user = self.session.login(username, password).await?;
        self.navigation.request(Route::Home);
        self.sync_all().await;
        Ok(user)
    }

    pub fn logout(&self) {
        self.session.logout();
    }

    pub async fn register(&self, form: &Registration) -> Result<()> {
        self.session.register(form).await?;
        self.notifications
            .push("Registration successful. Please log in.", Severity::Success);
        self.navigation.request(Route::Login);
        Ok(())
    }

    /// Reconcile every session-scoped collection with the server.
    pub async fn sync_all(&self) {
        let (favorites, watchlist, recommendations) = tokio::join!(
            self.favorites.refetch(),
            self.watchlist.refetch(),
            self.recommendations.refetch()
        );
        if let Err(e) = favorites {
            tracing::debug!(error = %e, "initial favorites fetch failed");
        }
        if let Err(e) = watchlist {
            tracing::debug!(error = %e, "initial watchlist fetch failed");
        }
        if let Err(e) = recommendations {
            tracing::debug!(error = %e, "initial recommendations fetch failed");
        }
    }

    pub fn spawn_refresh_loop(&self) -> JoinHandle<()> {
        self.session
            .spawn_refresh_loop(self.settings.refresh_interval)
    }

    /// Movie details through the cache. Opening a movie records it in the watch history.
    pub async fn movie(&self, movie_id: MovieId) -> Result<Value> {
        let movie = self.catalog.movie(movie_id).await?;
        match serde_json::from_value::<MovieSummary>(movie.clone()) {
            Ok(summary) => self.watch_history.record(summary),
            Err(e) => {
                tracing::debug!(movie_id, error = %e, "movie payload not recorded in watch history")
            }
        }
        Ok(movie)
    }

    pub async fn search(&self, query: &str, department: Option<&str>) -> Result<Value> {
        let trimmed = query.trim();
        if !trimmed.is_empty() {
            self.search_history.record(trimmed.to_string());
        }
        self.catalog.search(trimmed, department).await
    }

    pub fn collection(&self, kind: CollectionKind) -> &CollectionSynchronizer {
        match kind {
            CollectionKind::Favorites => &self.favorites,
            CollectionKind::Watchlist => &self.watchlist,
        }
    }

    pub fn session(&self) -> &SessionManager {
        &self.session
    }

    pub fn favorites(&self) -> &CollectionSynchronizer {
        &self.favorites
    }

    pub fn watchlist(&self) -> &CollectionSynchronizer {
        &self.watchlist
    }

    pub fn recommendations(&self) -> &RecommendationFeed {
        &self.recommendations
    }

    pub fn catalog(&self) -> &CatalogReader {
        &self.catalog
    }

    pub fn notifications(&self) -> &NotificationQueue {
        &self.notifications
    }

    pub fn navigation(&self) -> &PendingNavigation {
        &self.navigation
    }

    pub fn watch_history(&self) -> &WatchHistory {
        &self.watch_history
    }

    pub fn search_history(&self) -> &SearchHistory {
        &self.search_history
    }

    pub fn preferences(&self) -> &PreferencesStore {
        &self.preferences
    }
}
