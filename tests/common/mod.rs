#![allow(dead_code)]

use async_trait::async_trait;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::Utc;
use cinesync::api::{CollectionKind, MovieApi, RatingRequest, Registration};
use cinesync::models::{CollectionEntry, MovieId, MovieSummary, RatedMovie, Recommendations, TokenPair};
use cinesync::notifications::NotificationQueue;
use cinesync::session::SessionManager;
use cinesync::storage::{DurableStore, MemoryStore, CREDENTIAL_KEY};
use cinesync::{ClientSettings, MovieClient, Result, SyncError};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const USER_ID: u64 = 7;
pub const USERNAME: &str = "ada";

pub fn access_token(user_id: u64, username: &str, serial: usize) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
    let claims = json!({
        "user_id": user_id,
        "username": username,
        "email": format!("{}@example.com", username),
        "exp": Utc::now().timestamp() + 300,
        "jti": serial,
    });
    format!("{}.{}.signature", header, URL_SAFE_NO_PAD.encode(claims.to_string()))
}

pub fn token_pair(serial: usize) -> TokenPair {
    TokenPair {
        access: access_token(USER_ID, USERNAME, serial),
        refresh: format!("refresh-{}", serial),
    }
}

pub fn movie(id: MovieId) -> MovieSummary {
    MovieSummary {
        id,
        title: format!("Movie {}", id),
        poster_path: None,
        release_date: Some("1999-03-31".to_string()),
        vote_average: Some(7.5),
    }
}

pub fn entry(id: MovieId) -> CollectionEntry {
    CollectionEntry {
        movie_id: id,
        movie: movie(id),
        added_at: Utc::now(),
    }
}

/// Scripted in-process stand-in for the backend.
#[derive(Default)]
pub struct FakeApi {
    pub offline: AtomicBool,
    pub reject_login: AtomicBool,
    pub reject_refresh: AtomicBool,
    pub fail_deletes: AtomicBool,
    /// Serve movie payloads without a title.
    pub untitled_movies: AtomicBool,
    pub refresh_delay_ms: AtomicU64,
    pub delete_delay_ms: AtomicU64,
    pub fetch_delay_ms: AtomicU64,
    pub issued: AtomicUsize,
    pub login_calls: AtomicUsize,
    pub refresh_calls: AtomicUsize,
    pub register_calls: AtomicUsize,
    pub add_calls: AtomicUsize,
    pub delete_calls: AtomicUsize,
    pub fetch_calls: AtomicUsize,
    pub movie_calls: AtomicUsize,
    pub search_calls: AtomicUsize,
    pub favorites: Mutex<Vec<CollectionEntry>>,
    pub watchlist: Mutex<Vec<CollectionEntry>>,
    pub recommendations: Mutex<Recommendations>,
    pub ratings: Mutex<Vec<RatingRequest>>,
}

impl FakeApi {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    pub fn count(counter: &AtomicUsize) -> usize {
        counter.load(Ordering::SeqCst)
    }

    pub fn server_collection(&self, kind: CollectionKind) -> &Mutex<Vec<CollectionEntry>> {
        match kind {
            CollectionKind::Favorites => &self.favorites,
            CollectionKind::Watchlist => &self.watchlist,
        }
    }

    pub fn seed(&self, kind: CollectionKind, ids: &[MovieId]) {
        let mut server = self.server_collection(kind).lock().unwrap();
        *server = ids.iter().copied().map(entry).collect();
    }

    pub fn seed_recommendations(&self, ids: &[MovieId]) {
        let mut recs = self.recommendations.lock().unwrap();
        recs.recommendations = ids.iter().copied().map(movie).collect();
        recs.rated_movies = vec![RatedMovie {
            movie: movie(1),
            rating: 8.0,
            feedback: None,
        }];
    }

    fn check_online(&self) -> Result<()> {
        if self.offline.load(Ordering::SeqCst) {
            Err(SyncError::Network("connection refused".to_string()))
        } else {
            Ok(())
        }
    }

    fn check_token(access_token: &str) -> Result<()> {
        if access_token.split('.').count() == 3 {
            Ok(())
        } else {
            Err(SyncError::Api {
                status: 401,
                message: "token_not_valid".to_string(),
            })
        }
    }

    async fn fetch_delay(&self) {
        let delay = self.fetch_delay_ms.load(Ordering::SeqCst);
        if delay > 0 {
            tokio::time::sleep(Duration::from_millis(delay)).await;
        }
    }

    fn issue(&self) -> TokenPair {
        let serial = self.issued.fetch_add(1, Ordering::SeqCst) + 1;
        token_pair(serial)
    }
}

#[async_trait]
impl MovieApi for FakeApi {
    async fn login(&self, username: &str, password: &str) -> Result<TokenPair> {
        self.login_calls.fetch_add(1, Ordering::SeqCst);
        self.check_online()?;
        if self.reject_login.load(Ordering::SeqCst) || username != USERNAME || password.is_empty() {
            return Err(SyncError::Auth("status 401: No active account".to_string()));
        }
        Ok(self.issue())
    }

    async fn refresh(&self, _refresh_token: &str) -> Result<TokenPair> {
        self.refresh_calls.fetch_add(1, Ordering::SeqCst);
        let delay = self.refresh_delay_ms.load(Ordering::SeqCst);
        if delay > 0 {
            tokio::time::sleep(Duration::from_millis(delay)).await;
        }
        self.check_online()?;
        if self.reject_refresh.load(Ordering::SeqCst) {
            return Err(SyncError::Auth("status 401: token_not_valid".to_string()));
        }
        Ok(self.issue())
    }

    async fn register(&self, _registration: &Registration) -> Result<()> {
        self.register_calls.fetch_add(1, Ordering::SeqCst);
        self.check_online()
    }

    async fn fetch_collection(
        &self,
        kind: CollectionKind,
        access_token: &str,
    ) -> Result<Vec<CollectionEntry>> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        self.fetch_delay().await;
        self.check_online()?;
        Self::check_token(access_token)?;
        Ok(self.server_collection(kind).lock().unwrap().clone())
    }

    async fn add_to_collection(
        &self,
        kind: CollectionKind,
        access_token: &str,
        movie_id: MovieId,
    ) -> Result<CollectionEntry> {
        self.add_calls.fetch_add(1, Ordering::SeqCst);
        self.check_online()?;
        Self::check_token(access_token)?;
        let mut server = self.server_collection(kind).lock().unwrap();
        if let Some(existing) = server.iter().find(|e| e.movie_id == movie_id) {
            return Ok(existing.clone());
        }
        let created = entry(movie_id);
        server.push(created.clone());
        Ok(created)
    }

    async fn remove_from_collection(
        &self,
        kind: CollectionKind,
        access_token: &str,
        movie_id: MovieId,
    ) -> Result<()> {
        self.delete_calls.fetch_add(1, Ordering::SeqCst);
        let delay = self.delete_delay_ms.load(Ordering::SeqCst);
        if delay > 0 {
            tokio::time::sleep(Duration::from_millis(delay)).await;
        }
        self.check_online()?;
        Self::check_token(access_token)?;
        if self.fail_deletes.load(Ordering::SeqCst) {
            return Err(SyncError::Api {
                status: 500,
                message: "delete failed".to_string(),
            });
        }
        self.server_collection(kind)
            .lock()
            .unwrap()
            .retain(|e| e.movie_id != movie_id);
        Ok(())
    }

    async fn fetch_recommendations(&self, access_token: &str) -> Result<Recommendations> {
        self.fetch_delay().await;
        self.check_online()?;
        Self::check_token(access_token)?;
        Ok(self.recommendations.lock().unwrap().clone())
    }

    async fn rate_movie(&self, access_token: &str, rating: &RatingRequest) -> Result<()> {
        self.check_online()?;
        Self::check_token(access_token)?;
        self.ratings.lock().unwrap().push(rating.clone());
        Ok(())
    }

    async fn movie(&self, movie_id: MovieId) -> Result<Value> {
        self.movie_calls.fetch_add(1, Ordering::SeqCst);
        self.check_online()?;
        if self.untitled_movies.load(Ordering::SeqCst) {
            return Ok(json!({"id": movie_id, "overview": "A test movie"}));
        }
        Ok(json!({
            "id": movie_id,
            "title": format!("Movie {}", movie_id),
            "overview": "A test movie",
        }))
    }

    async fn search(&self, query: &str, department: &str) -> Result<Value> {
        self.search_calls.fetch_add(1, Ordering::SeqCst);
        self.check_online()?;
        Ok(json!({
            "query": query,
            "department": department,
            "movies": [{"id": 1, "title": "Movie 1"}],
            "persons": [],
        }))
    }
}

pub struct SessionFixture {
    pub api: Arc<FakeApi>,
    pub store: Arc<MemoryStore>,
    pub notifications: NotificationQueue,
    pub session: SessionManager,
}

pub fn session_fixture() -> SessionFixture {
    let api = FakeApi::new();
    let store = Arc::new(MemoryStore::new());
    let notifications = NotificationQueue::new();
    let session = SessionManager::new(api.clone(), store.clone(), notifications.clone());
    SessionFixture {
        api,
        store,
        notifications,
        session,
    }
}

pub struct ClientFixture {
    pub api: Arc<FakeApi>,
    pub store: Arc<MemoryStore>,
    pub client: MovieClient,
}

pub fn client_fixture() -> ClientFixture {
    let api = FakeApi::new();
    let store = Arc::new(MemoryStore::new());
    let client = MovieClient::new(api.clone(), store.clone(), ClientSettings::default());
    ClientFixture { api, store, client }
}

/// A store whose every operation fails, as when storage quota is exhausted.
pub struct FailingStore;

impl DurableStore for FailingStore {
    fn get(&self, _key: &str) -> Result<Option<String>> {
        Err(SyncError::Storage("quota exceeded".to_string()))
    }

    fn set(&self, _key: &str, _value: &str) -> Result<()> {
        Err(SyncError::Storage("quota exceeded".to_string()))
    }

    fn remove(&self, _key: &str) -> Result<()> {
        Err(SyncError::Storage("quota exceeded".to_string()))
    }

    fn keys(&self) -> Result<Vec<String>> {
        Err(SyncError::Storage("quota exceeded".to_string()))
    }
}

/// An in-memory store whose credential writes block the calling thread, like a slow disk.
#[derive(Default)]
pub struct SlowStore {
    pub inner: MemoryStore,
    pub credential_write_delay_ms: AtomicU64,
}

impl DurableStore for SlowStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        self.inner.get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let delay = self.credential_write_delay_ms.load(Ordering::SeqCst);
        if key == CREDENTIAL_KEY && delay > 0 {
            std::thread::sleep(Duration::from_millis(delay));
        }
        self.inner.set(key, value)
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.inner.remove(key)
    }

    fn keys(&self) -> Result<Vec<String>> {
        self.inner.keys()
    }
}
