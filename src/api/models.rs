use crate::models::{CollectionEntry, MovieId, MovieSummary};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The two server-tracked per-user collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CollectionKind {
    Favorites,
    Watchlist,
}

impl CollectionKind {
    pub fn path(&self) -> &'static str {
        match self {
            CollectionKind::Favorites => "favorites",
            CollectionKind::Watchlist => "watchlist",
        }
    }
}

impl fmt::Display for CollectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

#[derive(Serialize)]
pub struct LoginRequest<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

#[derive(Serialize)]
pub struct RefreshRequest<'a> {
    pub refresh: &'a str,
}

#[derive(Serialize)]
pub struct CollectionAddRequest {
    pub movie_id: MovieId,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct Registration {
    pub username: String,
    pub email: String,
    pub firstname: String,
    pub lastname: String,
    pub password: String,
    #[serde(skip_serializing)]
    pub confirm_password: String,
}

#[derive(Serialize, Clone, Debug)]
pub struct RatingRequest {
    pub movie_id: MovieId,
    pub rating: u8,
    pub feedback: String,
}

/// Collection entry as the backend serializes it. Older endpoints omit
/// `movie_id` and `added_at`, so both fall back to the embedded movie and now.
#[derive(Deserialize)]
pub struct CollectionEntryWire {
    #[serde(default)]
    pub movie_id: Option<MovieId>,
    pub movie: MovieSummary,
    #[serde(default)]
    pub added_at: Option<DateTime<Utc>>,
}

impl From<CollectionEntryWire> for CollectionEntry {
    fn from(wire: CollectionEntryWire) -> Self {
        CollectionEntry {
            movie_id: wire.movie_id.unwrap_or(wire.movie.id),
            movie: wire.movie,
            added_at: wire.added_at.unwrap_or_else(Utc::now),
        }
    }
}

#[derive(Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub detail: Option<String>,
}
