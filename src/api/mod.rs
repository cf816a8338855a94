pub mod client;
pub mod models;
pub mod response;

pub use client::HttpMovieApi;
pub use models::{CollectionKind, RatingRequest, Registration};

use crate::error::Result;
use crate::models::{CollectionEntry, MovieId, Recommendations, TokenPair};
use async_trait::async_trait;
use serde_json::Value;

/// The backend operations the client core depends on.
///
/// Implementations map non-2xx auth responses to `SyncError::Auth`, transport
/// failures to `SyncError::Network`, and any other non-2xx to `SyncError::Api`.
#[async_trait]
pub trait MovieApi: Send + Sync {
    async fn login(&self, username: &str, password: &str) -> Result<TokenPair>;

    async fn refresh(&self, refresh_token: &str) -> Result<TokenPair>;

    async fn register(&self, registration: &Registration) -> Result<()>;

    async fn fetch_collection(
        &self,
        kind: CollectionKind,
        access_token: &str,
    ) -> Result<Vec<CollectionEntry>>;

    async fn add_to_collection(
        &self,
        kind: CollectionKind,
        access_token: &str,
        movie_id: MovieId,
    ) -> Result<CollectionEntry>;

    async fn remove_from_collection(
        &self,
        kind: CollectionKind,
        access_token: &str,
        movie_id: MovieId,
    ) -> Result<()>;

    async fn fetch_recommendations(&self, access_token: &str) -> Result<Recommendations>;

    async fn rate_movie(&self, access_token: &str, rating: &RatingRequest) -> Result<()>;

    async fn movie(&self, movie_id: MovieId) -> Result<Value>;

    async fn search(&self, query: &str, department: &str) -> Result<Value>;
}
