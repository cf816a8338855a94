use super::TtlCache;
use crate::api::MovieApi;
use crate::error::Result;
use crate::history::ViewedMovies;
use crate::models::MovieId;
use serde_json::Value;
use std::sync::Arc;

pub const DEFAULT_DEPARTMENT: &str = "movies";

/// Lower-case, trim and collapse inner whitespace so equivalent searches share a key.
pub fn normalize_query(query: &str) -> String {
    query
        .split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Unauthenticated catalog lookups served through the TTL cache.
#[derive(Clone)]
pub struct CatalogReader {
    api: Arc<dyn MovieApi>,
    cache: TtlCache,
    viewed: ViewedMovies,
}

impl CatalogReader {
    pub fn new(api: Arc<dyn MovieApi>, cache: TtlCache, viewed: ViewedMovies) -> Self {
        Self { api, cache, viewed }
    }

    pub fn cache(&self) -> &TtlCache {
        &self.cache
    }

    pub fn viewed(&self) -> &ViewedMovies {
        &self.viewed
    }

    pub fn movie_key(movie_id: MovieId) -> String {
        format!("movie_{}", movie_id)
    }

    /// The department is part of the key so results for different tabs never mix.
    pub fn search_key(query: &str, department: &str) -> String {
        format!("search_{}_{}", normalize_query(query), department)
    }

    pub async fn movie(&self, movie_id: MovieId) -> Result<Value> {
        let api = self.api.clone();
        let movie = self
            .cache
            .get_or_fetch(&Self::movie_key(movie_id), || async move {
                api.movie(movie_id).await
            })
            .await?;
        self.viewed.record(movie_id);
        Ok(movie)
    }

    pub async fn search(&self, query: &str, department: Option<&str>) -> Result<Value> {
        let department = department.unwrap_or(DEFAULT_DEPARTMENT);
        let normalized = normalize_query(query);
        let api = self.api.clone();
        let key = Self::search_key(&normalized, department);
        self.cache
            .get_or_fetch(&key, || async move { api.search(&normalized, department).await })
            .await
    }
}
