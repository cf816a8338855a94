use super::models::{
    CollectionAddRequest, CollectionEntryWire, CollectionKind, LoginRequest, RatingRequest,
    RefreshRequest, Registration,
};
use super::response::{decode_json, ensure_success, into_auth_error};
use super::MovieApi;
use crate::error::{Result, SyncError};
use crate::models::{CollectionEntry, MovieId, Recommendations, TokenPair};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde_json::Value;
use std::time::Duration;

/// `MovieApi` over HTTP with JSON bodies and bearer authentication.
pub struct HttpMovieApi {
    base_url: String,
    client: reqwest::Client,
}

impl HttpMovieApi {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn bearer(access_token: &str) -> Result<HeaderValue> {
        HeaderValue::from_str(&format!("Bearer {}", access_token))
            .map_err(|e| SyncError::Auth(format!("Invalid authorization header: {}", e)))
    }
}

#[async_trait]
impl MovieApi for HttpMovieApi {
    async fn login(&self, username: &str, password: &str) -> Result<TokenPair> {
        let response = self
            .client
            .post(self.url("/auth/login"))
            .json(&LoginRequest { username, password })
            .send()
            .await?;
        decode_json(response).await.map_err(into_auth_error)
    }

    async fn refresh(&self, refresh_token: &str) -> Result<TokenPair> {
        let response = self
            .client
            .post(self.url("/auth/refresh"))
            .json(&RefreshRequest {
                refresh: refresh_token,
            })
            .send()
            .await?;
        decode_json(response).await.map_err(into_auth_error)
    }

    async fn register(&self, registration: &Registration) -> Result<()> {
        let response = self
            .client
            .post(self.url("/auth/register"))
            .json(registration)
            .send()
            .await?;
        ensure_success(response).await?;
        Ok(())
    }

    async fn fetch_collection(
        &self,
        kind: CollectionKind,
        access_token: &str,
    ) -> Result<Vec<CollectionEntry>> {
        let response = self
            .client
            .get(self.url(kind.path()))
            .header(AUTHORIZATION, Self::bearer(access_token)?)
            .send()
            .await?;
        let entries: Vec<CollectionEntryWire> = decode_json(response).await?;
        Ok(entries.into_iter().map(CollectionEntry::from).collect())
    }

    async fn add_to_collection(
        &self,
        kind: CollectionKind,
        access_token: &str,
        movie_id: MovieId,
    ) -> Result<CollectionEntry> {
        let response = self
            .client
            .post(self.url(&format!("{}/add", kind.path())))
            .header(AUTHORIZATION, Self::bearer(access_token)?)
            .json(&CollectionAddRequest { movie_id })
            .send()
            .await?;
        let entry: CollectionEntryWire = decode_json(response).await?;
        Ok(entry.into())
    }

    async fn remove_from_collection(
        &self,
        kind: CollectionKind,
        access_token: &str,
        movie_id: MovieId,
    ) -> Result<()> {
        let response = self
            .client
            .delete(self.url(&format!("{}/{}", kind.path(), movie_id)))
            .header(AUTHORIZATION, Self::bearer(access_token)?)
            .send()
            .await?;
        ensure_success(response).await?;
        Ok(())
    }

    async fn fetch_recommendations(&self, access_token: &str) -> Result<Recommendations> {
        let response = self
            .client
            .get(self.url("/recommendations"))
            .header(AUTHORIZATION, Self::bearer(access_token)?)
            .send()
            .await?;
        decode_json(response).await
    }

    async fn rate_movie(&self, access_token: &str, rating: &RatingRequest) -> Result<()> {
        let response = self
            .client
            .post(self.url("/ratings"))
            .header(AUTHORIZATION, Self::bearer(access_token)?)
            .json(rating)
            .send()
            .await?;
        ensure_success(response).await?;
        Ok(())
    }

    async fn movie(&self, movie_id: MovieId) -> Result<Value> {
        let response = self
            .client
            .get(self.url(&format!("/movies/{}", movie_id)))
            .send()
            .await?;
        decode_json(response).await
    }

    async fn search(&self, query: &str, department: &str) -> Result<Value> {
        let response = self
            .client
            .get(self.url("/search"))
            .query(&[("query", query), ("department", department)])
            .send()
            .await?;
        decode_json(response).await
    }
}
