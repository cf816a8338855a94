use crate::api::{MovieApi, RatingRequest};
use crate::error::{Result, SyncError};
use crate::models::{MovieId, Recommendations, Severity};
use crate::notifications::NotificationQueue;
use crate::session::{SessionListener, SessionManager};
use std::sync::{Arc, Mutex};

pub const MIN_RATING: u8 = 1;
pub const MAX_RATING: u8 = 10;

/// Personalised recommendations plus the user's own ratings.
#[derive(Clone)]
pub struct RecommendationFeed {
    inner: Arc<FeedInner>,
}

struct FeedInner {
    session: SessionManager,
    api: Arc<dyn MovieApi>,
    notifications: NotificationQueue,
    current: Mutex<Recommendations>,
}

impl RecommendationFeed {
    pub fn new(
        session: SessionManager,
        api: Arc<dyn MovieApi>,
        notifications: NotificationQueue,
    ) -> Self {
        let inner = Arc::new(FeedInner {
            session: session.clone(),
            api,
            notifications,
            current: Mutex::new(Recommendations::default()),
        });
        session.add_listener(&inner);
        Self { inner }
    }

    pub fn current(&self) -> Recommendations {
        self.inner
            .current
            .lock()
            .map(|c| c.clone())
            .unwrap_or_default()
    }

    /// Reload from the server. A failed fetch leaves the feed empty rather than stale.
    pub async fn refetch(&self) -> Result<Recommendations> {
        let (token, generation) = self
            .inner
            .session
            .access()
            .ok_or(SyncError::Unauthenticated)?;

        let fetched = self.inner.api.fetch_recommendations(&token).await;
        let replacement = match &fetched {
            Ok(recommendations) => recommendations.clone(),
            Err(_) => Recommendations::default(),
        };
        if !self.replace(generation, replacement) {
            return Err(SyncError::StaleSession);
        }
        match fetched {
            Ok(recommendations) => {
                tracing::debug!(
                    recommended = recommendations.recommendations.len(),
                    rated = recommendations.rated_movies.len(),
                    "recommendations refreshed"
                );
                Ok(recommendations)
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to fetch recommendations");
                Err(e)
            }
        }
    }

    /// Rate a movie on the 1..=10 scale, then reload recommendations.
    pub async fn rate(&self, movie_id: MovieId, rating: u8, feedback: Option<String>) -> Result<()> {
        if !(MIN_RATING..=MAX_RATING).contains(&rating) {
            return Err(SyncError::Validation(format!(
                "rating must be between {} and {}",
                MIN_RATING, MAX_RATING
            )));
        }
        let (token, _) = self
            .inner
            .session
            .access()
            .ok_or(SyncError::Unauthenticated)?;

        let request = RatingRequest {
            movie_id,
            rating,
            feedback: feedback.unwrap_or_default(),
        };
        if let Err(e) = self.inner.api.rate_movie(&token, &request).await {
            tracing::warn!(movie_id, error = %e, "rating failed");
            self.inner
                .notifications
                .push("Failed to rate movie", Severity::Error);
            return Err(e);
        }

        if let Err(e) = self.refetch().await {
            tracing::debug!(error = %e, "recommendation refresh after rating failed");
        }
        Ok(())
    }

    /// Swap in `recommendations` if `generation` is still the live session. The check
    /// runs under the same lock logout uses to empty the feed.
    fn replace(&self, generation: u64, recommendations: Recommendations) -> bool {
        let Ok(mut current) = self.inner.current.lock() else {
            return false;
        };
        if !self.inner.session.is_current(generation) {
            tracing::debug!("discarding recommendations for an ended session");
            return false;
        }
        *current = recommendations;
        true
    }
}

impl SessionListener for FeedInner {
    fn session_cleared(&self) {
        if let Ok(mut current) = self.current.lock() {
            *current = Recommendations::default();
        }
    }
}
