use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub type MovieId = u64;

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct MovieSummary {
    pub id: MovieId,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub poster_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vote_average: Option<f64>,
}

/// One item of the favorites or watchlist collection, keyed by `movie_id`.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct CollectionEntry {
    pub movie_id: MovieId,
    pub movie: MovieSummary,
    pub added_at: DateTime<Utc>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct RatedMovie {
    pub movie: MovieSummary,
    pub rating: f64,
    #[serde(default)]
    pub feedback: Option<String>,
}

/// Personalised listing returned by the recommendations endpoint.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct Recommendations {
    #[serde(default)]
    pub recommendations: Vec<MovieSummary>,
    #[serde(default)]
    pub rated_movies: Vec<RatedMovie>,
}

impl Recommendations {
    pub fn is_empty(&self) -> bool {
        self.recommendations.is_empty() && self.rated_movies.is_empty()
    }
}
