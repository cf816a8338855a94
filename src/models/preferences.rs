use super::MovieId;
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct UserPreferences {
    pub autoplay_trailers: bool,
    pub show_adult_content: bool,
    pub language: String,
    pub video_quality: String,
    #[serde(default)]
    pub preferred_genres: Vec<String>,
    #[serde(default)]
    pub preferred_actors: Vec<String>,
    #[serde(default)]
    pub not_interested_movies: Vec<MovieId>,
}

impl Default for UserPreferences {
    fn default() -> Self {
        Self {
            autoplay_trailers: true,
            show_adult_content: false,
            language: "en".to_string(),
            video_quality: "hd".to_string(),
            preferred_genres: vec![],
            preferred_actors: vec![],
            not_interested_movies: vec![],
        }
    }
}

/// Partial update; `None` fields keep their current value.
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct PreferencesPatch {
    #[serde(default)]
    pub autoplay_trailers: Option<bool>,
    #[serde(default)]
    pub show_adult_content: Option<bool>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub video_quality: Option<String>,
    #[serde(default)]
    pub preferred_genres: Option<Vec<String>>,
    #[serde(default)]
    pub preferred_actors: Option<Vec<String>>,
}

impl UserPreferences {
    pub fn apply(&mut self, patch: PreferencesPatch) {
        if let Some(value) = patch.autoplay_trailers {
            self.autoplay_trailers = value;
        }
        if let Some(value) = patch.show_adult_content {
            self.show_adult_content = value;
        }
        if let Some(value) = patch.language {
            self.language = value;
        }
        if let Some(value) = patch.video_quality {
            self.video_quality = value;
        }
        if let Some(value) = patch.preferred_genres {
            self.preferred_genres = value;
        }
        if let Some(value) = patch.preferred_actors {
            self.preferred_actors = value;
        }
    }
}
