use std::sync::Arc;

use crate::{db::EmotionRepository, error::AppResult, models::EmotionGenreMap};

/// Mood label that is answered from ratings and age instead of genres
pub const NOSTALGIC: &str = "nostalgic";

const DEFAULT_MAPPINGS: &[(&str, &[&str])] = &[
    ("romantic", &["Romance", "Drama"]),
    ("exciting", &["Action", "Adventure", "Thriller"]),
    ("happy", &["Comedy", "Animation", "Adventure", "Family"]),
    ("emotional", &["Drama", "Romance"]),
    ("uplifting", &["Comedy", "Family", "Adventure"]),
    ("mysterious", &["Mystery", "Thriller", "Crime"]),
    ("cozy", &["Comedy", "Family", "Romance"]),
    ("passionate", &["Romance", "Drama"]),
    ("inspiring", &["Drama", "Biography"]),
    ("thrilling", &["Thriller", "Action", "Crime"]),
    ("melancholic", &["Drama", "Romance"]),
    ("euphoric", &["Comedy", "Music", "Adventure"]),
    ("adventurous", &["Adventure", "Action", "Sci-Fi"]),
    ("terrifying", &["Horror", "Thriller"]),
    ("haunting", &["Horror", "Mystery", "Drama"]),
    ("playful", &["Comedy", "Animation", "Family"]),
    ("whimsical", &["Animation", "Fantasy", "Comedy"]),
    ("intense", &["Thriller", "Action", "Drama"]),
    ("peaceful", &["Documentary", "Family", "Comedy"]),
    ("empowering", &["Action", "Drama", "Biography"]),
    ("heartwarming", &["Family", "Comedy", "Drama"]),
    ("cathartic", &["Drama", "Romance"]),
    ("surreal", &["Fantasy", "Sci-Fi", "Animation"]),
    ("contemplative", &["Drama", "Documentary"]),
    ("rebellious", &["Action", "Crime", "Thriller"]),
    ("protective", &["Action", "Family", "Drama"]),
    ("energetic", &["Action", "Comedy", "Music"]),
    ("dramatic", &["Drama", "Thriller"]),
    ("comforting", &["Comedy", "Family", "Romance"]),
    ("bittersweet", &["Drama", "Romance"]),
    ("sophisticated", &["Drama", "Crime", "Mystery"]),
    ("liberating", &["Adventure", "Drama", "Comedy"]),
];

pub fn default_mappings() -> Vec<(String, Vec<String>)> {
    DEFAULT_MAPPINGS
        .iter()
        .map(|(emotion, genres)| {
            (
                emotion.to_string(),
                genres.iter().map(|g| g.to_string()).collect(),
            )
        })
        .collect()
}

pub fn is_nostalgic(emotion: &str) -> bool {
    emotion.trim().eq_ignore_ascii_case(NOSTALGIC)
}

#[derive(Clone)]
pub struct EmotionService {
    emotions: Arc<dyn EmotionRepository>,
}

impl EmotionService {
    pub fn new(emotions: Arc<dyn EmotionRepository>) -> Self {
        Self { emotions }
    }

    /// Write the default mappings when the table is empty. Never fails startup.
    pub async fn seed_if_empty(&self) {
        match self.emotions.count().await {
            Ok(0) => {
                let mappings = default_mappings();
                let count = mappings.len();
                match self.emotions.insert_many(mappings).await {
                    Ok(()) => tracing::info!(count, "Seeded emotion-genre mappings"),
                    Err(e) => tracing::error!(error = %e, "Failed to seed emotion-genre mappings"),
                }
            }
            Ok(existing) => {
                tracing::debug!(existing, "Emotion-genre mappings already present")
            }
            Err(e) => tracing::error!(error = %e, "Failed to count emotion-genre mappings"),
        }
    }

    /// Genres mapped to `emotion`; unknown emotions and lookup failures give none
    pub async fn genres_for_emotion(&self, emotion: &str) -> Vec<String> {
        let key = emotion.trim().to_lowercase();
        match self.emotions.find(&key).await {
            Ok(Some(mapping)) => mapping.genres,
            Ok(None) => Vec::new(),
            Err(e) => {
                tracing::warn!(emotion = %key, error = %e, "Emotion lookup failed");
                Vec::new()
            }
        }
    }

    /// Union of the genres of several emotions, first occurrence wins.
    /// Returns whether `nostalgic` was among them.
    pub async fn genres_for_emotions(&self, emotions: &[String]) -> (Vec<String>, bool) {
        let mut genres: Vec<String> = Vec::new();
        let mut nostalgic = false;
        for emotion in emotions {
            if is_nostalgic(emotion) {
                nostalgic = true;
                continue;
            }
            for genre in self.genres_for_emotion(emotion).await {
                if !genres.contains(&genre) {
                    genres.push(genre);
                }
            }
        }
        (genres, nostalgic)
    }

    pub async fn all(&self) -> AppResult<Vec<EmotionGenreMap>> {
        self.emotions.all().await
    }
}
