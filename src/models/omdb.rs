use serde::{Deserialize, Serialize};

/// One page of OMDb search results (`?s=`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OmdbSearchResponse {
    #[serde(rename = "Search", default)]
    pub search: Vec<OmdbMovieSummary>,
    #[serde(rename = "totalResults", default)]
    pub total_results: Option<String>,
    #[serde(rename = "Response")]
    pub response: String,
    #[serde(rename = "Error", default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl OmdbSearchResponse {
    pub fn is_success(&self) -> bool {
        self.response == "True"
    }

    pub fn total(&self) -> usize {
        self.total_results
            .as_deref()
            .and_then(|t| t.parse().ok())
            .unwrap_or(0)
    }

    /// Aggregate several pages under the same response shape
    pub fn combined(search: Vec<OmdbMovieSummary>, total: usize) -> Self {
        let response = if search.is_empty() { "False" } else { "True" };
        Self {
            search,
            total_results: Some(total.to_string()),
            response: response.to_string(),
            error: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OmdbMovieSummary {
    #[serde(rename = "Title")]
    pub title: String,
    #[serde(rename = "Year", default)]
    pub year: Option<String>,
    #[serde(rename = "imdbID")]
    pub imdb_id: String,
    #[serde(rename = "Type", default)]
    pub movie_type: Option<String>,
    #[serde(rename = "Poster", default)]
    pub poster: Option<String>,
}

/// Full record from `?i=<imdb id>&plot=full`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct OmdbMovieDetails {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub year: Option<String>,
    #[serde(default)]
    pub rated: Option<String>,
    #[serde(default)]
    pub released: Option<String>,
    #[serde(default)]
    pub runtime: Option<String>,
    #[serde(default)]
    pub genre: Option<String>,
    #[serde(default)]
    pub director: Option<String>,
    #[serde(default)]
    pub writer: Option<String>,
    #[serde(default)]
    pub actors: Option<String>,
    #[serde(default)]
    pub plot: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub poster: Option<String>,
    #[serde(rename = "imdbRating", default)]
    pub imdb_rating: Option<String>,
    #[serde(rename = "imdbID", default)]
    pub imdb_id: String,
    #[serde(rename = "Type", default)]
    pub movie_type: Option<String>,
    pub response: String,
    #[serde(default)]
    pub error: Option<String>,
}

impl OmdbMovieDetails {
    pub fn is_success(&self) -> bool {
        self.response == "True"
    }
}
