use std::{
    collections::{HashMap, HashSet},
    sync::Arc,
};

use crate::{
    db::MovieRepository,
    error::{AppError, AppResult},
    models::{
        movie::{nostalgic, NOSTALGIC_MIN_RATING},
        Movie, MovieDocument, OmdbMovieSummary, OmdbSearchResponse,
    },
    services::{
        emotions::{is_nostalgic, EmotionService},
        providers::MovieCatalog,
        search_index::MovieIndex,
    },
};

/// Upper bound on OMDb pages fetched by `search_all` (10 results per page)
pub const MAX_SEARCH_PAGES: u32 = 15;

/// Movie lookups over the local cache, falling back to the catalog.
///
/// Everything the catalog returns is written to PostgreSQL and the search
/// index so later genre, emotion and fuzzy queries can find it.
#[derive(Clone)]
pub struct MovieService {
    movies: Arc<dyn MovieRepository>,
    index: Arc<dyn MovieIndex>,
    catalog: Arc<dyn MovieCatalog>,
    emotions: EmotionService,
}

impl MovieService {
    pub fn new(
        movies: Arc<dyn MovieRepository>,
        index: Arc<dyn MovieIndex>,
        catalog: Arc<dyn MovieCatalog>,
        emotions: EmotionService,
    ) -> Self {
        Self {
            movies,
            index,
            catalog,
            emotions,
        }
    }

    /// One page of catalog results. New summaries are cached in the background.
    #[tracing::instrument(skip(self))]
    pub async fn search(&self, title: &str) -> AppResult<OmdbSearchResponse> {
        let page = self.catalog.search(title, 1).await?;
        if page.is_success() {
            self.cache_summaries_in_background(page.search.clone());
        }
        Ok(page)
    }

    /// Walk catalog pages until every result is collected or the page cap is hit
    #[tracing::instrument(skip(self))]
    pub async fn search_all(&self, title: &str) -> AppResult<OmdbSearchResponse> {
        let mut collected: Vec<OmdbMovieSummary> = Vec::new();
        let mut total = 0;

        for page_number in 1..=MAX_SEARCH_PAGES {
            let page = match self.catalog.search(title, page_number).await {
                Ok(page) => page,
                Err(e) if page_number > 1 => {
                    tracing::warn!(page = page_number, error = %e, "Stopping multi-page search early");
                    break;
                }
                Err(e) => return Err(e),
            };
            if !page.is_success() {
                break;
            }
            if page_number == 1 {
                total = page.total();
            }
            collected.extend(page.search);
            if collected.len() >= total {
                break;
            }
        }

        tracing::info!(
            provider = self.catalog.name(),
            collected = collected.len(),
            total,
            "Multi-page search finished"
        );
        if !collected.is_empty() {
            self.cache_summaries_in_background(collected.clone());
        }
        Ok(OmdbSearchResponse::combined(collected, total))
    }

    /// Fuzzy title search over cached movies
    pub async fn advanced_search(&self, query: &str) -> AppResult<Vec<Movie>> {
        let ids = self.index.search_title(query).await?;
        self.hydrate(ids).await
    }

    /// Cached movies matching any of `genres`; backend failures give no results
    pub async fn by_genres(&self, genres: &[String]) -> Vec<Movie> {
        let genres: Vec<String> = genres
            .iter()
            .map(|g| g.trim().to_string())
            .filter(|g| !g.is_empty())
            .collect();
        if genres.is_empty() {
            return Vec::new();
        }

        self.genre_matches(genres).await.unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Genre search failed");
            Vec::new()
        })
    }

    /// Highly rated movies that are at least ten years old
    pub async fn nostalgic(&self) -> Vec<Movie> {
        match self.movies.rated_above(NOSTALGIC_MIN_RATING).await {
            Ok(movies) => nostalgic(movies),
            Err(e) => {
                tracing::warn!(error = %e, "Nostalgic lookup failed");
                Vec::new()
            }
        }
    }

    pub async fn by_emotion(&self, emotion: &str) -> Vec<Movie> {
        if is_nostalgic(emotion) {
            return self.nostalgic().await;
        }
        let genres = self.emotions.genres_for_emotion(emotion).await;
        self.by_genres(&genres).await
    }

    /// Union over several emotions, deduplicated by IMDb id (first one kept)
    pub async fn by_emotions(&self, emotions: &[String]) -> Vec<Movie> {
        let (genres, include_nostalgic) = self.emotions.genres_for_emotions(emotions).await;

        let mut results = self.by_genres(&genres).await;
        if include_nostalgic {
            results.extend(self.nostalgic().await);
        }

        let mut seen = HashSet::new();
        results.retain(|m| seen.insert(m.imdb_id.clone()));
        results
    }

    /// Intersection of every criterion that was given. No criteria, no movies.
    pub async fn filter(
        &self,
        genres: &[String],
        emotions: &[String],
        nostalgic: bool,
    ) -> Vec<Movie> {
        let (emotion_genres, emotion_nostalgic) =
            self.emotions.genres_for_emotions(emotions).await;
        let include_nostalgic = nostalgic || emotion_nostalgic;

        let mut criteria: Vec<Vec<Movie>> = Vec::new();
        if genres.iter().any(|g| !g.trim().is_empty()) {
            criteria.push(self.by_genres(genres).await);
        }
        if !emotion_genres.is_empty() {
            criteria.push(self.by_genres(&emotion_genres).await);
        }
        if include_nostalgic {
            criteria.push(self.nostalgic().await);
        }

        intersect(criteria)
    }

    pub async fn random(&self) -> AppResult<Movie> {
        self.movies
            .random()
            .await?
            .ok_or_else(|| AppError::NotFound("No movies cached yet".to_string()))
    }

    /// Cached movie, or the catalog record which is then cached
    #[tracing::instrument(skip(self))]
    pub async fn details(&self, imdb_id: &str) -> AppResult<Movie> {
        if let Some(movie) = self.movies.find(imdb_id).await? {
            return Ok(movie);
        }
        self.fetch_and_store(imdb_id).await
    }

    /// IMDb rating per cached id; ids that are not cached are left out
    pub async fn batch_ratings(&self, ids: Vec<String>) -> AppResult<HashMap<String, Option<f64>>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        let movies = self.movies.find_many(ids).await?;
        Ok(movies
            .into_iter()
            .map(|m| (m.imdb_id, m.imdb_rating))
            .collect())
    }

    /// Make sure a movie is cached locally without holding up the caller
    pub fn ensure_cached(&self, imdb_id: &str) {
        let service = self.clone();
        let imdb_id = imdb_id.to_string();
        tokio::spawn(async move {
            match service.movies.find(&imdb_id).await {
                Ok(Some(_)) => {}
                Ok(None) => {
                    if let Err(e) = service.fetch_and_store(&imdb_id).await {
                        tracing::warn!(imdb_id = %imdb_id, error = %e, "Failed to cache movie");
                    }
                }
                Err(e) => tracing::warn!(imdb_id = %imdb_id, error = %e, "Cache lookup failed"),
            }
        });
    }

    /// Write summaries that are not cached yet to PostgreSQL and the index
    pub async fn store_summaries(&self, summaries: Vec<OmdbMovieSummary>) -> AppResult<u64> {
        if summaries.is_empty() {
            return Ok(0);
        }
        let ids: Vec<String> = summaries.iter().map(|s| s.imdb_id.clone()).collect();
        let existing: HashSet<String> = self.movies.existing_ids(ids).await?.into_iter().collect();

        let mut seen = HashSet::new();
        let new_movies: Vec<Movie> = summaries
            .iter()
            .filter(|s| !existing.contains(&s.imdb_id) && seen.insert(s.imdb_id.clone()))
            .map(Movie::from)
            .collect();
        if new_movies.is_empty() {
            return Ok(0);
        }

        let documents = new_movies.iter().map(MovieDocument::from).collect();
        let written = self.movies.insert_new(new_movies).await?;
        self.index.index_many(documents).await?;
        tracing::info!(count = written, "Cached new movie summaries");
        Ok(written)
    }

    fn cache_summaries_in_background(&self, summaries: Vec<OmdbMovieSummary>) {
        if summaries.is_empty() {
            return;
        }
        let service = self.clone();
        tokio::spawn(async move {
            if let Err(e) = service.store_summaries(summaries).await {
                tracing::warn!(error = %e, "Failed to cache movie summaries");
            }
        });
    }

    async fn fetch_and_store(&self, imdb_id: &str) -> AppResult<Movie> {
        let details = self.catalog.movie_details(imdb_id).await?;
        if !details.is_success() {
            return Err(AppError::NotFound(
                details
                    .error
                    .unwrap_or_else(|| "Movie not found".to_string()),
            ));
        }

        let movie = Movie::from(&details);
        self.movies.upsert(movie.clone()).await?;
        if let Err(e) = self.index.index(MovieDocument::from(&movie)).await {
            tracing::warn!(imdb_id = %movie.imdb_id, error = %e, "Failed to index movie");
        }
        tracing::info!(imdb_id = %movie.imdb_id, title = %movie.title, "Cached movie details");
        Ok(movie)
    }

    async fn genre_matches(&self, genres: Vec<String>) -> AppResult<Vec<Movie>> {
        let ids = self.index.search_genres(genres).await?;
        self.hydrate(ids).await
    }

    /// Cached movies for ids, in the order of the ids. Uncached ids are skipped.
    pub async fn hydrate(&self, ids: Vec<String>) -> AppResult<Vec<Movie>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let mut by_id: HashMap<String, Movie> = self
            .movies
            .find_many(ids.clone())
            .await?
            .into_iter()
            .map(|m| (m.imdb_id.clone(), m))
            .collect();
        Ok(ids.iter().filter_map(|id| by_id.remove(id)).collect())
    }
}

/// Movies present in every list, in the order of the first one
fn intersect(mut criteria: Vec<Vec<Movie>>) -> Vec<Movie> {
    if criteria.is_empty() {
        return Vec::new();
    }
    let mut result = criteria.remove(0);
    for other in criteria {
        let ids: HashSet<&str> = other.iter().map(|m| m.imdb_id.as_str()).collect();
        result.retain(|m| ids.contains(m.imdb_id.as_str()));
    }
    result
}
