/// OMDb API provider
///
/// Search pages and detail records are both cached in Redis through `cached!`.
/// Failed search pages (quota errors included) are not stored. Detail misses
/// (`Response: "False"`) are cached, so unknown ids do not keep hitting the
/// upstream quota.
use reqwest::Client as HttpClient;
use serde::de::DeserializeOwned;

use crate::{
    cached,
    db::{Cache, CacheKey},
    error::{AppError, AppResult},
    models::{OmdbMovieDetails, OmdbSearchResponse},
    services::providers::MovieCatalog,
};

const SEARCH_CACHE_TTL: u64 = 3600; // 1 hour
const DETAILS_CACHE_TTL: u64 = 86400; // 1 day

#[derive(Clone)]
pub struct OmdbClient {
    http_client: HttpClient,
    api_key: String,
    api_url: String,
    cache: Cache,
}

impl OmdbClient {
    pub fn new(cache: Cache, api_key: String, api_url: String) -> Self {
        Self {
            http_client: HttpClient::new(),
            api_key,
            api_url: api_url.trim_end_matches('/').to_string(),
            cache,
        }
    }

    fn search_params(&self, title: &str, page: u32) -> Vec<(&'static str, String)> {
        vec![
            ("apikey", self.api_key.clone()),
            ("s", title.trim().to_string()),
            ("page", page.to_string()),
        ]
    }

    fn details_params(&self, imdb_id: &str) -> Vec<(&'static str, String)> {
        vec![
            ("apikey", self.api_key.clone()),
            ("i", imdb_id.to_string()),
            ("plot", "full".to_string()),
        ]
    }

    async fn get<T: DeserializeOwned>(&self, params: &[(&'static str, String)]) -> AppResult<T> {
        let response = self
            .http_client
            .get(format!("{}/", self.api_url))
            .query(params)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::ExternalApi(format!(
                "OMDb API returned status {}: {}",
                status, body
            )));
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| {
            tracing::error!(error = %e, response = %body, "Failed to deserialize OMDb response");
            AppError::ExternalApi(format!("Failed to parse OMDb response: {}", e))
        })
    }
}

#[async_trait::async_trait]
impl MovieCatalog for OmdbClient {
    async fn search(&self, title: &str, page: u32) -> AppResult<OmdbSearchResponse> {
        if title.trim().is_empty() {
            return Err(AppError::InvalidInput("Title is required".to_string()));
        }

        cached!(
            self.cache,
            CacheKey::OmdbSearch {
                title: title.to_string(),
                page,
            },
            SEARCH_CACHE_TTL,
            async {
                let page_result: OmdbSearchResponse =
                    self.get(&self.search_params(title, page)).await?;
                tracing::info!(
                    title = %title,
                    page,
                    results = page_result.search.len(),
                    provider = self.name(),
                    "OMDb search completed"
                );
                Ok::<_, AppError>(page_result)
            },
            keep_if = OmdbSearchResponse::is_success
        )
    }

    async fn movie_details(&self, imdb_id: &str) -> AppResult<OmdbMovieDetails> {
        cached!(
            self.cache,
            CacheKey::OmdbDetails(imdb_id.to_string()),
            DETAILS_CACHE_TTL,
            async {
                let details: OmdbMovieDetails = self.get(&self.details_params(imdb_id)).await?;
                tracing::info!(
                    imdb_id = %imdb_id,
                    found = details.is_success(),
                    provider = self.name(),
                    "OMDb details fetched"
                );
                Ok::<_, AppError>(details)
            }
        )
    }

    fn name(&self) -> &'static str {
        "omdb"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::create_redis_client;

    async fn client() -> OmdbClient {
        let redis = create_redis_client("redis://localhost:6379").unwrap();
        let (cache, _handle) = Cache::new(redis).await;
        OmdbClient::new(cache, "k3y".to_string(), "https://www.omdbapi.com/".to_string())
    }

    #[tokio::test]
    async fn test_search_params() {
        let omdb = client().await;
        assert_eq!(
            omdb.search_params("  Alien ", 3),
            vec![
                ("apikey", "k3y".to_string()),
                ("s", "Alien".to_string()),
                ("page", "3".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_details_params_request_full_plot() {
        let omdb = client().await;
        let params = omdb.details_params("tt0078748");
        assert!(params.contains(&("i", "tt0078748".to_string())));
        assert!(params.contains(&("plot", "full".to_string())));
    }

    #[tokio::test]
    async fn test_trailing_slash_trimmed() {
        assert_eq!(client().await.api_url, "https://www.omdbapi.com");
    }

    #[tokio::test]
    async fn test_blank_search_is_rejected_before_any_io() {
        let result = client().await.search("   ", 1).await;
        assert!(matches!(result, Err(AppError::InvalidInput(_))));
    }
}
