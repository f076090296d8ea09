use reqwest::{Client as HttpClient, StatusCode};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::{
    error::{AppError, AppResult},
    models::MovieDocument,
};

pub const MOVIE_INDEX: &str = "movies";
const MAX_HITS: usize = 100;

/// Full-text index over cached movies. Queries return IMDb ids only; callers
/// hydrate them from PostgreSQL.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait MovieIndex: Send + Sync {
    async fn index(&self, document: MovieDocument) -> AppResult<()>;
    async fn index_many(&self, documents: Vec<MovieDocument>) -> AppResult<()>;
    /// Typo-tolerant title match
    async fn search_title(&self, query: &str) -> AppResult<Vec<String>>;
    /// Movies whose genre text matches any of `genres`
    async fn search_genres(&self, genres: Vec<String>) -> AppResult<Vec<String>>;
}

#[derive(Deserialize)]
struct SearchResponse {
    hits: Hits,
}

#[derive(Deserialize)]
struct Hits {
    hits: Vec<Hit>,
}

#[derive(Deserialize)]
struct Hit {
    #[serde(rename = "_id")]
    id: String,
}

/// Elasticsearch over its REST API
#[derive(Clone)]
pub struct ElasticsearchIndex {
    http_client: HttpClient,
    base_url: String,
}

impl ElasticsearchIndex {
    pub fn new(base_url: &str) -> Self {
        Self {
            http_client: HttpClient::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Create the index with explicit mappings if it does not exist yet
    pub async fn ensure_index(&self) -> AppResult<()> {
        let url = format!("{}/{}", self.base_url, MOVIE_INDEX);
        let exists = self.http_client.head(&url).send().await?;
        if exists.status().is_success() {
            return Ok(());
        }
        if exists.status() != StatusCode::NOT_FOUND {
            return Err(AppError::ExternalApi(format!(
                "Elasticsearch returned status {} checking index",
                exists.status()
            )));
        }

        let response = self
            .http_client
            .put(&url)
            .json(&index_mappings())
            .send()
            .await?;
        Self::check(response, "create index").await?;
        tracing::info!(index = MOVIE_INDEX, "Created search index");
        Ok(())
    }

    async fn check(response: reqwest::Response, action: &str) -> AppResult<reqwest::Response> {
        if response.status().is_success() {
            return Ok(response);
        }
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        Err(AppError::ExternalApi(format!(
            "Elasticsearch {} failed with status {}: {}",
            action, status, body
        )))
    }

    async fn search_ids(&self, query: Value) -> AppResult<Vec<String>> {
        let response = self
            .http_client
            .post(format!("{}/{}/_search", self.base_url, MOVIE_INDEX))
            .json(&query)
            .send()
            .await?;
        let response = Self::check(response, "search").await?;
        let parsed: SearchResponse = response.json().await?;
        Ok(parsed.hits.hits.into_iter().map(|hit| hit.id).collect())
    }
}

fn index_mappings() -> Value {
    json!({
        "mappings": {
            "properties": {
                "imdb_id": { "type": "keyword" },
                "title": { "type": "text", "analyzer": "standard" },
                "year": { "type": "keyword" },
                "genre": { "type": "text", "analyzer": "standard" }
            }
        }
    })
}

fn fuzzy_title_query(query: &str) -> Value {
    json!({
        "size": MAX_HITS,
        "query": {
            "match": {
                "title": { "query": query, "fuzziness": "AUTO" }
            }
        }
    })
}

fn genre_query(genres: &[String]) -> Value {
    let should: Vec<Value> = genres
        .iter()
        .map(|genre| json!({ "match": { "genre": genre.trim() } }))
        .collect();
    json!({
        "size": MAX_HITS,
        "query": {
            "bool": { "should": should, "minimum_should_match": 1 }
        }
    })
}

/// NDJSON body for `_bulk`: an action line then the source line per document
fn bulk_body(documents: &[MovieDocument]) -> AppResult<String> {
    let mut body = String::new();
    for doc in documents {
        let action = json!({ "index": { "_index": MOVIE_INDEX, "_id": doc.imdb_id } });
        body.push_str(&action.to_string());
        body.push('\n');
        let source = serde_json::to_string(doc)
            .map_err(|e| AppError::Internal(format!("Failed to encode document: {}", e)))?;
        body.push_str(&source);
        body.push('\n');
    }
    Ok(body)
}

#[async_trait::async_trait]
impl MovieIndex for ElasticsearchIndex {
    async fn index(&self, document: MovieDocument) -> AppResult<()> {
        let response = self
            .http_client
            .put(format!(
                "{}/{}/_doc/{}",
                self.base_url, MOVIE_INDEX, document.imdb_id
            ))
            .json(&document)
            .send()
            .await?;
        Self::check(response, "index").await?;
        Ok(())
    }

    async fn index_many(&self, documents: Vec<MovieDocument>) -> AppResult<()> {
        if documents.is_empty() {
            return Ok(());
        }
        let response = self
            .http_client
            .post(format!("{}/_bulk", self.base_url))
            .header(reqwest::header::CONTENT_TYPE, "application/x-ndjson")
            .body(bulk_body(&documents)?)
            .send()
            .await?;
        let response = Self::check(response, "bulk index").await?;

        let result: Value = response.json().await?;
        if result["errors"].as_bool().unwrap_or(false) {
            tracing::warn!(count = documents.len(), "Bulk index reported item errors");
        }
        Ok(())
    }

    async fn search_title(&self, query: &str) -> AppResult<Vec<String>> {
        if query.trim().is_empty() {
            return Ok(Vec::new());
        }
        self.search_ids(fuzzy_title_query(query.trim())).await
    }

    async fn search_genres(&self, genres: Vec<String>) -> AppResult<Vec<String>> {
        if genres.iter().all(|g| g.trim().is_empty()) {
            return Ok(Vec::new());
        }
        self.search_ids(genre_query(&genres)).await
    }
}
