/// External movie metadata sources
///
/// The catalog is the only place that talks to the upstream API. Everything it
/// returns is written into the local cache by `MovieService`, so callers never
/// depend on the catalog for data they have already seen.
use crate::{
    error::AppResult,
    models::{OmdbMovieDetails, OmdbSearchResponse},
};

pub mod omdb;

pub use omdb::OmdbClient;

#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait MovieCatalog: Send + Sync {
    /// One page (1-based) of title search results
    async fn search(&self, title: &str, page: u32) -> AppResult<OmdbSearchResponse>;

    /// Full record for one IMDb id. A `Response: "False"` body is returned
    /// as-is so callers can tell "unknown id" apart from transport failures.
    async fn movie_details(&self, imdb_id: &str) -> AppResult<OmdbMovieDetails>;

    /// Provider name for logging
    fn name(&self) -> &'static str;
}
