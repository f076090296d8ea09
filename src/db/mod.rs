pub mod postgres;
pub mod redis;
pub mod repositories;

use std::sync::Arc;

use sqlx::PgPool;

pub use postgres::create_pool;
pub use self::redis::create_redis_client;
pub use self::redis::Cache;
pub use self::redis::CacheKey;
pub use self::redis::CacheWriterHandle;
pub use repositories::*;

/// Every store the services talk to, behind trait objects
#[derive(Clone)]
pub struct Repositories {
    pub users: Arc<dyn UserRepository>,
    pub tokens: Arc<dyn TokenRepository>,
    pub couples: Arc<dyn CoupleRepository>,
    pub couple_movies: Arc<dyn CoupleMovieRepository>,
    pub favorites: Arc<dyn FavoriteRepository>,
    pub user_movies: Arc<dyn UserMovieRepository>,
    pub movies: Arc<dyn MovieRepository>,
    pub emotions: Arc<dyn EmotionRepository>,
}

impl Repositories {
    pub fn postgres(pool: PgPool) -> Self {
        Self {
            users: Arc::new(PgUserRepository::new(pool.clone())),
            tokens: Arc::new(PgTokenRepository::new(pool.clone())),
            couples: Arc::new(PgCoupleRepository::new(pool.clone())),
            couple_movies: Arc::new(PgCoupleMovieRepository::new(pool.clone())),
            favorites: Arc::new(PgFavoriteRepository::new(pool.clone())),
            user_movies: Arc::new(PgUserMovieRepository::new(pool.clone())),
            movies: Arc::new(PgMovieRepository::new(pool.clone())),
            emotions: Arc::new(PgEmotionRepository::new(pool)),
        }
    }
}
