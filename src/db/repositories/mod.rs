pub mod couple_movies;
pub mod couples;
pub mod emotions;
pub mod favorites;
pub mod movies;
pub mod tokens;
pub mod user_movies;
pub mod users;

pub use couple_movies::{CoupleMovieRepository, PgCoupleMovieRepository};
pub use couples::{CoupleRepository, PgCoupleRepository};
pub use emotions::{EmotionRepository, PgEmotionRepository};
pub use favorites::{FavoriteRepository, PgFavoriteRepository};
pub use movies::{MovieRepository, PgMovieRepository};
pub use tokens::{PgTokenRepository, TokenRepository};
pub use user_movies::{PgUserMovieRepository, UserMovieRepository};
pub use users::{PgUserRepository, ProfileChanges, UserRepository};
