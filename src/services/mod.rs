pub mod auth;
pub mod couple;
pub mod couple_movies;
pub mod email;
pub mod emotions;
pub mod favorites;
pub mod jwt;
pub mod movies;
pub mod oauth;
pub mod password;
pub mod providers;
pub mod search_index;
pub mod user_movies;

pub use auth::AuthService;
pub use couple::CoupleService;
pub use couple_movies::CoupleMovieService;
pub use email::{EmailService, LogMailer, Mailer, SmtpMailer};
pub use emotions::EmotionService;
pub use favorites::{AddFavorite, FavoriteService};
pub use jwt::JwtKeys;
pub use movies::MovieService;
pub use oauth::{GoogleOAuthClient, IdentityProvider, OAuthProfile};
pub use providers::{MovieCatalog, OmdbClient};
pub use search_index::{ElasticsearchIndex, MovieIndex};
pub use user_movies::UserMovieService;
