pub mod auth;
pub mod couple;
pub mod movie;
pub mod omdb;
pub mod user;

pub use couple::{
    couple_key, CoupleMovie, CoupleMovieView, CoupleRequest, CoupleStats, CoupleWatchStatus,
    NewCoupleMovie, RequestStatus,
};
pub use movie::{
    EmotionGenreMap, Favorite, Movie, MovieDocument, MovieStatus, NewFavorite, SaveMovieRequest,
    UserMovieStatus,
};
pub use omdb::{OmdbMovieDetails, OmdbMovieSummary, OmdbSearchResponse};
pub use user::{AuthToken, NewAuthToken, NewUser, Role, TokenType, User, UserProfile};
