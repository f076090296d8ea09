use std::sync::Arc;

use crate::{
    db::Repositories,
    services::{
        AuthService, CoupleMovieService, CoupleService, EmailService, EmotionService,
        FavoriteService, IdentityProvider, JwtKeys, Mailer, MovieCatalog, MovieIndex,
        MovieService, UserMovieService,
    },
};

/// External collaborators the services are built from
pub struct Backends {
    pub repositories: Repositories,
    pub index: Arc<dyn MovieIndex>,
    pub catalog: Arc<dyn MovieCatalog>,
    pub mailer: Arc<dyn Mailer>,
    pub identity: Option<Arc<dyn IdentityProvider>>,
}

/// Shared application state, handed to handlers as `State<Arc<AppState>>`
pub struct AppState {
    pub auth: AuthService,
    pub couples: CoupleService,
    pub couple_movies: CoupleMovieService,
    pub favorites: FavoriteService,
    pub user_movies: UserMovieService,
    pub movies: MovieService,
    pub emotions: EmotionService,
    /// Google sign-in; `None` when it is not configured
    pub identity: Option<Arc<dyn IdentityProvider>>,
    pub frontend_url: String,
}

impl AppState {
    pub fn new(backends: Backends, jwt: JwtKeys, frontend_url: &str) -> Self {
        let repos = backends.repositories;
        let frontend_url = frontend_url.trim_end_matches('/').to_string();

        let emotions = EmotionService::new(repos.emotions.clone());
        let movies = MovieService::new(
            repos.movies.clone(),
            backends.index,
            backends.catalog,
            emotions.clone(),
        );
        let email = EmailService::new(backends.mailer, &frontend_url);

        Self {
            auth: AuthService::new(repos.users.clone(), repos.tokens.clone(), jwt, email),
            couples: CoupleService::new(repos.users.clone(), repos.couples.clone()),
            couple_movies: CoupleMovieService::new(repos.couple_movies.clone()),
            favorites: FavoriteService::new(repos.favorites.clone()),
            user_movies: UserMovieService::new(repos.user_movies.clone(), movies.clone()),
            movies,
            emotions,
            identity: backends.identity,
            frontend_url,
        }
    }
}
