//! In-memory stand-ins for every external store, wired into the real router.
#![allow(dead_code)]

use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

use axum::http::{header::AUTHORIZATION, HeaderValue};
use axum_test::TestServer;
use chrono::Utc;
use serde_json::{json, Value};

use couple_movie_api::{
    create_router,
    db::{
        CoupleMovieRepository, CoupleRepository, EmotionRepository, FavoriteRepository,
        MovieRepository, ProfileChanges, Repositories, TokenRepository, UserMovieRepository,
        UserRepository,
    },
    error::{AppError, AppResult},
    models::{
        AuthToken, CoupleMovie, CoupleRequest, CoupleWatchStatus, EmotionGenreMap, Favorite,
        Movie, MovieDocument, MovieStatus, NewAuthToken, NewCoupleMovie, NewFavorite, NewUser,
        OmdbMovieDetails, OmdbMovieSummary, OmdbSearchResponse, RequestStatus, TokenType, User,
        UserMovieStatus,
    },
    services::{
        emotions::default_mappings, EmotionService, IdentityProvider, JwtKeys, Mailer,
        MovieCatalog, MovieIndex, OAuthProfile,
    },
    AppState, Backends,
};

pub const FRONTEND_URL: &str = "http://localhost:5173";

#[derive(Default)]
struct Data {
    next_id: i64,
    users: Vec<User>,
    tokens: Vec<AuthToken>,
    requests: Vec<CoupleRequest>,
    couple_movies: Vec<CoupleMovie>,
    favorites: Vec<Favorite>,
    statuses: Vec<UserMovieStatus>,
    movies: Vec<Movie>,
    emotions: Vec<EmotionGenreMap>,
}

impl Data {
    fn id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

/// Every repository trait over one mutex-guarded set of tables
#[derive(Default)]
pub struct MemoryStore {
    data: Mutex<Data>,
}

impl MemoryStore {
    fn with<T>(&self, f: impl FnOnce(&mut Data) -> T) -> T {
        let mut data = self.data.lock().unwrap();
        f(&mut data)
    }

    pub fn user(&self, email: &str) -> Option<User> {
        self.with(|d| d.users.iter().find(|u| u.email == email).cloned())
    }

    pub fn token_for(&self, user_id: i64, token_type: TokenType) -> Option<AuthToken> {
        self.with(|d| {
            d.tokens
                .iter()
                .find(|t| t.user_id == user_id && t.token_type == token_type)
                .cloned()
        })
    }

    pub fn expire_tokens(&self) {
        self.with(|d| {
            for token in &mut d.tokens {
                token.expires_at = Utc::now() - chrono::Duration::minutes(1);
            }
        })
    }

    pub fn movie(&self, imdb_id: &str) -> Option<Movie> {
        self.with(|d| d.movies.iter().find(|m| m.imdb_id == imdb_id).cloned())
    }

    pub fn put_movie(&self, movie: Movie) {
        self.with(|d| {
            d.movies.retain(|m| m.imdb_id != movie.imdb_id);
            d.movies.push(movie);
        })
    }

    pub fn movie_count(&self) -> usize {
        self.with(|d| d.movies.len())
    }
}

#[async_trait::async_trait]
impl UserRepository for MemoryStore {
    async fn find_by_id(&self, id: i64) -> AppResult<Option<User>> {
        Ok(self.with(|d| d.users.iter().find(|u| u.id == id).cloned()))
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        Ok(self.user(email))
    }

    async fn find_by_username(&self, username: &str) -> AppResult<Option<User>> {
        Ok(self.with(|d| {
            d.users
                .iter()
                .find(|u| u.username.as_deref() == Some(username))
                .cloned()
        }))
    }

    async fn create(&self, user: NewUser) -> AppResult<User> {
        self.with(|d| {
            if d.users.iter().any(|u| u.email == user.email) {
                return Err(AppError::Conflict("Email is already registered".to_string()));
            }
            let created = User {
                id: d.id(),
                email: user.email,
                username: user.username,
                password_hash: user.password_hash,
                first_name: user.first_name,
                last_name: user.last_name,
                role: user.role,
                google_id: user.google_id,
                avatar_url: user.avatar_url,
                partner_id: None,
                is_verified: user.is_verified,
                created_at: Utc::now(),
            };
            d.users.push(created.clone());
            Ok(created)
        })
    }

    async fn update_profile(&self, id: i64, changes: ProfileChanges) -> AppResult<User> {
        self.with(|d| {
            let user = d
                .users
                .iter_mut()
                .find(|u| u.id == id)
                .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;
            if changes.first_name.is_some() {
                user.first_name = changes.first_name;
            }
            if changes.last_name.is_some() {
                user.last_name = changes.last_name;
            }
            if changes.username.is_some() {
                user.username = changes.username;
            }
            if changes.avatar_url.is_some() {
                user.avatar_url = changes.avatar_url;
            }
            Ok(user.clone())
        })
    }

    async fn update_password(&self, id: i64, password_hash: String) -> AppResult<()> {
        self.with(|d| {
            if let Some(user) = d.users.iter_mut().find(|u| u.id == id) {
                user.password_hash = Some(password_hash);
            }
        });
        Ok(())
    }

    async fn mark_verified(&self, id: i64) -> AppResult<()> {
        self.with(|d| {
            if let Some(user) = d.users.iter_mut().find(|u| u.id == id) {
                user.is_verified = true;
            }
        });
        Ok(())
    }

    async fn link_google(
        &self,
        id: i64,
        google_id: String,
        avatar_url: Option<String>,
    ) -> AppResult<User> {
        self.with(|d| {
            let user = d
                .users
                .iter_mut()
                .find(|u| u.id == id)
                .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;
            user.google_id = Some(google_id);
            if user.avatar_url.is_none() {
                user.avatar_url = avatar_url;
            }
            Ok(user.clone())
        })
    }
}

#[async_trait::async_trait]
impl TokenRepository for MemoryStore {
    async fn create(&self, token: NewAuthToken) -> AppResult<AuthToken> {
        Ok(self.with(|d| {
            let created = AuthToken {
                id: d.id(),
                token: token.token,
                user_id: token.user_id,
                token_type: token.token_type,
                expires_at: token.expires_at,
            };
            d.tokens.push(created.clone());
            created
        }))
    }

    async fn find(&self, token: &str) -> AppResult<Option<AuthToken>> {
        Ok(self.with(|d| d.tokens.iter().find(|t| t.token == token).cloned()))
    }

    async fn delete(&self, id: i64) -> AppResult<()> {
        self.with(|d| d.tokens.retain(|t| t.id != id));
        Ok(())
    }

    async fn delete_for_user(&self, user_id: i64, token_type: TokenType) -> AppResult<()> {
        self.with(|d| {
            d.tokens
                .retain(|t| !(t.user_id == user_id && t.token_type == token_type))
        });
        Ok(())
    }
}

#[async_trait::async_trait]
impl CoupleRepository for MemoryStore {
    async fn create_request(
        &self,
        sender_id: i64,
        receiver_email: &str,
    ) -> AppResult<CoupleRequest> {
        self.with(|d| {
            let sender = d
                .users
                .iter()
                .find(|u| u.id == sender_id)
                .cloned()
                .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;
            let request = CoupleRequest {
                id: d.id(),
                sender_id,
                sender_email: sender.email,
                sender_first_name: sender.first_name,
                sender_last_name: sender.last_name,
                receiver_email: receiver_email.to_string(),
                status: RequestStatus::Pending,
                created_at: Utc::now(),
            };
            d.requests.push(request.clone());
            Ok(request)
        })
    }

    async fn find_request(&self, id: i64) -> AppResult<Option<CoupleRequest>> {
        Ok(self.with(|d| d.requests.iter().find(|r| r.id == id).cloned()))
    }

    async fn find_pending(
        &self,
        sender_id: i64,
        receiver_email: &str,
    ) -> AppResult<Option<CoupleRequest>> {
        Ok(self.with(|d| {
            d.requests
                .iter()
                .find(|r| {
                    r.sender_id == sender_id
                        && r.receiver_email == receiver_email
                        && r.status == RequestStatus::Pending
                })
                .cloned()
        }))
    }

    async fn pending_for(&self, receiver_email: &str) -> AppResult<Vec<CoupleRequest>> {
        Ok(self.with(|d| {
            d.requests
                .iter()
                .filter(|r| r.receiver_email == receiver_email && r.status == RequestStatus::Pending)
                .cloned()
                .collect()
        }))
    }

    async fn sent_by(&self, sender_id: i64) -> AppResult<Vec<CoupleRequest>> {
        Ok(self.with(|d| {
            d.requests
                .iter()
                .filter(|r| r.sender_id == sender_id)
                .cloned()
                .collect()
        }))
    }

    async fn reject(&self, request_id: i64) -> AppResult<()> {
        self.with(|d| {
            if let Some(r) = d.requests.iter_mut().find(|r| r.id == request_id) {
                r.status = RequestStatus::Rejected;
            }
        });
        Ok(())
    }

    async fn accept(&self, request_id: i64, sender_id: i64, receiver_id: i64) -> AppResult<()> {
        self.with(|d| {
            let unpaired = |id: i64| {
                d.users
                    .iter()
                    .any(|u| u.id == id && u.partner_id.is_none())
            };
            if !unpaired(sender_id) || !unpaired(receiver_id) {
                return Err(AppError::Conflict(
                    "One of you already has a partner.".to_string(),
                ));
            }
            for user in &mut d.users {
                if user.id == sender_id {
                    user.partner_id = Some(receiver_id);
                } else if user.id == receiver_id {
                    user.partner_id = Some(sender_id);
                }
            }
            if let Some(r) = d.requests.iter_mut().find(|r| r.id == request_id) {
                r.status = RequestStatus::Accepted;
            }
            Ok(())
        })
    }

    async fn unlink(&self, user_id: i64, partner_id: i64) -> AppResult<()> {
        self.with(|d| {
            for user in &mut d.users {
                if user.id == user_id || user.id == partner_id {
                    user.partner_id = None;
                }
            }
        });
        Ok(())
    }
}

#[async_trait::async_trait]
impl CoupleMovieRepository for MemoryStore {
    async fn list(&self, couple_key: &str) -> AppResult<Vec<CoupleMovie>> {
        Ok(self.with(|d| {
            d.couple_movies
                .iter()
                .filter(|m| m.couple_key == couple_key)
                .cloned()
                .collect()
        }))
    }

    async fn find(&self, couple_key: &str, imdb_id: &str) -> AppResult<Option<CoupleMovie>> {
        Ok(self.with(|d| {
            d.couple_movies
                .iter()
                .find(|m| m.couple_key == couple_key && m.imdb_id == imdb_id)
                .cloned()
        }))
    }

    async fn add(&self, movie: NewCoupleMovie) -> AppResult<CoupleMovie> {
        Ok(self.with(|d| {
            if let Some(existing) = d
                .couple_movies
                .iter_mut()
                .find(|m| m.couple_key == movie.couple_key && m.imdb_id == movie.imdb_id)
            {
                existing.mark_added_by(movie.added_by_user_id);
                return existing.clone();
            }
            let created = CoupleMovie {
                id: d.id(),
                couple_key: movie.couple_key,
                imdb_id: movie.imdb_id,
                title: movie.title,
                poster: movie.poster,
                year: movie.year,
                genre: movie.genre,
                added_by_user_id: movie.added_by_user_id,
                watch_status: CoupleWatchStatus::Watchlist,
                added_by_creator: true,
                added_by_partner: false,
                user1_id: Some(movie.added_by_user_id),
                user1_rating: None,
                user2_id: None,
                user2_rating: None,
                created_at: Utc::now(),
            };
            d.couple_movies.push(created.clone());
            created
        }))
    }

    async fn set_status(
        &self,
        couple_key: &str,
        imdb_id: &str,
        status: CoupleWatchStatus,
    ) -> AppResult<Option<CoupleMovie>> {
        Ok(self.with(|d| {
            d.couple_movies
                .iter_mut()
                .find(|m| m.couple_key == couple_key && m.imdb_id == imdb_id)
                .map(|m| {
                    m.watch_status = status;
                    m.clone()
                })
        }))
    }

    async fn rate(
        &self,
        couple_key: &str,
        imdb_id: &str,
        user_id: i64,
        rating: f64,
    ) -> AppResult<Option<CoupleMovie>> {
        Ok(self.with(|d| {
            d.couple_movies
                .iter_mut()
                .find(|m| m.couple_key == couple_key && m.imdb_id == imdb_id)
                .map(|m| {
                    m.apply_rating(user_id, rating);
                    m.clone()
                })
        }))
    }

    async fn delete(&self, couple_key: &str, imdb_id: &str) -> AppResult<bool> {
        Ok(self.with(|d| {
            let before = d.couple_movies.len();
            d.couple_movies
                .retain(|m| !(m.couple_key == couple_key && m.imdb_id == imdb_id));
            d.couple_movies.len() != before
        }))
    }
}

#[async_trait::async_trait]
impl FavoriteRepository for MemoryStore {
    async fn list(&self, user_id: i64) -> AppResult<Vec<Favorite>> {
        Ok(self.with(|d| {
            d.favorites
                .iter()
                .filter(|f| f.user_id == user_id)
                .cloned()
                .collect()
        }))
    }

    async fn find(&self, user_id: i64, imdb_id: &str) -> AppResult<Option<Favorite>> {
        Ok(self.with(|d| {
            d.favorites
                .iter()
                .find(|f| f.user_id == user_id && f.imdb_id == imdb_id)
                .cloned()
        }))
    }

    async fn create(&self, favorite: NewFavorite) -> AppResult<Option<Favorite>> {
        Ok(self.with(|d| {
            if d
                .favorites
                .iter()
                .any(|f| f.user_id == favorite.user_id && f.imdb_id == favorite.imdb_id)
            {
                return None;
            }
            let created = Favorite {
                id: d.id(),
                user_id: favorite.user_id,
                imdb_id: favorite.imdb_id,
                title: favorite.title,
                poster: favorite.poster,
                year: favorite.year,
                genre: favorite.genre,
                created_at: Utc::now(),
            };
            d.favorites.push(created.clone());
            Some(created)
        }))
    }

    async fn delete(&self, user_id: i64, imdb_id: &str) -> AppResult<bool> {
        Ok(self.with(|d| {
            let before = d.favorites.len();
            d.favorites
                .retain(|f| !(f.user_id == user_id && f.imdb_id == imdb_id));
            d.favorites.len() != before
        }))
    }
}

impl MemoryStore {
    fn upsert_row(
        &self,
        user_id: i64,
        imdb_id: &str,
        apply: impl FnOnce(&mut UserMovieStatus),
        default_status: MovieStatus,
    ) -> UserMovieStatus {
        self.with(|d| {
            let index = match d
                .statuses
                .iter()
                .position(|s| s.user_id == user_id && s.imdb_id == imdb_id)
            {
                Some(index) => index,
                None => {
                    let row = UserMovieStatus {
                        id: d.id(),
                        user_id,
                        imdb_id: imdb_id.to_string(),
                        status: default_status,
                        rating: None,
                        review: None,
                        updated_at: Utc::now(),
                    };
                    d.statuses.push(row);
                    d.statuses.len() - 1
                }
            };
            let row = &mut d.statuses[index];
            apply(row);
            row.updated_at = Utc::now();
            row.clone()
        })
    }
}

#[async_trait::async_trait]
impl UserMovieRepository for MemoryStore {
    async fn list(&self, user_id: i64) -> AppResult<Vec<UserMovieStatus>> {
        Ok(self.with(|d| {
            d.statuses
                .iter()
                .filter(|s| s.user_id == user_id)
                .cloned()
                .collect()
        }))
    }

    async fn with_status(
        &self,
        user_id: i64,
        status: MovieStatus,
    ) -> AppResult<Vec<UserMovieStatus>> {
        Ok(self.with(|d| {
            d.statuses
                .iter()
                .filter(|s| s.user_id == user_id && s.status == status)
                .cloned()
                .collect()
        }))
    }

    async fn upsert_status(
        &self,
        user_id: i64,
        imdb_id: &str,
        status: MovieStatus,
    ) -> AppResult<UserMovieStatus> {
        Ok(self.upsert_row(user_id, imdb_id, |row| row.status = status, status))
    }

    async fn upsert_rating(
        &self,
        user_id: i64,
        imdb_id: &str,
        rating: i32,
        review: Option<String>,
    ) -> AppResult<UserMovieStatus> {
        Ok(self.upsert_row(
            user_id,
            imdb_id,
            |row| {
                row.rating = Some(rating);
                row.review = review;
            },
            MovieStatus::Watched,
        ))
    }
}

#[async_trait::async_trait]
impl MovieRepository for MemoryStore {
    async fn find(&self, imdb_id: &str) -> AppResult<Option<Movie>> {
        Ok(self.movie(imdb_id))
    }

    async fn find_many(&self, imdb_ids: Vec<String>) -> AppResult<Vec<Movie>> {
        Ok(self.with(|d| {
            d.movies
                .iter()
                .filter(|m| imdb_ids.contains(&m.imdb_id))
                .cloned()
                .collect()
        }))
    }

    async fn existing_ids(&self, imdb_ids: Vec<String>) -> AppResult<Vec<String>> {
        Ok(self.with(|d| {
            d.movies
                .iter()
                .filter(|m| imdb_ids.contains(&m.imdb_id))
                .map(|m| m.imdb_id.clone())
                .collect()
        }))
    }

    async fn upsert(&self, movie: Movie) -> AppResult<()> {
        self.put_movie(movie);
        Ok(())
    }

    async fn insert_new(&self, movies: Vec<Movie>) -> AppResult<u64> {
        Ok(self.with(|d| {
            let mut written = 0;
            for movie in movies {
                if !d.movies.iter().any(|m| m.imdb_id == movie.imdb_id) {
                    d.movies.push(movie);
                    written += 1;
                }
            }
            written
        }))
    }

    async fn random(&self) -> AppResult<Option<Movie>> {
        Ok(self.with(|d| d.movies.first().cloned()))
    }

    async fn rated_above(&self, min_rating: f64) -> AppResult<Vec<Movie>> {
        Ok(self.with(|d| {
            d.movies
                .iter()
                .filter(|m| m.imdb_rating.map(|r| r > min_rating).unwrap_or(false))
                .cloned()
                .collect()
        }))
    }
}

#[async_trait::async_trait]
impl EmotionRepository for MemoryStore {
    async fn count(&self) -> AppResult<i64> {
        Ok(self.with(|d| d.emotions.len() as i64))
    }

    async fn insert_many(&self, mappings: Vec<(String, Vec<String>)>) -> AppResult<()> {
        self.with(|d| {
            for (emotion, genres) in mappings {
                let id = d.id();
                d.emotions.push(EmotionGenreMap { id, emotion, genres });
            }
        });
        Ok(())
    }

    async fn find(&self, emotion: &str) -> AppResult<Option<EmotionGenreMap>> {
        Ok(self.with(|d| d.emotions.iter().find(|e| e.emotion == emotion).cloned()))
    }

    async fn all(&self) -> AppResult<Vec<EmotionGenreMap>> {
        Ok(self.with(|d| d.emotions.clone()))
    }
}

/// Catalog serving a fixed set of movies, ten per search page
#[derive(Default)]
pub struct FakeCatalog {
    movies: Mutex<Vec<OmdbMovieDetails>>,
    pub search_calls: Mutex<u32>,
}

impl FakeCatalog {
    pub fn add(&self, imdb_id: &str, title: &str, year: &str, genre: &str, rating: &str) {
        let details: OmdbMovieDetails = serde_json::from_value(json!({
            "Title": title,
            "Year": year,
            "Genre": genre,
            "Director": "Someone",
            "Plot": "A plot.",
            "Poster": format!("https://img.example/{}.jpg", imdb_id),
            "imdbRating": rating,
            "imdbID": imdb_id,
            "Type": "movie",
            "Response": "True"
        }))
        .unwrap();
        self.movies.lock().unwrap().push(details);
    }
}

#[async_trait::async_trait]
impl MovieCatalog for FakeCatalog {
    async fn search(&self, title: &str, page: u32) -> AppResult<OmdbSearchResponse> {
        *self.search_calls.lock().unwrap() += 1;
        let needle = title.trim().to_lowercase();
        let matches: Vec<OmdbMovieSummary> = self
            .movies
            .lock()
            .unwrap()
            .iter()
            .filter(|m| m.title.to_lowercase().contains(&needle))
            .map(|m| OmdbMovieSummary {
                title: m.title.clone(),
                year: m.year.clone(),
                imdb_id: m.imdb_id.clone(),
                movie_type: m.movie_type.clone(),
                poster: m.poster.clone(),
            })
            .collect();

        let start = (page.saturating_sub(1) as usize) * 10;
        let page_items: Vec<OmdbMovieSummary> = matches.iter().skip(start).take(10).cloned().collect();
        if page_items.is_empty() {
            return Ok(OmdbSearchResponse {
                search: vec![],
                total_results: None,
                response: "False".to_string(),
                error: Some("Movie not found!".to_string()),
            });
        }
        Ok(OmdbSearchResponse {
            search: page_items,
            total_results: Some(matches.len().to_string()),
            response: "True".to_string(),
            error: None,
        })
    }

    async fn movie_details(&self, imdb_id: &str) -> AppResult<OmdbMovieDetails> {
        let found = self
            .movies
            .lock()
            .unwrap()
            .iter()
            .find(|m| m.imdb_id == imdb_id)
            .cloned();
        Ok(found.unwrap_or_else(|| {
            serde_json::from_value(json!({"Response": "False", "Error": "Incorrect IMDb ID."}))
                .unwrap()
        }))
    }

    fn name(&self) -> &'static str {
        "fake"
    }
}

/// Substring matching in place of the real full-text index
#[derive(Default)]
pub struct FakeIndex {
    documents: Mutex<Vec<MovieDocument>>,
}

impl FakeIndex {
    pub fn len(&self) -> usize {
        self.documents.lock().unwrap().len()
    }

    pub fn insert(&self, document: MovieDocument) {
        let mut docs = self.documents.lock().unwrap();
        docs.retain(|d| d.imdb_id != document.imdb_id);
        docs.push(document);
    }
}

#[async_trait::async_trait]
impl MovieIndex for FakeIndex {
    async fn index(&self, document: MovieDocument) -> AppResult<()> {
        let mut docs = self.documents.lock().unwrap();
        docs.retain(|d| d.imdb_id != document.imdb_id);
        docs.push(document);
        Ok(())
    }

    async fn index_many(&self, documents: Vec<MovieDocument>) -> AppResult<()> {
        for document in documents {
            self.index(document).await?;
        }
        Ok(())
    }

    async fn search_title(&self, query: &str) -> AppResult<Vec<String>> {
        let needle = query.trim().to_lowercase();
        Ok(self
            .documents
            .lock()
            .unwrap()
            .iter()
            .filter(|d| d.title.to_lowercase().contains(&needle))
            .map(|d| d.imdb_id.clone())
            .collect())
    }

    async fn search_genres(&self, genres: Vec<String>) -> AppResult<Vec<String>> {
        let wanted: Vec<String> = genres.iter().map(|g| g.to_lowercase()).collect();
        Ok(self
            .documents
            .lock()
            .unwrap()
            .iter()
            .filter(|d| {
                let genre = d.genre.clone().unwrap_or_default().to_lowercase();
                wanted.iter().any(|w| genre.contains(w.as_str()))
            })
            .map(|d| d.imdb_id.clone())
            .collect())
    }
}

/// Keeps every message instead of delivering it
#[derive(Default)]
pub struct RecordingMailer {
    sent: Mutex<Vec<(String, String, String)>>,
}

impl RecordingMailer {
    pub fn count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }

    /// The `token=` value of the last link mailed to `to`
    pub fn last_token_for(&self, to: &str) -> Option<String> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|(recipient, _, _)| recipient == to)
            .and_then(|(_, _, body)| {
                let start = body.find("token=")? + "token=".len();
                let token: String = body[start..]
                    .chars()
                    .take_while(|c| c.is_ascii_alphanumeric() || *c == '-')
                    .collect();
                Some(token)
            })
    }
}

#[async_trait::async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, to: &str, subject: &str, body: &str) -> AppResult<()> {
        self.sent
            .lock()
            .unwrap()
            .push((to.to_string(), subject.to_string(), body.to_string()));
        Ok(())
    }
}

/// Google stand-in returning a fixed profile for any code
pub struct FakeIdentity {
    pub profile: OAuthProfile,
}

#[async_trait::async_trait]
impl IdentityProvider for FakeIdentity {
    fn authorization_url(&self, state: &str) -> AppResult<String> {
        Ok(format!("https://accounts.example/auth?state={}", state))
    }

    async fn exchange_code(&self, code: &str) -> AppResult<OAuthProfile> {
        if code == "bad" {
            return Err(AppError::Unauthorized("Code rejected".to_string()));
        }
        Ok(self.profile.clone())
    }
}

pub struct TestApp {
    pub server: TestServer,
    pub store: Arc<MemoryStore>,
    pub catalog: Arc<FakeCatalog>,
    pub index: Arc<FakeIndex>,
    pub mailer: Arc<RecordingMailer>,
}

impl TestApp {
    pub async fn new() -> Self {
        Self::build(None).await
    }

    pub async fn with_identity(profile: OAuthProfile) -> Self {
        Self::build(Some(Arc::new(FakeIdentity { profile }))).await
    }

    async fn build(identity: Option<Arc<dyn IdentityProvider>>) -> Self {
        let store = Arc::new(MemoryStore::default());
        let catalog = Arc::new(FakeCatalog::default());
        let index = Arc::new(FakeIndex::default());
        let mailer = Arc::new(RecordingMailer::default());

        let repositories = Repositories {
            users: store.clone(),
            tokens: store.clone(),
            couples: store.clone(),
            couple_movies: store.clone(),
            favorites: store.clone(),
            user_movies: store.clone(),
            movies: store.clone(),
            emotions: store.clone(),
        };
        EmotionService::new(repositories.emotions.clone())
            .seed_if_empty()
            .await;

        let state = AppState::new(
            Backends {
                repositories,
                index: index.clone(),
                catalog: catalog.clone(),
                mailer: mailer.clone(),
                identity,
            },
            JwtKeys::new("integration-test-secret", 24),
            FRONTEND_URL,
        );
        let server = TestServer::new(create_router(Arc::new(state))).unwrap();

        Self {
            server,
            store,
            catalog,
            index,
            mailer,
        }
    }

    /// Put a movie straight into the local cache and the index
    pub fn cache(&self, movie: Movie) {
        self.index.insert(MovieDocument::from(&movie));
        self.store.put_movie(movie);
    }

    /// Register an account and return its JWT
    pub async fn register(&self, username: &str, email: &str) -> String {
        let response = self
            .server
            .post("/api/v1/auth/register")
            .json(&json!({
                "firstName": "Test",
                "lastName": "User",
                "username": username,
                "email": email,
                "password": "password123"
            }))
            .await;
        response.assert_status_ok();
        response.json::<Value>()["token"]
            .as_str()
            .unwrap()
            .to_string()
    }

    /// Register two accounts and pair them; returns (token_a, token_b)
    pub async fn couple(&self) -> (String, String) {
        let a = self.register("alice", "alice@example.com").await;
        let b = self.register("bobby", "bob@example.com").await;
        let invite = self
            .server
            .post("/api/v1/couple/invite")
            .add_query_param("email", "bob@example.com")
            .add_header(AUTHORIZATION, bearer(&a))
            .await;
        invite.assert_status_ok();
        let id = invite.json::<Value>()["id"].as_i64().unwrap();
        self.server
            .post(&format!("/api/v1/couple/accept/{}", id))
            .add_header(AUTHORIZATION, bearer(&b))
            .await
            .assert_status_ok();
        (a, b)
    }

    /// Wait for background caching to settle
    pub async fn wait_for(&self, condition: impl Fn(&Self) -> bool) {
        for _ in 0..100 {
            if condition(self) {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("condition not met in time");
    }
}

pub fn bearer(token: &str) -> HeaderValue {
    HeaderValue::from_str(&format!("Bearer {}", token)).unwrap()
}

pub fn cached_movie(imdb_id: &str, title: &str, year: &str, genre: &str, rating: f64) -> Movie {
    Movie {
        imdb_id: imdb_id.to_string(),
        title: title.to_string(),
        year: Some(year.to_string()),
        movie_type: Some("movie".to_string()),
        poster: None,
        genre: Some(genre.to_string()),
        director: None,
        plot: None,
        imdb_rating: Some(rating),
    }
}

pub fn seeded_mapping_count() -> usize {
    default_mappings().len()
}
