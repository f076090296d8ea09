use std::sync::Arc;

use crate::{
    db::FavoriteRepository,
    error::AppResult,
    models::{Favorite, NewFavorite, SaveMovieRequest, User},
};

/// Result of adding a favorite
#[derive(Debug, Clone, PartialEq)]
pub enum AddFavorite {
    Added(Favorite),
    AlreadyFavorited,
}

#[derive(Clone)]
pub struct FavoriteService {
    favorites: Arc<dyn FavoriteRepository>,
}

impl FavoriteService {
    pub fn new(favorites: Arc<dyn FavoriteRepository>) -> Self {
        Self { favorites }
    }

    pub async fn list(&self, user: &User) -> AppResult<Vec<Favorite>> {
        self.favorites.list(user.id).await
    }

    pub async fn add(&self, user: &User, request: SaveMovieRequest) -> AppResult<AddFavorite> {
        let imdb_id = request.require_imdb_id()?;
        let created = self
            .favorites
            .create(NewFavorite {
                user_id: user.id,
                imdb_id,
                title: request.title.unwrap_or_default(),
                poster: request.poster.unwrap_or_default(),
                year: request.year.unwrap_or_default(),
                genre: request.genre.unwrap_or_default(),
            })
            .await?;
        match created {
            Some(favorite) => {
                tracing::info!(user_id = user.id, imdb_id = %favorite.imdb_id, "Added favorite");
                Ok(AddFavorite::Added(favorite))
            }
            None => Ok(AddFavorite::AlreadyFavorited),
        }
    }

    pub async fn remove(&self, user: &User, imdb_id: &str) -> AppResult<()> {
        self.favorites.delete(user.id, imdb_id).await?;
        Ok(())
    }

    /// Anonymous callers have no favorites
    pub async fn is_favorite(&self, user: Option<&User>, imdb_id: &str) -> AppResult<bool> {
        match user {
            Some(user) => Ok(self.favorites.find(user.id, imdb_id).await?.is_some()),
            None => Ok(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{db::repositories::favorites::MockFavoriteRepository, models::Role};
    use chrono::Utc;

    fn user() -> User {
        User {
            id: 8,
            email: "ana@example.com".to_string(),
            username: None,
            password_hash: None,
            first_name: None,
            last_name: None,
            role: Role::User,
            google_id: None,
            avatar_url: None,
            partner_id: None,
            is_verified: true,
            created_at: Utc::now(),
        }
    }

    fn favorite(imdb_id: &str) -> Favorite {
        Favorite {
            id: 1,
            user_id: 8,
            imdb_id: imdb_id.to_string(),
            title: "Amelie".to_string(),
            poster: String::new(),
            year: "2001".to_string(),
            genre: String::new(),
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_add_existing_favorite_is_already_favorited() {
        // A duplicate insert, including one racing another request, yields no row
        let mut repo = MockFavoriteRepository::new();
        repo.expect_find().never();
        repo.expect_create().times(1).returning(|_| Ok(None));

        let result = FavoriteService::new(Arc::new(repo))
            .add(
                &user(),
                SaveMovieRequest {
                    imdb_id: Some("tt0211915".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(result, AddFavorite::AlreadyFavorited);
    }

    #[tokio::test]
    async fn test_add_defaults_missing_fields() {
        let mut repo = MockFavoriteRepository::new();
        repo.expect_create()
            .withf(|f| f.user_id == 8 && f.title == "Amelie" && f.genre.is_empty())
            .times(1)
            .returning(|f| Ok(Some(favorite(&f.imdb_id))));

        let result = FavoriteService::new(Arc::new(repo))
            .add(
                &user(),
                SaveMovieRequest {
                    imdb_id: Some("tt0211915".to_string()),
                    title: Some("Amelie".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert!(matches!(result, AddFavorite::Added(f) if f.imdb_id == "tt0211915"));
    }

    #[tokio::test]
    async fn test_anonymous_check_is_false() {
        let mut repo = MockFavoriteRepository::new();
        repo.expect_find().never();
        let service = FavoriteService::new(Arc::new(repo));
        assert!(!service.is_favorite(None, "tt0211915").await.unwrap());
    }
}
