use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Build the normalized couple key `"min:max"` for two user ids
pub fn couple_key(user_id1: i64, user_id2: i64) -> String {
    let (min, max) = if user_id1 <= user_id2 {
        (user_id1, user_id2)
    } else {
        (user_id2, user_id1)
    };
    format!("{}:{}", min, max)
}

/// Lifecycle of a couple invitation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RequestStatus {
    Pending,
    Accepted,
    Rejected,
}

impl RequestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestStatus::Pending => "PENDING",
            RequestStatus::Accepted => "ACCEPTED",
            RequestStatus::Rejected => "REJECTED",
        }
    }
}

impl std::fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl TryFrom<String> for RequestStatus {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.as_str() {
            "PENDING" => Ok(RequestStatus::Pending),
            "ACCEPTED" => Ok(RequestStatus::Accepted),
            "REJECTED" => Ok(RequestStatus::Rejected),
            other => Err(format!("unknown request status: {}", other)),
        }
    }
}

/// An invitation from one user to pair with the owner of an email address.
/// Sender details are joined in from the users table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct CoupleRequest {
    pub id: i64,
    pub sender_id: i64,
    pub sender_email: String,
    pub sender_first_name: Option<String>,
    pub sender_last_name: Option<String>,
    pub receiver_email: String,
    #[sqlx(try_from = "String")]
    pub status: RequestStatus,
    pub created_at: DateTime<Utc>,
}

/// Shared watch state of a couple movie
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CoupleWatchStatus {
    #[default]
    Watchlist,
    Watched,
}

impl CoupleWatchStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CoupleWatchStatus::Watchlist => "WATCHLIST",
            CoupleWatchStatus::Watched => "WATCHED",
        }
    }
}

impl TryFrom<String> for CoupleWatchStatus {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.as_str() {
            "WATCHLIST" => Ok(CoupleWatchStatus::Watchlist),
            "WATCHED" => Ok(CoupleWatchStatus::Watched),
            other => Err(format!("unknown watch status: {}", other)),
        }
    }
}

/// A movie on a couple's shared list.
///
/// `added_by_creator` tracks the user who first added it (`added_by_user_id`),
/// `added_by_partner` the other half of the couple. Rating slot 1 starts out
/// belonging to the creator; slot 2 is claimed by whoever rates next.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct CoupleMovie {
    pub id: i64,
    pub couple_key: String,
    pub imdb_id: String,
    pub title: String,
    pub poster: String,
    pub year: String,
    pub genre: String,
    pub added_by_user_id: i64,
    #[sqlx(try_from = "String")]
    pub watch_status: CoupleWatchStatus,
    pub added_by_creator: bool,
    pub added_by_partner: bool,
    pub user1_id: Option<i64>,
    pub user1_rating: Option<f64>,
    pub user2_id: Option<i64>,
    pub user2_rating: Option<f64>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewCoupleMovie {
    pub couple_key: String,
    pub imdb_id: String,
    pub title: String,
    pub poster: String,
    pub year: String,
    pub genre: String,
    pub added_by_user_id: i64,
}

impl CoupleMovie {
    pub fn is_match(&self) -> bool {
        self.added_by_creator && self.added_by_partner
    }

    /// Record that `user_id` added this movie from their side
    pub fn mark_added_by(&mut self, user_id: i64) {
        if self.added_by_user_id == user_id {
            self.added_by_creator = true;
        } else {
            self.added_by_partner = true;
        }
    }

    /// Store a rating in the caller's slot, claiming a free slot when needed.
    /// Rating a movie also marks it as watched.
    pub fn apply_rating(&mut self, user_id: i64, rating: f64) {
        if self.user1_id == Some(user_id) {
            self.user1_rating = Some(rating);
        } else if self.user2_id == Some(user_id) {
            self.user2_rating = Some(rating);
        } else if self.user1_id.is_none() {
            self.user1_id = Some(user_id);
            self.user1_rating = Some(rating);
        } else {
            self.user2_id = Some(user_id);
            self.user2_rating = Some(rating);
        }
        self.watch_status = CoupleWatchStatus::Watched;
    }

    /// (your rating, partner rating) as seen by `user_id`
    pub fn ratings_for(&self, user_id: i64) -> (Option<f64>, Option<f64>) {
        if self.user1_id == Some(user_id) {
            (self.user1_rating, self.user2_rating)
        } else {
            (self.user2_rating, self.user1_rating)
        }
    }
}

/// A couple movie projected for one of the partners
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CoupleMovieView {
    pub id: i64,
    pub imdb_id: String,
    pub title: String,
    pub poster: String,
    pub year: String,
    pub genre: String,
    pub watch_status: CoupleWatchStatus,
    pub added_by_user_id: i64,
    pub user_you_added: bool,
    pub partner_added: bool,
    pub is_match: bool,
    pub your_rating: Option<f64>,
    pub partner_rating: Option<f64>,
    pub created_at: DateTime<Utc>,
}

impl CoupleMovieView {
    pub fn for_user(movie: &CoupleMovie, user_id: i64) -> Self {
        let is_adder = movie.added_by_user_id == user_id;
        let (user_you_added, partner_added) = if is_adder {
            (movie.added_by_creator, movie.added_by_partner)
        } else {
            (movie.added_by_partner, movie.added_by_creator)
        };
        let (your_rating, partner_rating) = movie.ratings_for(user_id);

        Self {
            id: movie.id,
            imdb_id: movie.imdb_id.clone(),
            title: movie.title.clone(),
            poster: movie.poster.clone(),
            year: movie.year.clone(),
            genre: movie.genre.clone(),
            watch_status: movie.watch_status,
            added_by_user_id: movie.added_by_user_id,
            user_you_added,
            partner_added,
            is_match: movie.is_match(),
            your_rating,
            partner_rating,
            created_at: movie.created_at,
        }
    }
}

/// Aggregate counts over a couple's shared list
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct CoupleStats {
    pub matches: usize,
    pub watchlist: usize,
    pub watched: usize,
}

impl CoupleStats {
    pub fn from_movies(movies: &[CoupleMovie]) -> Self {
        Self {
            matches: movies.iter().filter(|m| m.is_match()).count(),
            watchlist: movies
                .iter()
                .filter(|m| m.watch_status == CoupleWatchStatus::Watchlist)
                .count(),
            watched: movies
                .iter()
                .filter(|m| m.watch_status == CoupleWatchStatus::Watched)
                .count(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn movie(added_by: i64) -> CoupleMovie {
        CoupleMovie {
            id: 1,
            couple_key: couple_key(3, 12),
            imdb_id: "tt0111161".to_string(),
            title: "The Shawshank Redemption".to_string(),
            poster: String::new(),
            year: "1994".to_string(),
            genre: "Drama".to_string(),
            added_by_user_id: added_by,
            watch_status: CoupleWatchStatus::Watchlist,
            added_by_creator: true,
            added_by_partner: false,
            user1_id: Some(added_by),
            user1_rating: None,
            user2_id: None,
            user2_rating: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_couple_key_is_order_independent() {
        assert_eq!(couple_key(3, 12), "3:12");
        assert_eq!(couple_key(12, 3), "3:12");
    }

    #[test]
    fn test_couple_key_compares_numerically() {
        // "10" < "9" as strings, but not as ids
        assert_eq!(couple_key(10, 9), "9:10");
    }

    #[test]
    fn test_mark_added_by_partner_makes_match() {
        let mut m = movie(3);
        assert!(!m.is_match());
        m.mark_added_by(3);
        assert!(!m.is_match());
        m.mark_added_by(12);
        assert!(m.is_match());
    }

    #[test]
    fn test_apply_rating_uses_existing_slot() {
        let mut m = movie(3);
        m.apply_rating(3, 4.5);
        assert_eq!(m.user1_rating, Some(4.5));
        assert_eq!(m.user2_id, None);
        assert_eq!(m.watch_status, CoupleWatchStatus::Watched);
    }

    #[test]
    fn test_apply_rating_partner_takes_second_slot() {
        let mut m = movie(3);
        m.apply_rating(12, 2.0);
        assert_eq!(m.user1_id, Some(3));
        assert_eq!(m.user2_id, Some(12));
        assert_eq!(m.user2_rating, Some(2.0));

        m.apply_rating(12, 3.0);
        assert_eq!(m.user2_rating, Some(3.0));
    }

    #[test]
    fn test_apply_rating_claims_empty_first_slot() {
        let mut m = movie(3);
        m.user1_id = None;
        m.apply_rating(12, 1.5);
        assert_eq!(m.user1_id, Some(12));
        assert_eq!(m.user1_rating, Some(1.5));
    }

    #[test]
    fn test_view_swaps_flags_for_partner() {
        let mut m = movie(3);
        m.apply_rating(3, 5.0);
        m.apply_rating(12, 3.5);

        let adder_view = CoupleMovieView::for_user(&m, 3);
        assert!(adder_view.user_you_added);
        assert!(!adder_view.partner_added);
        assert_eq!(adder_view.your_rating, Some(5.0));
        assert_eq!(adder_view.partner_rating, Some(3.5));

        let partner_view = CoupleMovieView::for_user(&m, 12);
        assert!(!partner_view.user_you_added);
        assert!(partner_view.partner_added);
        assert_eq!(partner_view.your_rating, Some(3.5));
        assert_eq!(partner_view.partner_rating, Some(5.0));
    }

    #[test]
    fn test_stats_counts() {
        let mut watched = movie(3);
        watched.apply_rating(3, 4.0);
        let mut matched = movie(3);
        matched.mark_added_by(12);
        let stats = CoupleStats::from_movies(&[watched, matched, movie(12)]);
        assert_eq!(
            stats,
            CoupleStats {
                matches: 1,
                watchlist: 2,
                watched: 1
            }
        );
    }

    #[test]
    fn test_watch_status_serde() {
        assert_eq!(
            serde_json::to_string(&CoupleWatchStatus::Watchlist).unwrap(),
            "\"WATCHLIST\""
        );
        let parsed: CoupleWatchStatus = serde_json::from_str("\"WATCHED\"").unwrap();
        assert_eq!(parsed, CoupleWatchStatus::Watched);
    }
}
