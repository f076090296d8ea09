use sqlx::PgPool;

use crate::{
    error::{AppError, AppResult},
    models::{CoupleRequest, RequestStatus},
};

const REQUEST_SELECT: &str = r#"
    SELECT r.id, r.sender_id, u.email AS sender_email,
           u.first_name AS sender_first_name, u.last_name AS sender_last_name,
           r.receiver_email, r.status, r.created_at
    FROM couple_requests r
    JOIN users u ON u.id = r.sender_id
"#;

/// Couple invitations plus the partner link on `users`.
///
/// `accept` and `unlink` are the only writers of `users.partner_id`, and each
/// touches both users in one transaction so the link stays symmetric.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait CoupleRepository: Send + Sync {
    async fn create_request(&self, sender_id: i64, receiver_email: &str)
        -> AppResult<CoupleRequest>;
    async fn find_request(&self, id: i64) -> AppResult<Option<CoupleRequest>>;
    async fn find_pending(
        &self,
        sender_id: i64,
        receiver_email: &str,
    ) -> AppResult<Option<CoupleRequest>>;
    async fn pending_for(&self, receiver_email: &str) -> AppResult<Vec<CoupleRequest>>;
    async fn sent_by(&self, sender_id: i64) -> AppResult<Vec<CoupleRequest>>;
    async fn reject(&self, request_id: i64) -> AppResult<()>;
    /// Link both users as partners and mark the request accepted.
    /// Fails with `Conflict` if either user was linked in the meantime.
    async fn accept(&self, request_id: i64, sender_id: i64, receiver_id: i64) -> AppResult<()>;
    async fn unlink(&self, user_id: i64, partner_id: i64) -> AppResult<()>;
}

pub struct PgCoupleRepository {
    pool: PgPool,
}

impl PgCoupleRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl CoupleRepository for PgCoupleRepository {
    async fn create_request(
        &self,
        sender_id: i64,
        receiver_email: &str,
    ) -> AppResult<CoupleRequest> {
        let id: i64 = sqlx::query_scalar(
            "INSERT INTO couple_requests (sender_id, receiver_email, status) VALUES ($1, $2, $3) RETURNING id",
        )
        .bind(sender_id)
        .bind(receiver_email)
        .bind(RequestStatus::Pending.as_str())
        .fetch_one(&self.pool)
        .await?;

        self.find_request(id)
            .await?
            .ok_or_else(|| AppError::Internal("Couple request vanished after insert".to_string()))
    }

    async fn find_request(&self, id: i64) -> AppResult<Option<CoupleRequest>> {
        let sql = format!("{} WHERE r.id = $1", REQUEST_SELECT);
        let request = sqlx::query_as::<_, CoupleRequest>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(request)
    }

    async fn find_pending(
        &self,
        sender_id: i64,
        receiver_email: &str,
    ) -> AppResult<Option<CoupleRequest>> {
        let sql = format!(
            "{} WHERE r.sender_id = $1 AND r.receiver_email = $2 AND r.status = $3 LIMIT 1",
            REQUEST_SELECT
        );
        let request = sqlx::query_as::<_, CoupleRequest>(&sql)
            .bind(sender_id)
            .bind(receiver_email)
            .bind(RequestStatus::Pending.as_str())
            .fetch_optional(&self.pool)
            .await?;
        Ok(request)
    }

    async fn pending_for(&self, receiver_email: &str) -> AppResult<Vec<CoupleRequest>> {
        let sql = format!(
            "{} WHERE r.receiver_email = $1 AND r.status = $2 ORDER BY r.created_at DESC",
            REQUEST_SELECT
        );
        let requests = sqlx::query_as::<_, CoupleRequest>(&sql)
            .bind(receiver_email)
            .bind(RequestStatus::Pending.as_str())
            .fetch_all(&self.pool)
            .await?;
        Ok(requests)
    }

    async fn sent_by(&self, sender_id: i64) -> AppResult<Vec<CoupleRequest>> {
        let sql = format!(
            "{} WHERE r.sender_id = $1 ORDER BY r.created_at DESC",
            REQUEST_SELECT
        );
        let requests = sqlx::query_as::<_, CoupleRequest>(&sql)
            .bind(sender_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(requests)
    }

    async fn reject(&self, request_id: i64) -> AppResult<()> {
        sqlx::query("UPDATE couple_requests SET status = $2 WHERE id = $1")
            .bind(request_id)
            .bind(RequestStatus::Rejected.as_str())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn accept(&self, request_id: i64, sender_id: i64, receiver_id: i64) -> AppResult<()> {
        let mut tx = self.pool.begin().await?;

        let linked = sqlx::query(
            r#"
            UPDATE users
            SET partner_id = CASE WHEN id = $1 THEN $2 ELSE $1 END
            WHERE id IN ($1, $2) AND partner_id IS NULL
            "#,
        )
        .bind(sender_id)
        .bind(receiver_id)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        if linked != 2 {
            tx.rollback().await?;
            return Err(AppError::Conflict(
                "One of you already has a partner.".to_string(),
            ));
        }

        let accepted = sqlx::query("UPDATE couple_requests SET status = $2 WHERE id = $1 AND status = $3")
            .bind(request_id)
            .bind(RequestStatus::Accepted.as_str())
            .bind(RequestStatus::Pending.as_str())
            .execute(&mut *tx)
            .await?
            .rows_affected();

        if accepted != 1 {
            tx.rollback().await?;
            return Err(AppError::Conflict(
                "Request is no longer pending".to_string(),
            ));
        }

        tx.commit().await?;
        tracing::info!(request_id, sender_id, receiver_id, "Couple linked");
        Ok(())
    }

    async fn unlink(&self, user_id: i64, partner_id: i64) -> AppResult<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            UPDATE users SET partner_id = NULL
            WHERE (id = $1 AND partner_id = $2) OR (id = $2 AND partner_id = $1)
            "#,
        )
        .bind(user_id)
        .bind(partner_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        tracing::info!(user_id, partner_id, "Couple unlinked");
        Ok(())
    }
}
