use std::sync::Arc;

use crate::{
    db::{CoupleRepository, UserRepository},
    error::{AppError, AppResult},
    models::{auth::normalize_email, CoupleRequest, RequestStatus, User},
};

/// Message for every couple operation attempted without a partner
pub const NO_PARTNER: &str = "You don't have a partner.";

/// Pairing invitations and the partner link itself
#[derive(Clone)]
pub struct CoupleService {
    users: Arc<dyn UserRepository>,
    couples: Arc<dyn CoupleRepository>,
}

impl CoupleService {
    pub fn new(users: Arc<dyn UserRepository>, couples: Arc<dyn CoupleRepository>) -> Self {
        Self { users, couples }
    }

    /// Invite the owner of `email`. A pending invite to the same address is reused.
    #[tracing::instrument(skip(self, sender), fields(sender_id = sender.id))]
    pub async fn invite(&self, sender: &User, email: Option<String>) -> AppResult<CoupleRequest> {
        if sender.partner_id.is_some() {
            return Err(AppError::Conflict("You already have a partner.".to_string()));
        }
        let receiver_email = email
            .as_deref()
            .map(normalize_email)
            .filter(|e| !e.is_empty())
            .ok_or_else(|| AppError::InvalidInput("Email is required".to_string()))?;
        if normalize_email(&sender.email) == receiver_email {
            return Err(AppError::InvalidInput(
                "You cannot invite yourself.".to_string(),
            ));
        }

        if let Some(receiver) = self.users.find_by_email(&receiver_email).await? {
            if receiver.partner_id.is_some() {
                return Err(AppError::Conflict(
                    "This user already has a partner.".to_string(),
                ));
            }
        }

        if let Some(existing) = self
            .couples
            .find_pending(sender.id, &receiver_email)
            .await?
        {
            tracing::debug!(request_id = existing.id, "Reusing pending invite");
            return Ok(existing);
        }

        let request = self
            .couples
            .create_request(sender.id, &receiver_email)
            .await?;
        tracing::info!(request_id = request.id, "Couple invite sent");
        Ok(request)
    }

    pub async fn received(&self, user: &User) -> AppResult<Vec<CoupleRequest>> {
        self.couples.pending_for(&normalize_email(&user.email)).await
    }

    pub async fn sent(&self, user: &User) -> AppResult<Vec<CoupleRequest>> {
        self.couples.sent_by(user.id).await
    }

    #[tracing::instrument(skip(self, receiver), fields(receiver_id = receiver.id))]
    pub async fn accept(&self, receiver: &User, request_id: i64) -> AppResult<()> {
        let request = self.pending_request_for(receiver, request_id).await?;
        self.couples
            .accept(request.id, request.sender_id, receiver.id)
            .await?;
        tracing::info!(
            sender_id = request.sender_id,
            "Couple request accepted, partners linked"
        );
        Ok(())
    }

    #[tracing::instrument(skip(self, receiver), fields(receiver_id = receiver.id))]
    pub async fn reject(&self, receiver: &User, request_id: i64) -> AppResult<()> {
        let request = self.pending_request_for(receiver, request_id).await?;
        self.couples.reject(request.id).await?;
        tracing::info!(sender_id = request.sender_id, "Couple request rejected");
        Ok(())
    }

    pub async fn partner(&self, user: &User) -> AppResult<User> {
        let partner_id = user
            .partner_id
            .ok_or_else(|| AppError::NotFound(NO_PARTNER.to_string()))?;
        self.users
            .find_by_id(partner_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Partner not found".to_string()))
    }

    /// Break the link on both sides. Shared movies stay under the couple key.
    pub async fn unpair(&self, user: &User) -> AppResult<()> {
        let partner_id = user
            .partner_id
            .ok_or_else(|| AppError::InvalidInput(NO_PARTNER.to_string()))?;
        self.couples.unlink(user.id, partner_id).await?;
        tracing::info!(user_id = user.id, partner_id, "Couple unpaired");
        Ok(())
    }

    async fn pending_request_for(&self, receiver: &User, request_id: i64) -> AppResult<CoupleRequest> {
        let request = self
            .couples
            .find_request(request_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Request not found".to_string()))?;

        if normalize_email(&request.receiver_email) != normalize_email(&receiver.email) {
            return Err(AppError::Forbidden(
                "This request is not for you".to_string(),
            ));
        }
        if request.status != RequestStatus::Pending {
            return Err(AppError::Conflict(format!(
                "Request is already {}",
                request.status
            )));
        }
        Ok(request)
    }
}
