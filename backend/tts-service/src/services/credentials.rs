/// Credential service - registration and login
use crate::db::Store;
use crate::error::{AppError, Result};
use crate::models::{RegisterRequest, User};
use crate::security::{hash_password, verify_password};
use crate::validators::normalize_email;
use chrono::Utc;
use crypto_core::{IssuedToken, TokenCodec};
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

#[derive(Clone)]
pub struct CredentialStore {
    repo: Arc<dyn Store>,
    codec: Arc<TokenCodec>,
}

impl CredentialStore {
    pub fn new(repo: Arc<dyn Store>, codec: Arc<TokenCodec>) -> Self {
        Self { repo, codec }
    }

    /// Create an identity. Emails are unique case-insensitively.
    pub async fn register(&self, req: RegisterRequest) -> Result<User> {
        req.validate()?;

        let email = normalize_email(&req.email);
        let password = req.password;
        // Argon2 is CPU-bound; keep it off the async workers.
        let password_hash = tokio::task::spawn_blocking(move || hash_password(&password)).await??;

        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            email,
            password_hash,
            created_at: now,
            updated_at: now,
        };

        self.repo.insert_user(&user).await?;

        tracing::info!(user_id = %user.id, "user registered");
        Ok(user)
    }

    /// Check credentials and issue a session token.
    ///
    /// Unknown email and wrong password both yield `InvalidCredentials`.
    pub async fn login(&self, email: &str, password: &str) -> Result<(User, IssuedToken)> {
        let email = normalize_email(email);
        let user = self
            .repo
            .find_user_by_email(&email)
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        let candidate = password.to_string();
        let stored = user.password_hash.clone();
        let matches =
            tokio::task::spawn_blocking(move || verify_password(&candidate, &stored)).await??;
        if !matches {
            tracing::debug!(user_id = %user.id, "login rejected");
            return Err(AppError::InvalidCredentials);
        }

        let issued = self
            .codec
            .issue(user.id, &user.email, self.codec.default_ttl())?;

        tracing::info!(user_id = %user.id, "user logged in");
        Ok((user, issued))
    }
}
