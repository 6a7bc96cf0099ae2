use anyhow::anyhow;
use uuid::Uuid;

use crate::auth::{password, AuthError, TokenService};
use crate::error::{AppError, AppResult};
use crate::models::{SignInRequest, SignUpRequest, User};
use crate::repository::UserRepository;

#[derive(Clone)]
pub struct AuthService {
    users: UserRepository,
    tokens: TokenService,
    bcrypt_cost: u32,
}

fn required(value: Option<String>, field: &str) -> AppResult<String> {
    value.filter(|v| !v.trim().is_empty()).ok_or_else(|| AppError::ValidationError {
        field: field.to_string(),
        message: "must not be empty".to_string(),
    })
}

impl AuthService {
    pub fn new(users: UserRepository, tokens: TokenService, bcrypt_cost: u32) -> Self {
        Self { users, tokens, bcrypt_cost }
    }

    /// Stores a new user with a salted bcrypt hash and returns its id.
    pub async fn create_user(&self, req: SignUpRequest) -> AppResult<Uuid> {
        let mail = required(req.profile.mail.clone(), "mail")?;
        let plain = required(req.password, "password")?;
        if !password::fits(&plain) {
            return Err(AppError::ValidationError {
                field: "password".to_string(),
                message: format!("must be at most {} bytes", password::MAX_PASSWORD_BYTES),
            });
        }

        let cost = self.bcrypt_cost;
        let hashed = tokio::task::spawn_blocking(move || password::hash_password(&plain, cost))
            .await
            .map_err(|e| anyhow!("hashing task failed: {}", e))??;

        let mut mask = req.profile.field_mask();
        mask.set("mail", mail.trim()).set("password_hash", hashed.hash).set("salt", hashed.salt);
        let id = self.users.create(mask).await?;
        tracing::info!(user_id = %id, "user created");
        Ok(id)
    }

    /// Looks the user up by mail and checks the password. Both failure causes
    /// yield the same `InvalidCredentials` error.
    pub async fn get_user_by_mail(&self, mail: &str, plain: &str) -> AppResult<User> {
        let user = self.users.get_by_mail(mail.trim()).await?.ok_or(AuthError::InvalidCredentials)?;
        let (plain, salt, hash) = (plain.to_string(), user.salt.clone(), user.password_hash.clone());
        let matches = tokio::task::spawn_blocking(move || password::verify_password(&plain, &salt, &hash))
            .await
            .map_err(|e| anyhow!("verification task failed: {}", e))?;
        if !matches {
            return Err(AuthError::InvalidCredentials.into());
        }
        Ok(user)
    }

    pub fn generate_token(&self, user_id: Uuid) -> AppResult<String> {
        Ok(self.tokens.generate(user_id)?)
    }

    pub fn parse_token(&self, token: &str) -> Result<Uuid, AuthError> {
        self.tokens.parse(token)
    }

    pub async fn sign_in(&self, req: SignInRequest) -> AppResult<String> {
        let mail = required(req.mail, "mail")?;
        let plain = required(req.password, "password")?;
        let user = self.get_user_by_mail(&mail, &plain).await?;
        self.generate_token(user.id)
    }
}
