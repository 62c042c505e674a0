//! Authentication service for user registration, login, and token management

use bcrypt::{hash, verify, DEFAULT_COST};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use shared::models::User;
use shared::validation::{validate_password_confirmation, validate_username};

use crate::config::Config;
use crate::error::{AppError, AppResult};

/// Authentication service
#[derive(Clone)]
pub struct AuthService {
    db: PgPool,
    jwt_secret: String,
    token_expiry: i64,
}

/// Input for registering a new user
#[derive(Debug, Deserialize)]
pub struct RegisterInput {
    pub username: String,
    pub password: String,
    pub confirm_password: String,
}

/// JWT claims structure
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // User ID
    pub username: String,
    pub exp: i64,
    pub iat: i64,
}

/// Token issued on registration and login
#[derive(Debug, Serialize)]
pub struct AuthToken {
    pub token: String,
    pub token_type: String,
    pub expires_in: i64,
    pub user: User,
}

/// User info from database
#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    username: String,
    password_hash: String,
    created_at: DateTime<Utc>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        Self {
            id: row.id,
            username: row.username,
            created_at: row.created_at,
        }
    }
}

/// Sign a token for `user_id` valid for `expiry_secs` seconds
pub fn issue_token(
    user_id: Uuid,
    username: &str,
    secret: &str,
    expiry_secs: i64,
) -> AppResult<String> {
    let now = Utc::now();
    let claims = Claims {
        sub: user_id.to_string(),
        username: username.to_string(),
        exp: (now + Duration::seconds(expiry_secs)).timestamp(),
        iat: now.timestamp(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(format!("Token generation failed: {}", e)))
}

/// Verify signature and expiry of a token
pub fn decode_token(token: &str, secret: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.code().as_deref() == Some("23505"))
}

impl AuthService {
    /// Create a new AuthService instance
    pub fn new(db: PgPool, config: &Config) -> Self {
        Self {
            db,
            jwt_secret: config.jwt.secret.clone(),
            token_expiry: config.jwt.token_expiry,
        }
    }

    /// Register a new user and sign them in
    pub async fn register(&self, input: RegisterInput) -> AppResult<AuthToken> {
        validate_username(&input.username).map_err(|m| AppError::validation("username", m))?;
        validate_password_confirmation(&input.password, &input.confirm_password)
            .map_err(|m| AppError::validation("confirm_password", m))?;

        let existing =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users WHERE username = $1")
                .bind(&input.username)
                .fetch_one(&self.db)
                .await?;

        if existing > 0 {
            return Err(AppError::DuplicateEntry("username".to_string()));
        }

        let user = self.create_user(&input.username, &input.password).await?;
        self.token_for(user)
    }

    /// Authenticate user with username and password
    pub async fn login(&self, username: &str, password: &str) -> AppResult<AuthToken> {
        if username.is_empty() || password.is_empty() {
            return Err(AppError::validation(
                "username",
                "Username and password are required",
            ));
        }

        let user = self
            .find_by_username(username)
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        let valid = verify(password, &user.password_hash)
            .map_err(|e| AppError::Internal(format!("Password verification failed: {}", e)))?;

        if !valid {
            return Err(AppError::InvalidCredentials);
        }

        self.token_for(user.into())
    }

    /// Create the bootstrap admin account unless it already exists.
    /// Returns whether an account was created.
    pub async fn ensure_admin(&self, username: &str, password: &str) -> AppResult<bool> {
        if self.find_by_username(username).await?.is_some() {
            return Ok(false);
        }

        match self.create_user(username, password).await {
            Ok(_) => Ok(true),
            // Another instance created it first
            Err(AppError::DuplicateEntry(_)) => Ok(false),
            Err(e) => Err(e),
        }
    }

    async fn find_by_username(&self, username: &str) -> AppResult<Option<UserRow>> {
        let user = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, username, password_hash, created_at
            FROM users
            WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(&self.db)
        .await?;

        Ok(user)
    }

    async fn create_user(&self, username: &str, password: &str) -> AppResult<User> {
        let password_hash = hash(password, DEFAULT_COST)
            .map_err(|e| AppError::Internal(format!("Password hashing failed: {}", e)))?;

        let row = sqlx::query_as::<_, UserRow>(
            r#"
            INSERT INTO users (username, password_hash)
            VALUES ($1, $2)
            RETURNING id, username, password_hash, created_at
            "#,
        )
        .bind(username)
        .bind(&password_hash)
        .fetch_one(&self.db)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AppError::DuplicateEntry("username".to_string())
            } else {
                AppError::DatabaseError(e)
            }
        })?;

        Ok(row.into())
    }

    fn token_for(&self, user: User) -> AppResult<AuthToken> {
        let token = issue_token(user.id, &user.username, &self.jwt_secret, self.token_expiry)?;

        Ok(AuthToken {
            token,
            token_type: "Bearer".to_string(),
            expires_in: self.token_expiry,
            user,
        })
    }
}
