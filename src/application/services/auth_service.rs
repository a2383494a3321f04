//! Password login and JWT issuance/verification.

use std::sync::Arc;

use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::domain::entities::User;
use crate::domain::repositories::UserRepository;
use crate::error::AppError;

/// Message returned for any failed login, so usernames cannot be probed.
const INVALID_CREDENTIALS: &str = "No active account found with the given credentials";

/// Distinguishes short-lived access tokens from refresh tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

/// JWT payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User id.
    pub sub: String,
    pub username: String,
    pub kind: TokenKind,
    pub iat: i64,
    pub exp: i64,
}

/// Result of a successful login.
#[derive(Debug, Clone)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
    pub username: String,
    pub email: String,
}

/// The caller behind a verified access token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub id: i64,
    pub username: String,
    pub is_staff: bool,
}

impl From<&User> for AuthUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            is_staff: user.is_staff,
        }
    }
}

/// Service for authenticating users with HS256 bearer tokens.
///
/// Every verified token is resolved against the user table so that
/// deactivated accounts lose access before their tokens expire.
pub struct AuthService<U: UserRepository> {
    users: Arc<U>,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl<U: UserRepository> AuthService<U> {
    /// Creates a new authentication service.
    ///
    /// # Arguments
    ///
    /// - `users` - user repository
    /// - `secret` - HMAC signing key shared by all instances
    /// - `access_ttl_seconds` / `refresh_ttl_seconds` - token lifetimes
    pub fn new(
        users: Arc<U>,
        secret: &str,
        access_ttl_seconds: u64,
        refresh_ttl_seconds: u64,
    ) -> Self {
        Self {
            users,
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            access_ttl: Duration::seconds(access_ttl_seconds as i64),
            refresh_ttl: Duration::seconds(refresh_ttl_seconds as i64),
        }
    }

    /// Verifies a username/password pair and issues an access/refresh pair.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Unauthorized`] for unknown users, inactive users
    /// and wrong passwords alike.
    pub async fn login(&self, username: &str, password: &str) -> Result<TokenPair, AppError> {
        let user = self
            .users
            .find_by_username(username)
            .await?
            .filter(|u| u.is_active)
            .ok_or_else(|| AppError::unauthorized(INVALID_CREDENTIALS, json!({})))?;

        if !verify_password(password, &user.password_hash).await? {
            return Err(AppError::unauthorized(INVALID_CREDENTIALS, json!({})));
        }

        tracing::info!(user_id = user.id, "User logged in");

        Ok(TokenPair {
            access: self.issue(&user, TokenKind::Access)?,
            refresh: self.issue(&user, TokenKind::Refresh)?,
            username: user.username,
            email: user.email,
        })
    }

    /// Exchanges a refresh token for a new access token.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Unauthorized`] if the token is invalid, expired,
    /// is an access token, or its user is gone or inactive.
    pub async fn refresh(&self, refresh_token: &str) -> Result<String, AppError> {
        let claims = self.verify(refresh_token, TokenKind::Refresh)?;
        let user = self.active_user(&claims).await?;
        self.issue(&user, TokenKind::Access)
    }

    /// Resolves an access token to the user it was issued for.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Unauthorized`] if the token is invalid, expired,
    /// is a refresh token, or its user is gone or inactive.
    pub async fn authenticate(&self, access_token: &str) -> Result<AuthUser, AppError> {
        let claims = self.verify(access_token, TokenKind::Access)?;
        let user = self.active_user(&claims).await?;
        Ok(AuthUser::from(&user))
    }

    fn issue(&self, user: &User, kind: TokenKind) -> Result<String, AppError> {
        let now = Utc::now();
        let ttl = match kind {
            TokenKind::Access => self.access_ttl,
            TokenKind::Refresh => self.refresh_ttl,
        };

        let claims = Claims {
            sub: user.id.to_string(),
            username: user.username.clone(),
            kind,
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key).map_err(|e| {
            AppError::internal("Failed to sign token", json!({ "reason": e.to_string() }))
        })
    }

    fn verify(&self, token: &str, expected: TokenKind) -> Result<Claims, AppError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        let claims = decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| {
                AppError::unauthorized(
                    "Given token not valid for any token type",
                    json!({ "reason": e.to_string() }),
                )
            })?;

        if claims.kind != expected {
            return Err(AppError::unauthorized(
                "Token has wrong type",
                json!({ "expected": expected }),
            ));
        }

        Ok(claims)
    }

    async fn active_user(&self, claims: &Claims) -> Result<User, AppError> {
        let user_id: i64 = claims.sub.parse().map_err(|_| {
            AppError::unauthorized("Token contained no recognizable user identification", json!({}))
        })?;

        self.users
            .find_by_id(user_id)
            .await?
            .filter(|u| u.is_active)
            .ok_or_else(|| {
                AppError::unauthorized("User not found", json!({ "user_id": user_id }))
            })
    }
}

/// Hashes a password with bcrypt at the default cost.
///
/// # Errors
///
/// Returns [`AppError::Internal`] if hashing fails.
pub fn hash_password(password: &str) -> Result<String, AppError> {
    bcrypt::hash(password, bcrypt::DEFAULT_COST)
        .map_err(|e| AppError::internal("Failed to hash password", json!({ "reason": e.to_string() })))
}

/// Runs bcrypt verification off the async executor.
async fn verify_password(password: &str, hash: &str) -> Result<bool, AppError> {
    let password = password.to_owned();
    let hash = hash.to_owned();

    let outcome = tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash))
        .await
        .map_err(|e| AppError::internal("Password check aborted", json!({ "reason": e.to_string() })))?;

    // A malformed stored hash is treated as a mismatch.
    Ok(outcome.unwrap_or(false))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::repositories::MockUserRepository;

    const SECRET: &str = "test-jwt-secret";

    fn user(id: i64, password: &str, is_active: bool) -> User {
        User {
            id,
            username: "alice".to_string(),
            email: "alice@example.com".to_string(),
            password_hash: bcrypt::hash(password, 4).unwrap(),
            is_staff: false,
            is_active,
            created_at: Utc::now(),
        }
    }

    fn service(repo: MockUserRepository) -> AuthService<MockUserRepository> {
        AuthService::new(Arc::new(repo), SECRET, 300, 86_400)
    }

    #[tokio::test]
    async fn test_login_success() {
        let mut repo = MockUserRepository::new();
        let stored = user(7, "s3cret-pass", true);
        repo.expect_find_by_username()
            .withf(|name| name == "alice")
            .times(1)
            .returning(move |_| Ok(Some(stored.clone())));

        let pair = service(repo).login("alice", "s3cret-pass").await.unwrap();

        assert_eq!(pair.username, "alice");
        assert_eq!(pair.email, "alice@example.com");
        assert_ne!(pair.access, pair.refresh);
    }

    #[tokio::test]
    async fn test_login_wrong_password() {
        let mut repo = MockUserRepository::new();
        let stored = user(7, "s3cret-pass", true);
        repo.expect_find_by_username()
            .returning(move |_| Ok(Some(stored.clone())));

        let result = service(repo).login("alice", "nope").await;

        assert!(matches!(result, Err(AppError::Unauthorized { .. })));
    }

    #[tokio::test]
    async fn test_login_unknown_and_inactive_users() {
        let mut repo = MockUserRepository::new();
        repo.expect_find_by_username()
            .withf(|name| name == "ghost")
            .returning(|_| Ok(None));
        let inactive = user(8, "s3cret-pass", false);
        repo.expect_find_by_username()
            .withf(|name| name == "alice")
            .returning(move |_| Ok(Some(inactive.clone())));
        let svc = service(repo);

        assert!(matches!(
            svc.login("ghost", "s3cret-pass").await,
            Err(AppError::Unauthorized { .. })
        ));
        assert!(matches!(
            svc.login("alice", "s3cret-pass").await,
            Err(AppError::Unauthorized { .. })
        ));
    }

    #[tokio::test]
    async fn test_access_token_authenticates() {
        let mut repo = MockUserRepository::new();
        let stored = user(7, "pw", true);
        let for_lookup = stored.clone();
        repo.expect_find_by_id()
            .withf(|id| *id == 7)
            .returning(move |_| Ok(Some(for_lookup.clone())));

        let svc = service(repo);
        let token = svc.issue(&stored, TokenKind::Access).unwrap();
        let auth = svc.authenticate(&token).await.unwrap();

        assert_eq!(
            auth,
            AuthUser {
                id: 7,
                username: "alice".to_string(),
                is_staff: false
            }
        );
    }

    #[tokio::test]
    async fn test_refresh_token_rejected_as_access() {
        let repo = MockUserRepository::new();
        let svc = service(repo);
        let token = svc.issue(&user(7, "pw", true), TokenKind::Refresh).unwrap();

        let result = svc.authenticate(&token).await;

        match result {
            Err(AppError::Unauthorized { message, .. }) => assert_eq!(message, "Token has wrong type"),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_refresh_issues_access_token() {
        let mut repo = MockUserRepository::new();
        let stored = user(7, "pw", true);
        let for_lookup = stored.clone();
        repo.expect_find_by_id()
            .returning(move |_| Ok(Some(for_lookup.clone())));

        let svc = service(repo);
        let refresh = svc.issue(&stored, TokenKind::Refresh).unwrap();
        let access = svc.refresh(&refresh).await.unwrap();

        let claims = svc.verify(&access, TokenKind::Access).unwrap();
        assert_eq!(claims.sub, "7");
        assert_eq!(claims.exp - claims.iat, 300);
    }

    #[tokio::test]
    async fn test_access_token_rejected_as_refresh() {
        let repo = MockUserRepository::new();
        let svc = service(repo);
        let access = svc.issue(&user(7, "pw", true), TokenKind::Access).unwrap();

        assert!(matches!(
            svc.refresh(&access).await,
            Err(AppError::Unauthorized { .. })
        ));
    }

    #[tokio::test]
    async fn test_expired_and_foreign_tokens_rejected() {
        let repo = MockUserRepository::new();
        let svc = service(repo);

        let expired = Claims {
            sub: "7".to_string(),
            username: "alice".to_string(),
            kind: TokenKind::Access,
            iat: Utc::now().timestamp() - 600,
            exp: Utc::now().timestamp() - 300,
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &expired,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap();
        assert!(svc.authenticate(&token).await.is_err());

        let other = AuthService::new(Arc::new(MockUserRepository::new()), "other-secret", 300, 300);
        let foreign = other.issue(&user(7, "pw", true), TokenKind::Access).unwrap();
        assert!(svc.authenticate(&foreign).await.is_err());

        assert!(svc.authenticate("not-a-jwt").await.is_err());
    }

    #[tokio::test]
    async fn test_deactivated_user_loses_access() {
        let mut repo = MockUserRepository::new();
        let stored = user(7, "pw", true);
        let mut deactivated = stored.clone();
        deactivated.is_active = false;
        repo.expect_find_by_id()
            .returning(move |_| Ok(Some(deactivated.clone())));

        let svc = service(repo);
        let token = svc.issue(&stored, TokenKind::Access).unwrap();

        assert!(matches!(
            svc.authenticate(&token).await,
            Err(AppError::Unauthorized { .. })
        ));
    }

    #[test]
    fn test_hash_password_verifies() {
        let hash = hash_password("correct horse").unwrap();
        assert!(bcrypt::verify("correct horse", &hash).unwrap());
        assert!(!bcrypt::verify("battery staple", &hash).unwrap());
    }
}
