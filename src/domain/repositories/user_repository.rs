//! Repository trait for user accounts.

use crate::domain::entities::{NewUser, User};
use crate::error::AppError;
use async_trait::async_trait;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Creates a new user.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Conflict`] if the username is taken.
    async fn create(&self, new_user: NewUser) -> Result<User, AppError>;

    async fn find_by_id(&self, id: i64) -> Result<Option<User>, AppError>;

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, AppError>;

    /// Lists all users, oldest first.
    async fn list(&self) -> Result<Vec<User>, AppError>;

    /// Grants or revokes staff access. Returns `Ok(false)` if the user does not exist.
    async fn set_staff(&self, id: i64, is_staff: bool) -> Result<bool, AppError>;

    /// Activates or deactivates an account. Returns `Ok(false)` if the user does not exist.
    async fn set_active(&self, id: i64, is_active: bool) -> Result<bool, AppError>;
}
