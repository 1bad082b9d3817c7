// User persistence behind a single interface
//
// Two backends implement the same trait: Postgres for deployments with a
// DATABASE_URL, and an in-memory map for local runs and tests. The backend
// is chosen once at startup, never per request.

pub mod memory;
pub mod postgres;

pub use memory::InMemoryUserStore;
pub use postgres::PostgresUserStore;

use async_trait::async_trait;
use uuid::Uuid;

use crate::auth::models::{UpdateProfileRequest, User};

/// Store-level errors
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("email already registered")]
    DuplicateEmail,

    #[error("database error: {0}")]
    Database(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        // Unique constraint violations on the email index surface as
        // duplicate registrations, not internal faults
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.is_unique_violation() {
                return StoreError::DuplicateEmail;
            }
        }
        StoreError::Database(err.to_string())
    }
}

/// Fields required to create a user record
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub username: String,
    pub password_hash: String,
    pub full_name: Option<String>,
}

/// User persistence operations.
///
/// "Not found" is an expected outcome, reported as `Ok(None)` or
/// `Ok(false)`, never as an error.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Find a user by email, case-insensitively
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;

    /// Find a user by id
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError>;

    /// Create a new user; fails with `DuplicateEmail` when the email is taken
    async fn create(&self, new_user: NewUser) -> Result<User, StoreError>;

    /// Replace a user's password hash; returns false when the user is absent
    async fn update_password(&self, id: Uuid, password_hash: &str) -> Result<bool, StoreError>;

    /// Apply a partial profile update; returns the updated record, or None
    /// when the user is absent
    async fn update_profile(
        &self,
        id: Uuid,
        changes: UpdateProfileRequest,
    ) -> Result<Option<User>, StoreError>;

    /// Set the active flag; returns false when the user is absent
    async fn set_active(&self, id: Uuid, active: bool) -> Result<bool, StoreError>;
}
