// Postgres-backed user store

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::models::{UpdateProfileRequest, User};
use crate::auth::store::{NewUser, StoreError, UserStore};

const USER_COLUMNS: &str = "id, email, username, password_hash, full_name, is_active, created_at, \
     phone, address_line1, address_line2, city, state, postal_code, country";

/// User store backed by a PostgreSQL connection pool
pub struct PostgresUserStore {
    pool: PgPool,
}

impl PostgresUserStore {
    /// Create a new PostgresUserStore
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for PostgresUserStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users WHERE LOWER(email) = LOWER($1)",
            USER_COLUMNS
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users WHERE id = $1",
            USER_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn create(&self, new_user: NewUser) -> Result<User, StoreError> {
        // The unique index on LOWER(email) turns a concurrent duplicate
        // registration into a DuplicateEmail error rather than a second row
        let user = sqlx::query_as::<_, User>(&format!(
            "INSERT INTO users (id, email, username, password_hash, full_name) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {}",
            USER_COLUMNS
        ))
        .bind(Uuid::new_v4())
        .bind(&new_user.email)
        .bind(&new_user.username)
        .bind(&new_user.password_hash)
        .bind(&new_user.full_name)
        .fetch_one(&self.pool)
        .await?;

        Ok(user)
    }

    async fn update_password(&self, id: Uuid, password_hash: &str) -> Result<bool, StoreError> {
        let result = sqlx::query("UPDATE users SET password_hash = $1 WHERE id = $2")
            .bind(password_hash)
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn update_profile(
        &self,
        id: Uuid,
        changes: UpdateProfileRequest,
    ) -> Result<Option<User>, StoreError> {
        // Read-modify-write inside a transaction so omitted fields keep
        // their current values
        let mut tx = self.pool.begin().await?;

        let existing = sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users WHERE id = $1",
            USER_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;

        let existing = match existing {
            Some(user) => user,
            None => return Ok(None),
        };

        let updated = sqlx::query_as::<_, User>(&format!(
            "UPDATE users \
             SET full_name = $1, phone = $2, address_line1 = $3, address_line2 = $4, \
                 city = $5, state = $6, postal_code = $7, country = $8 \
             WHERE id = $9 \
             RETURNING {}",
            USER_COLUMNS
        ))
        .bind(changes.full_name.or(existing.full_name))
        .bind(changes.phone.or(existing.phone))
        .bind(changes.address_line1.or(existing.address_line1))
        .bind(changes.address_line2.or(existing.address_line2))
        .bind(changes.city.or(existing.city))
        .bind(changes.state.or(existing.state))
        .bind(changes.postal_code.or(existing.postal_code))
        .bind(changes.country.or(existing.country))
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(Some(updated))
    }

    async fn set_active(&self, id: Uuid, active: bool) -> Result<bool, StoreError> {
        let result = sqlx::query("UPDATE users SET is_active = $1 WHERE id = $2")
            .bind(active)
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
