// In-memory user store
//
// Used when no DATABASE_URL is configured, and by tests. Email uniqueness is
// enforced through a lowercase index. Lock order is users first, then the
// index; readers that need both take them one at a time.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::auth::models::{UpdateProfileRequest, User};
use crate::auth::store::{NewUser, StoreError, UserStore};

/// User store backed by an in-process map
#[derive(Debug, Default)]
pub struct InMemoryUserStore {
    users: RwLock<HashMap<Uuid, User>>,
    /// Lowercased email -> user id
    email_index: RwLock<HashMap<String, Uuid>>,
}

impl InMemoryUserStore {
    /// Create a new empty store
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let user_id = {
            let email_index = self.email_index.read().await;
            email_index.get(&email.to_lowercase()).copied()
        };

        match user_id {
            Some(id) => {
                let users = self.users.read().await;
                Ok(users.get(&id).cloned())
            }
            None => Ok(None),
        }
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        let users = self.users.read().await;
        Ok(users.get(&id).cloned())
    }

    async fn create(&self, new_user: NewUser) -> Result<User, StoreError> {
        let mut users = self.users.write().await;
        let mut email_index = self.email_index.write().await;

        let email_key = new_user.email.to_lowercase();
        if email_index.contains_key(&email_key) {
            return Err(StoreError::DuplicateEmail);
        }

        let user = User {
            id: Uuid::new_v4(),
            email: new_user.email,
            username: new_user.username,
            password_hash: new_user.password_hash,
            full_name: new_user.full_name,
            is_active: true,
            created_at: Utc::now(),
            phone: None,
            address_line1: None,
            address_line2: None,
            city: None,
            state: None,
            postal_code: None,
            country: None,
        };

        email_index.insert(email_key, user.id);
        users.insert(user.id, user.clone());

        Ok(user)
    }

    async fn update_password(&self, id: Uuid, password_hash: &str) -> Result<bool, StoreError> {
        let mut users = self.users.write().await;

        match users.get_mut(&id) {
            Some(user) => {
                user.password_hash = password_hash.to_string();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn update_profile(
        &self,
        id: Uuid,
        changes: UpdateProfileRequest,
    ) -> Result<Option<User>, StoreError> {
        let mut users = self.users.write().await;

        match users.get_mut(&id) {
            Some(user) => {
                if let Some(full_name) = changes.full_name {
                    user.full_name = Some(full_name);
                }
                if let Some(phone) = changes.phone {
                    user.phone = Some(phone);
                }
                if let Some(address_line1) = changes.address_line1 {
                    user.address_line1 = Some(address_line1);
                }
                if let Some(address_line2) = changes.address_line2 {
                    user.address_line2 = Some(address_line2);
                }
                if let Some(city) = changes.city {
                    user.city = Some(city);
                }
                if let Some(state) = changes.state {
                    user.state = Some(state);
                }
                if let Some(postal_code) = changes.postal_code {
                    user.postal_code = Some(postal_code);
                }
                if let Some(country) = changes.country {
                    user.country = Some(country);
                }
                Ok(Some(user.clone()))
            }
            None => Ok(None),
        }
    }

    async fn set_active(&self, id: Uuid, active: bool) -> Result<bool, StoreError> {
        let mut users = self.users.write().await;

        match users.get_mut(&id) {
            Some(user) => {
                user.is_active = active;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
