// Authentication service - business logic layer

use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use crate::auth::{
    error::AuthError,
    models::{
        ChangePasswordRequest, LoginRequest, RegisterRequest, TokenPair, UpdateProfileRequest,
        UserResponse,
    },
    password::PasswordService,
    store::{NewUser, UserStore},
    token::{TokenKind, TokenService},
};

/// Authentication service coordinating the token codec, password hashing,
/// and the user store
pub struct AuthService {
    store: Arc<dyn UserStore>,
    tokens: TokenService,
}

impl AuthService {
    /// Create a new AuthService
    pub fn new(store: Arc<dyn UserStore>, tokens: TokenService) -> Self {
        Self { store, tokens }
    }

    /// Register a new user
    ///
    /// This method:
    /// 1. Validates the request
    /// 2. Rejects emails that are already registered
    /// 3. Hashes the password and creates the record
    ///
    /// The existence check is advisory; the store's uniqueness guarantee is
    /// what makes concurrent duplicate registrations safe.
    pub async fn register(&self, request: RegisterRequest) -> Result<UserResponse, AuthError> {
        request
            .validate()
            .map_err(|e| AuthError::ValidationError(format!("Validation failed: {}", e)))?;

        if self.store.find_by_email(&request.email).await?.is_some() {
            return Err(AuthError::DuplicateEmail);
        }

        let password_hash = PasswordService::hash_password(&request.password)?;

        let user = self
            .store
            .create(NewUser {
                email: request.email,
                username: request.username,
                password_hash,
                full_name: request.full_name,
            })
            .await?;

        tracing::info!("Registered user {}", user.id);
        Ok(user.into())
    }

    /// Login with email and password, returning an access/refresh token pair
    ///
    /// Unknown email and wrong password produce the same error so accounts
    /// cannot be enumerated.
    pub async fn login(&self, request: LoginRequest) -> Result<TokenPair, AuthError> {
        request
            .validate()
            .map_err(|e| AuthError::ValidationError(format!("Validation failed: {}", e)))?;

        let user = match self.store.find_by_email(&request.email).await? {
            Some(user) => user,
            None => return Err(AuthError::InvalidCredentials),
        };

        if !PasswordService::verify_password(&request.password, &user.password_hash) {
            return Err(AuthError::InvalidCredentials);
        }

        if !user.is_active {
            return Err(AuthError::AccountDeactivated);
        }

        let (access_token, refresh_token) = self
            .tokens
            .issue_pair(user.id, &user.email)
            .map_err(|e| AuthError::TokenCreation(e.to_string()))?;

        tracing::debug!("Issued token pair for user {}", user.id);
        Ok(TokenPair::new(access_token, refresh_token))
    }

    /// Exchange a refresh token for a fresh access/refresh pair
    ///
    /// Every verification failure collapses into `InvalidToken`; the
    /// distinct reason goes to the log only. The user is re-fetched so that
    /// accounts deleted or deactivated after the token was issued are
    /// rejected as well.
    pub async fn refresh(&self, refresh_token: &str) -> Result<TokenPair, AuthError> {
        let claims = self
            .tokens
            .verify(refresh_token, TokenKind::Refresh)
            .map_err(|e| {
                tracing::debug!("Refresh token rejected: {}", e);
                AuthError::InvalidToken
            })?;

        let user = match self.store.find_by_id(claims.sub).await? {
            Some(user) if user.is_active => user,
            _ => return Err(AuthError::InvalidToken),
        };

        let (access_token, refresh_token) = self
            .tokens
            .issue_pair(user.id, &user.email)
            .map_err(|e| AuthError::TokenCreation(e.to_string()))?;

        tracing::debug!("Rotated token pair for user {}", user.id);
        Ok(TokenPair::new(access_token, refresh_token))
    }

    /// Get the current user's profile
    pub async fn current_user(&self, user_id: Uuid) -> Result<UserResponse, AuthError> {
        let user = self
            .store
            .find_by_id(user_id)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        Ok(user.into())
    }

    /// Change the current user's password
    ///
    /// This method:
    /// 1. Validates the request
    /// 2. Re-fetches the user
    /// 3. Checks the old password
    /// 4. Hashes and persists the new one
    pub async fn change_password(
        &self,
        user_id: Uuid,
        request: ChangePasswordRequest,
    ) -> Result<(), AuthError> {
        request
            .validate()
            .map_err(|e| AuthError::ValidationError(format!("Validation failed: {}", e)))?;

        let user = self
            .store
            .find_by_id(user_id)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        if !PasswordService::verify_password(&request.old_password, &user.password_hash) {
            return Err(AuthError::InvalidCredentials);
        }

        let new_hash = PasswordService::hash_password(&request.new_password)?;

        if !self.store.update_password(user_id, &new_hash).await? {
            return Err(AuthError::UserNotFound);
        }

        tracing::info!("Password changed for user {}", user_id);
        Ok(())
    }

    /// Apply a partial profile update and return the updated user
    pub async fn update_profile(
        &self,
        user_id: Uuid,
        changes: UpdateProfileRequest,
    ) -> Result<UserResponse, AuthError> {
        let user = self
            .store
            .update_profile(user_id, changes)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        Ok(user.into())
    }
}
