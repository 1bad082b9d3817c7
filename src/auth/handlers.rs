// HTTP handlers for authentication endpoints

use axum::{extract::State, http::StatusCode, Json};

use crate::auth::{
    error::AuthError,
    middleware::AuthenticatedUser,
    models::{
        ChangePasswordRequest, LoginRequest, MessageResponse, RefreshRequest, RegisterRequest,
        TokenPair, UpdateProfileRequest, UserResponse,
    },
};
use crate::AppState;

/// Register a new user
/// POST /api/v1/auth/register
#[utoipa::path(
    post,
    path = "/api/v1/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User registered successfully", body = UserResponse),
        (status = 400, description = "Invalid input data"),
        (status = 409, description = "Email already registered")
    ),
    tag = "auth"
)]
pub async fn register_handler(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<UserResponse>), AuthError> {
    tracing::debug!("Registering new user: {}", request.email);

    let user = state.auth.register(request).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// Login a user and return access and refresh tokens
/// POST /api/v1/auth/login
#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = TokenPair),
        (status = 401, description = "Incorrect email or password"),
        (status = 403, description = "Account is deactivated")
    ),
    tag = "auth"
)]
pub async fn login_handler(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<TokenPair>, AuthError> {
    let pair = state.auth.login(request).await?;
    Ok(Json(pair))
}

/// Exchange a refresh token for a new token pair
/// POST /api/v1/auth/refresh
#[utoipa::path(
    post,
    path = "/api/v1/auth/refresh",
    request_body = RefreshRequest,
    responses(
        (status = 200, description = "Tokens refreshed", body = TokenPair),
        (status = 401, description = "Invalid token")
    ),
    tag = "auth"
)]
pub async fn refresh_handler(
    State(state): State<AppState>,
    Json(request): Json<RefreshRequest>,
) -> Result<Json<TokenPair>, AuthError> {
    let pair = state.auth.refresh(&request.refresh_token).await?;
    Ok(Json(pair))
}

/// Get current user information (protected endpoint)
/// GET /api/v1/auth/me
#[utoipa::path(
    get,
    path = "/api/v1/auth/me",
    responses(
        (status = 200, description = "Current user profile", body = UserResponse),
        (status = 401, description = "Missing or invalid token"),
        (status = 404, description = "User not found")
    ),
    tag = "auth"
)]
pub async fn me_handler(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<Json<UserResponse>, AuthError> {
    let profile = state.auth.current_user(user.user_id).await?;
    Ok(Json(profile))
}

/// Change the current user's password (protected endpoint)
/// POST /api/v1/auth/change-password
#[utoipa::path(
    post,
    path = "/api/v1/auth/change-password",
    request_body = ChangePasswordRequest,
    responses(
        (status = 200, description = "Password changed", body = MessageResponse),
        (status = 401, description = "Missing or invalid token, or incorrect password"),
        (status = 404, description = "User not found")
    ),
    tag = "auth"
)]
pub async fn change_password_handler(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(request): Json<ChangePasswordRequest>,
) -> Result<Json<MessageResponse>, AuthError> {
    tracing::debug!("Password change requested by {}", user.email);

    state.auth.change_password(user.user_id, request).await?;

    Ok(Json(MessageResponse {
        message: "Password changed successfully".to_string(),
    }))
}

/// Update the current user's profile (protected endpoint)
/// PUT /api/v1/auth/profile
#[utoipa::path(
    put,
    path = "/api/v1/auth/profile",
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Profile updated", body = UserResponse),
        (status = 401, description = "Missing or invalid token"),
        (status = 404, description = "User not found")
    ),
    tag = "auth"
)]
pub async fn update_profile_handler(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(request): Json<UpdateProfileRequest>,
) -> Result<Json<UserResponse>, AuthError> {
    let profile = state.auth.update_profile(user.user_id, request).await?;
    Ok(Json(profile))
}

/// Logout (protected endpoint)
/// POST /api/v1/auth/logout
///
/// Tokens are stateless, so there is nothing to invalidate server-side;
/// the client discards its tokens.
#[utoipa::path(
    post,
    path = "/api/v1/auth/logout",
    responses(
        (status = 200, description = "Logged out", body = MessageResponse),
        (status = 401, description = "Missing or invalid token")
    ),
    tag = "auth"
)]
pub async fn logout_handler(_user: AuthenticatedUser) -> Json<MessageResponse> {
    Json(MessageResponse {
        message: "Logged out successfully".to_string(),
    })
}
