// Authentication module
// Provides JWT-based authentication with user registration, login, token
// refresh, and profile management over a pluggable user store

pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod password;
pub mod service;
pub mod store;
pub mod token;

// Re-export commonly used types
pub use error::AuthError;
pub use handlers::{
    change_password_handler, login_handler, logout_handler, me_handler, refresh_handler,
    register_handler, update_profile_handler,
};
pub use middleware::AuthenticatedUser;
pub use service::AuthService;
pub use store::{InMemoryUserStore, PostgresUserStore, UserStore};
pub use token::{TokenKind, TokenService};
