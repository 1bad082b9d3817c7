// Password hashing and verification service

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

use crate::auth::error::AuthError;

/// Password service for hashing and verification
pub struct PasswordService;

impl PasswordService {
    /// Hash a password using Argon2id with a random salt
    pub fn hash_password(password: &str) -> Result<String, AuthError> {
        let salt = SaltString::generate(&mut OsRng);

        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| AuthError::PasswordHash(e.to_string()))
    }

    /// Verify a password against a stored hash.
    /// An unparseable hash counts as a failed verification, not an error.
    pub fn verify_password(password: &str, hash: &str) -> bool {
        let parsed_hash = match PasswordHash::new(hash) {
            Ok(h) => h,
            Err(_) => return false,
        };

        Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let hash = PasswordService::hash_password("my_secure_password").unwrap();

        assert!(PasswordService::verify_password("my_secure_password", &hash));
        assert!(!PasswordService::verify_password("wrong_password", &hash));
    }

    #[test]
    fn test_hashes_are_salted() {
        let hash1 = PasswordService::hash_password("my_secure_password").unwrap();
        let hash2 = PasswordService::hash_password("my_secure_password").unwrap();

        // Different salts, different hashes, both verifiable
        assert_ne!(hash1, hash2);
        assert!(PasswordService::verify_password("my_secure_password", &hash1));
        assert!(PasswordService::verify_password("my_secure_password", &hash2));
    }

    #[test]
    fn test_verify_against_invalid_hash() {
        assert!(!PasswordService::verify_password("password", "not_a_hash"));
        assert!(!PasswordService::verify_password("password", ""));
    }
}
