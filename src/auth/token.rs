// JWT token generation and validation service

use crate::config::AuthConfig;
use chrono::Utc;
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Discriminator embedded in every token, preventing a refresh token from
/// being accepted where an access token is expected and vice versa.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Access => write!(f, "access"),
            TokenKind::Refresh => write!(f, "refresh"),
        }
    }
}

/// JWT claims structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid, // user id
    pub email: String,
    pub iat: i64, // issued at timestamp
    pub exp: i64, // expiration timestamp
    pub kind: TokenKind,
}

/// Why a token was rejected (or could not be issued).
///
/// The verification variants are deliberately distinct; callers that face
/// clients collapse them into a single "invalid token" error so the reason
/// is never observable from outside.
#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("token is not a well-formed JWT")]
    Malformed,

    #[error("token signature verification failed")]
    InvalidSignature,

    #[error("expected {expected} token, got {actual}")]
    WrongKind {
        expected: TokenKind,
        actual: TokenKind,
    },

    #[error("token has expired")]
    Expired,

    #[error("failed to sign token: {0}")]
    Creation(String),
}

/// Token service for JWT operations
///
/// Stateless with respect to any store: a token's validity is decided
/// entirely by its signature, kind tag, and expiry.
#[derive(Clone)]
pub struct TokenService {
    secret: String,
    access_token_ttl: i64,  // in seconds
    refresh_token_ttl: i64, // in seconds
}

impl TokenService {
    /// Create a new TokenService from the signing configuration.
    /// The same secret signs both token kinds.
    pub fn new(config: AuthConfig) -> Self {
        Self {
            secret: config.jwt_secret,
            access_token_ttl: config.access_token_ttl,
            refresh_token_ttl: config.refresh_token_ttl,
        }
    }

    fn ttl_for(&self, kind: TokenKind) -> i64 {
        match kind {
            TokenKind::Access => self.access_token_ttl,
            TokenKind::Refresh => self.refresh_token_ttl,
        }
    }

    /// Issue a signed token of the given kind for a user.
    pub fn issue(&self, user_id: Uuid, email: &str, kind: TokenKind) -> Result<String, TokenError> {
        let now = Utc::now().timestamp();

        let claims = Claims {
            sub: user_id,
            email: email.to_string(),
            iat: now,
            exp: now + self.ttl_for(kind),
            kind,
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(|e| TokenError::Creation(e.to_string()))
    }

    /// Issue an access and refresh token pair carrying the same identity.
    pub fn issue_pair(&self, user_id: Uuid, email: &str) -> Result<(String, String), TokenError> {
        let access_token = self.issue(user_id, email, TokenKind::Access)?;
        let refresh_token = self.issue(user_id, email, TokenKind::Refresh)?;
        Ok((access_token, refresh_token))
    }

    /// Verify a token string and return its claims.
    ///
    /// Checks run in a fixed order: envelope structure, signature, kind tag,
    /// expiry. Each failure maps to its own `TokenError` variant.
    pub fn verify(&self, token: &str, expected: TokenKind) -> Result<Claims, TokenError> {
        // The kind tag must be checked before expiry, so library-side exp
        // validation (and its default 60-second leeway) stays off; expiry is
        // enforced by hand below, with no grace window.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;

        let claims = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &validation,
        )
        .map(|data| data.claims)
        .map_err(|e| match e.kind() {
            ErrorKind::InvalidSignature => TokenError::InvalidSignature,
            _ => TokenError::Malformed,
        })?;

        if claims.kind != expected {
            return Err(TokenError::WrongKind {
                expected,
                actual: claims.kind,
            });
        }

        if Utc::now().timestamp() >= claims.exp {
            return Err(TokenError::Expired);
        }

        Ok(claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const TEST_SECRET: &str = "test_secret_key_for_testing_purposes";

    // Helper to create a test token service
    fn test_token_service() -> TokenService {
        TokenService::new(AuthConfig {
            jwt_secret: TEST_SECRET.to_string(),
            access_token_ttl: 1800,
            refresh_token_ttl: 604800,
        })
    }

    // Helper to encode claims directly, bypassing issue()
    fn raw_encode(claims: &Claims, secret: &str) -> String {
        encode(
            &Header::default(),
            claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    #[test]
    fn test_access_token_round_trip() {
        let service = test_token_service();
        let user_id = Uuid::new_v4();

        let token = service
            .issue(user_id, "test@example.com", TokenKind::Access)
            .unwrap();
        let claims = service.verify(&token, TokenKind::Access).unwrap();

        assert_eq!(claims.sub, user_id);
        assert_eq!(claims.email, "test@example.com");
        assert_eq!(claims.kind, TokenKind::Access);
    }

    #[test]
    fn test_refresh_token_round_trip() {
        let service = test_token_service();
        let user_id = Uuid::new_v4();

        let token = service
            .issue(user_id, "test@example.com", TokenKind::Refresh)
            .unwrap();
        let claims = service.verify(&token, TokenKind::Refresh).unwrap();

        assert_eq!(claims.sub, user_id);
        assert_eq!(claims.email, "test@example.com");
        assert_eq!(claims.kind, TokenKind::Refresh);
    }

    #[test]
    fn test_access_token_expiration_is_30_minutes() {
        let service = test_token_service();
        let token = service
            .issue(Uuid::new_v4(), "test@example.com", TokenKind::Access)
            .unwrap();
        let claims = service.verify(&token, TokenKind::Access).unwrap();

        assert_eq!(claims.exp - claims.iat, 1800);
    }

    #[test]
    fn test_refresh_token_expiration_is_7_days() {
        let service = test_token_service();
        let token = service
            .issue(Uuid::new_v4(), "test@example.com", TokenKind::Refresh)
            .unwrap();
        let claims = service.verify(&token, TokenKind::Refresh).unwrap();

        assert_eq!(claims.exp - claims.iat, 604800);
    }

    #[test]
    fn test_access_token_rejected_as_refresh() {
        let service = test_token_service();
        let token = service
            .issue(Uuid::new_v4(), "test@example.com", TokenKind::Access)
            .unwrap();

        let result = service.verify(&token, TokenKind::Refresh);
        assert!(matches!(
            result,
            Err(TokenError::WrongKind {
                expected: TokenKind::Refresh,
                actual: TokenKind::Access,
            })
        ));
    }

    #[test]
    fn test_refresh_token_rejected_as_access() {
        let service = test_token_service();
        let token = service
            .issue(Uuid::new_v4(), "test@example.com", TokenKind::Refresh)
            .unwrap();

        let result = service.verify(&token, TokenKind::Access);
        assert!(matches!(result, Err(TokenError::WrongKind { .. })));
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let service = test_token_service();
        let now = Utc::now().timestamp();

        let claims = Claims {
            sub: Uuid::new_v4(),
            email: "test@example.com".to_string(),
            iat: now - 1000,
            exp: now - 500, // expired 500 seconds ago
            kind: TokenKind::Access,
        };

        let token = raw_encode(&claims, TEST_SECRET);
        let result = service.verify(&token, TokenKind::Access);
        assert!(matches!(result, Err(TokenError::Expired)));
    }

    #[test]
    fn test_token_at_exact_expiry_is_rejected() {
        let service = test_token_service();
        let now = Utc::now().timestamp();

        let claims = Claims {
            sub: Uuid::new_v4(),
            email: "test@example.com".to_string(),
            iat: now - 1800,
            exp: now, // current time == expiry: no grace window
            kind: TokenKind::Access,
        };

        let token = raw_encode(&claims, TEST_SECRET);
        let result = service.verify(&token, TokenKind::Access);
        assert!(matches!(result, Err(TokenError::Expired)));
    }

    #[test]
    fn test_token_just_before_expiry_is_accepted() {
        let service = test_token_service();
        let now = Utc::now().timestamp();

        let claims = Claims {
            sub: Uuid::new_v4(),
            email: "test@example.com".to_string(),
            iat: now - 10,
            exp: now + 5,
            kind: TokenKind::Access,
        };

        let token = raw_encode(&claims, TEST_SECRET);
        assert!(service.verify(&token, TokenKind::Access).is_ok());
    }

    #[test]
    fn test_kind_is_checked_before_expiry() {
        let service = test_token_service();
        let now = Utc::now().timestamp();

        // An expired access token presented as a refresh token fails on the
        // kind tag, not on expiry.
        let claims = Claims {
            sub: Uuid::new_v4(),
            email: "test@example.com".to_string(),
            iat: now - 1000,
            exp: now - 500,
            kind: TokenKind::Access,
        };

        let token = raw_encode(&claims, TEST_SECRET);
        let result = service.verify(&token, TokenKind::Refresh);
        assert!(matches!(result, Err(TokenError::WrongKind { .. })));
    }

    #[test]
    fn test_tampered_payload_is_rejected() {
        let service = test_token_service();
        let token = service
            .issue(Uuid::new_v4(), "test@example.com", TokenKind::Access)
            .unwrap();

        // Flip one character of the payload segment, staying inside the
        // base64url alphabet so only the signature check can catch it.
        let dot = token.find('.').unwrap();
        let idx = dot + 5;
        let original = token.as_bytes()[idx];
        let replacement = if original == b'A' { b'B' } else { b'A' };
        let mut bytes = token.into_bytes();
        bytes[idx] = replacement;
        let tampered = String::from_utf8(bytes).unwrap();

        let result = service.verify(&tampered, TokenKind::Access);
        assert!(matches!(result, Err(TokenError::InvalidSignature)));
    }

    #[test]
    fn test_token_signed_with_other_secret_is_rejected() {
        let service = test_token_service();
        let other = TokenService::new(AuthConfig {
            jwt_secret: "a_completely_different_secret".to_string(),
            access_token_ttl: 1800,
            refresh_token_ttl: 604800,
        });

        let token = other
            .issue(Uuid::new_v4(), "test@example.com", TokenKind::Access)
            .unwrap();

        let result = service.verify(&token, TokenKind::Access);
        assert!(matches!(result, Err(TokenError::InvalidSignature)));
    }

    #[test]
    fn test_malformed_tokens_are_rejected() {
        let service = test_token_service();

        for garbage in ["", "not.a.token", "invalid_token_format", "a.b"] {
            let result = service.verify(garbage, TokenKind::Access);
            assert!(
                matches!(result, Err(TokenError::Malformed)),
                "{:?} should be malformed",
                garbage
            );
        }
    }

    #[test]
    fn test_issue_pair_tokens_are_distinct_and_valid() {
        let service = test_token_service();
        let user_id = Uuid::new_v4();

        let (access_token, refresh_token) =
            service.issue_pair(user_id, "test@example.com").unwrap();

        assert_ne!(access_token, refresh_token);
        assert!(service.verify(&access_token, TokenKind::Access).is_ok());
        assert!(service.verify(&refresh_token, TokenKind::Refresh).is_ok());
    }

    // Property-based tests using proptest

    proptest! {
        #[test]
        fn prop_round_trip_preserves_claims(
            raw_id in any::<u128>(),
            email in "[a-z]{3,10}@[a-z]{3,10}\\.(com|org|net)"
        ) {
            let service = test_token_service();
            let user_id = Uuid::from_u128(raw_id);

            let token = service.issue(user_id, &email, TokenKind::Access)?;
            let claims = service.verify(&token, TokenKind::Access)?;

            prop_assert_eq!(claims.sub, user_id);
            prop_assert_eq!(claims.email, email);
            prop_assert_eq!(claims.kind, TokenKind::Access);
        }

        #[test]
        fn prop_kind_tag_is_never_interchangeable(
            raw_id in any::<u128>(),
            email in "[a-z]{3,10}@[a-z]{3,10}\\.(com|org|net)"
        ) {
            let service = test_token_service();
            let user_id = Uuid::from_u128(raw_id);

            let access = service.issue(user_id, &email, TokenKind::Access)?;
            let refresh = service.issue(user_id, &email, TokenKind::Refresh)?;

            prop_assert!(
                matches!(
                    service.verify(&access, TokenKind::Refresh),
                    Err(TokenError::WrongKind { .. })
                ),
                "access token verified as refresh kind"
            );
            prop_assert!(
                matches!(
                    service.verify(&refresh, TokenKind::Access),
                    Err(TokenError::WrongKind { .. })
                ),
                "refresh token verified as access kind"
            );
        }

        #[test]
        fn prop_random_strings_are_rejected(
            garbage in "[a-zA-Z0-9]{10,50}"
        ) {
            let service = test_token_service();
            prop_assert!(service.verify(&garbage, TokenKind::Access).is_err());
        }
    }
}
