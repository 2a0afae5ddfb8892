// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authentication service.
//!
//! [`AuthService`] is the seam between HTTP handlers and credential
//! handling. [`JwtAuthService`] implements it with Argon2id password hashes
//! and HS256 access tokens whose `sub` claim is the numeric user id.

use std::sync::Arc;

use chrono::Utc;
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};

use super::{password, AuthError, AuthenticatedUser, TokenClaims};
use crate::storage::{Database, StoredUser, UserRepository};

/// Clock skew tolerance (60 seconds).
const CLOCK_SKEW_LEEWAY: u64 = 60;

/// A freshly issued access token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedToken {
    pub access_token: String,
    /// Lifetime in seconds.
    pub expires_in: u64,
}

/// Credential handling used by the API layer.
pub trait AuthService: Send + Sync {
    /// Hash a plaintext password for storage.
    fn hash_password(&self, password: &str) -> Result<String, AuthError>;

    /// Check a username/password pair and return the matching user.
    fn authenticate_user(&self, username: &str, password: &str) -> Result<StoredUser, AuthError>;

    /// Issue an access token for a user.
    fn issue_token(&self, user: &StoredUser) -> Result<IssuedToken, AuthError>;

    /// Resolve a bearer token to the user it was issued for.
    fn current_user(&self, token: &str) -> Result<AuthenticatedUser, AuthError>;
}

/// HS256 JWT + Argon2id implementation of [`AuthService`].
pub struct JwtAuthService {
    db: Arc<Database>,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    token_ttl_seconds: u64,
}

impl JwtAuthService {
    pub fn new(db: Arc<Database>, secret: &[u8], token_ttl_seconds: u64) -> Self {
        Self {
            db,
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            token_ttl_seconds,
        }
    }

    fn validation() -> Validation {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = CLOCK_SKEW_LEEWAY;
        validation.validate_aud = false;
        validation
    }

    fn sign(&self, claims: &TokenClaims) -> Result<String, AuthError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key)
            .map_err(|e| AuthError::InternalError(format!("Failed to sign token: {e}")))
    }
}

impl AuthService for JwtAuthService {
    fn hash_password(&self, password: &str) -> Result<String, AuthError> {
        password::hash_password(password)
    }

    fn authenticate_user(&self, username: &str, password: &str) -> Result<StoredUser, AuthError> {
        let user = UserRepository::new(&self.db)
            .find_by_username(username)
            .map_err(|e| AuthError::InternalError(e.to_string()))?
            .ok_or(AuthError::InvalidCredentials)?;

        if !password::verify_password(password, &user.password_hash)? {
            return Err(AuthError::InvalidCredentials);
        }
        Ok(user)
    }

    fn issue_token(&self, user: &StoredUser) -> Result<IssuedToken, AuthError> {
        let now = Utc::now().timestamp();
        let exp = i64::try_from(self.token_ttl_seconds)
            .ok()
            .and_then(|ttl| now.checked_add(ttl))
            .ok_or_else(|| AuthError::InternalError("Token lifetime out of range".to_string()))?;
        let claims = TokenClaims {
            sub: user.id.to_string(),
            username: user.username.clone(),
            iat: now,
            exp,
        };

        Ok(IssuedToken {
            access_token: self.sign(&claims)?,
            expires_in: self.token_ttl_seconds,
        })
    }

    fn current_user(&self, token: &str) -> Result<AuthenticatedUser, AuthError> {
        let token_data = decode::<TokenClaims>(token, &self.decoding_key, &Self::validation())
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                ErrorKind::InvalidSignature => AuthError::InvalidSignature,
                _ => AuthError::MalformedToken,
            })?;

        let user = AuthenticatedUser::from_claims(token_data.claims)
            .ok_or(AuthError::MalformedToken)?;

        // Tokens for accounts that no longer exist are rejected
        let exists = UserRepository::new(&self.db)
            .find(user.user_id)
            .map_err(|e| AuthError::InternalError(e.to_string()))?
            .is_some();
        if !exists {
            return Err(AuthError::UnknownUser);
        }

        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::NewUser;

    const SECRET: &[u8] = b"test-secret-that-is-long-enough-for-hs256";

    fn setup() -> (JwtAuthService, StoredUser) {
        let db = Arc::new(Database::in_memory().unwrap());
        let service = JwtAuthService::new(db.clone(), SECRET, 1800);
        let user = UserRepository::new(&db)
            .create(NewUser {
                username: "alice".into(),
                email: "alice@example.com".into(),
                full_name: None,
                password_hash: service.hash_password("wonderland").unwrap(),
            })
            .unwrap();
        (service, user)
    }

    #[test]
    fn login_and_resolve_token() {
        let (service, user) = setup();

        let authenticated = service.authenticate_user("Alice", "wonderland").unwrap();
        assert_eq!(authenticated.id, user.id);

        let token = service.issue_token(&authenticated).unwrap();
        assert_eq!(token.expires_in, 1800);

        let current = service.current_user(&token.access_token).unwrap();
        assert_eq!(current.user_id, user.id);
        assert_eq!(current.username, "alice");
    }

    #[test]
    fn wrong_password_or_user_is_invalid_credentials() {
        let (service, _) = setup();

        assert!(matches!(
            service.authenticate_user("alice", "nope"),
            Err(AuthError::InvalidCredentials)
        ));
        assert!(matches!(
            service.authenticate_user("mallory", "wonderland"),
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[test]
    fn expired_token_is_rejected() {
        let (service, user) = setup();
        let past = Utc::now().timestamp() - 3600;
        let token = service
            .sign(&TokenClaims {
                sub: user.id.to_string(),
                username: user.username.clone(),
                iat: past - 1800,
                exp: past,
            })
            .unwrap();

        assert!(matches!(service.current_user(&token), Err(AuthError::TokenExpired)));
    }

    #[test]
    fn token_from_other_secret_is_rejected() {
        let (service, user) = setup();
        let other = JwtAuthService::new(
            Arc::new(Database::in_memory().unwrap()),
            b"a-completely-different-secret-value",
            1800,
        );
        let token = other.issue_token(&user).unwrap();

        assert!(matches!(
            service.current_user(&token.access_token),
            Err(AuthError::InvalidSignature)
        ));
        assert!(matches!(
            service.current_user("not-a-jwt"),
            Err(AuthError::MalformedToken)
        ));
    }

    #[test]
    fn oversized_lifetime_is_an_error() {
        let (_, user) = setup();
        let db = Arc::new(Database::in_memory().unwrap());
        let service = JwtAuthService::new(db, SECRET, u64::MAX);

        assert!(matches!(
            service.issue_token(&user),
            Err(AuthError::InternalError(_))
        ));
    }

    #[test]
    fn token_for_unknown_user_is_rejected() {
        let (service, user) = setup();
        let ghost = StoredUser {
            id: user.id + 100,
            ..user
        };
        let token = service.issue_token(&ghost).unwrap();

        assert!(matches!(
            service.current_user(&token.access_token),
            Err(AuthError::UnknownUser)
        ));
    }
}
