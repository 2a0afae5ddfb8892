// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! JWT claims and authenticated user representation.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::UserId;

/// Claims carried by access tokens issued by this server.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TokenClaims {
    /// Subject: the numeric user id as a string.
    pub sub: String,
    /// Username at the time the token was issued.
    pub username: String,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration (Unix timestamp)
    pub exp: i64,
}

/// Authenticated user information extracted from a verified token.
///
/// This is the primary type used throughout the application to represent
/// the user making a request.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct AuthenticatedUser {
    /// Canonical user ID (token `sub` claim)
    pub user_id: UserId,

    /// Username from the token
    pub username: String,

    /// Token expiration (Unix timestamp, not serialized)
    #[serde(skip)]
    pub expires_at: i64,
}

impl AuthenticatedUser {
    /// Build from verified claims.
    pub fn from_claims(claims: TokenClaims) -> Option<Self> {
        let user_id = claims.sub.parse().ok()?;
        Some(Self {
            user_id,
            username: claims.username,
            expires_at: claims.exp,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claims(sub: &str) -> TokenClaims {
        TokenClaims {
            sub: sub.to_string(),
            username: "alice".to_string(),
            iat: 1_700_000_000,
            exp: 1_700_001_800,
        }
    }

    #[test]
    fn numeric_subject_becomes_user_id() {
        let user = AuthenticatedUser::from_claims(claims("42")).unwrap();
        assert_eq!(user.user_id, 42);
        assert_eq!(user.username, "alice");
        assert_eq!(user.expires_at, 1_700_001_800);
    }

    #[test]
    fn non_numeric_subject_is_rejected() {
        assert!(AuthenticatedUser::from_claims(claims("alice")).is_none());
        assert!(AuthenticatedUser::from_claims(claims("")).is_none());
    }
}
