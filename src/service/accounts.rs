// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Account registration, login and profiles.

use super::{require_non_blank, ServiceError, ServiceResult};
use crate::auth::{AuthError, AuthService};
use crate::models::{RegisterRequest, TokenResponse, UserId, UserProfile};
use crate::storage::{AuditEvent, AuditEventType, Database, NewUser, UserRepository};

pub struct AccountService<'a> {
    db: &'a Database,
    auth: &'a dyn AuthService,
}

impl<'a> AccountService<'a> {
    pub fn new(db: &'a Database, auth: &'a dyn AuthService) -> Self {
        Self { db, auth }
    }

    /// Register a new account.
    ///
    /// Usernames and emails are unique after NFKC normalisation and case
    /// folding.
    pub fn register(&self, request: RegisterRequest) -> ServiceResult<UserProfile> {
        require_non_blank("username", &request.username)?;
        require_non_blank("email", &request.email)?;
        require_non_blank("password", &request.password)?;

        let password_hash = self.auth.hash_password(&request.password)?;
        let user = UserRepository::new(self.db).create(NewUser {
            username: request.username.trim().to_string(),
            email: request.email.trim().to_string(),
            full_name: request.full_name.filter(|name| !name.trim().is_empty()),
            password_hash,
        })?;

        tracing::info!(user_id = user.id, username = %user.username, "User registered");
        crate::audit_log!(self.db, AuditEventType::UserRegistered, user.id, "user", user.id);

        Ok(user.into())
    }

    /// Exchange a username and password for an access token.
    pub fn login(&self, username: &str, password: &str) -> ServiceResult<TokenResponse> {
        let user = match self.auth.authenticate_user(username, password) {
            Ok(user) => user,
            Err(AuthError::InvalidCredentials) => {
                tracing::info!(username = %username, "Login failed");
                crate::audit_log!(
                    self.db,
                    AuditEvent::new(AuditEventType::AuthFailure)
                        .with_details(serde_json::json!({ "username": username }))
                        .failed("Incorrect username or password")
                );
                return Err(AuthError::InvalidCredentials.into());
            }
            Err(other) => return Err(other.into()),
        };

        let token = self.auth.issue_token(&user)?;
        crate::audit_log!(self.db, AuditEventType::AuthSuccess, user.id);

        Ok(TokenResponse {
            access_token: token.access_token,
            token_type: "bearer".to_string(),
            expires_in: token.expires_in,
        })
    }

    /// Public profile of a user.
    pub fn profile(&self, user_id: UserId) -> ServiceResult<UserProfile> {
        UserRepository::new(self.db)
            .find(user_id)?
            .map(UserProfile::from)
            .ok_or_else(|| ServiceError::NotFound("User not found".to_string()))
    }
}
