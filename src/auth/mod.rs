// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Authentication Module
//!
//! Password login and bearer-token authentication for the planner API.
//!
//! ## Auth Flow
//!
//! 1. A user registers with username, email and password (`POST /register`).
//!    The password is stored as an Argon2id hash.
//! 2. The user logs in with a form-encoded username/password
//!    (`POST /token`) and receives an HS256 JWT.
//! 3. Every other non-health endpoint reads `Authorization: Bearer <JWT>`:
//!    - verifies signature and expiry (60 second leeway)
//!    - extracts `sub` → canonical numeric `user_id`
//!    - checks the user still exists

pub mod claims;
pub mod error;
pub mod extractor;
pub mod password;
pub mod service;

pub use claims::{AuthenticatedUser, TokenClaims};
pub use error::AuthError;
pub use extractor::Auth;
pub use service::{AuthService, IssuedToken, JwtAuthService};
