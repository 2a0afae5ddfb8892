// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Gift Planner - Contact, Event and Gift Planning Service
//!
//! Users keep contacts and events, plan gifts for the recipients of each
//! event, and share contacts or events with accepted friends under
//! read/write/admin grants.
//!
//! ## Modules
//!
//! - `api` - HTTP API handlers (Axum)
//! - `access` - Owner/grant access decisions
//! - `auth` - Password hashing and bearer tokens (JWT)
//! - `service` - Domain operations over the store
//! - `storage` - Embedded redb database and repositories

pub mod access;
pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod service;
pub mod state;
pub mod storage;
