// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Storage Module
//!
//! Persistent storage for the gift planner, backed by a single embedded
//! **redb** database file under `DATA_DIR`.
//!
//! ## Storage Layout
//!
//! ```text
//! $DATA_DIR/
//!   planner.redb    # users, friendships, contacts, events, recipients,
//!                   # gifts, share grants and the audit log
//! ```
//!
//! See [`database`] for the table layout. Repositories in [`repository`]
//! are thin borrowing wrappers over [`Database`] and hold no state.

pub mod audit;
pub mod database;
pub mod ownership;
pub mod repository;

pub use audit::{AuditEvent, AuditEventType, AuditRepository};
pub use database::{Database, StorageError, StorageResult};
pub use ownership::OwnedResource;
pub use repository::{
    ContactFields, ContactRepository, EventCascade, EventFields, EventRepository,
    FriendRepository, FriendStatus, GiftChanges, GiftFields, GiftRepository, NewRecipient,
    NewUser, PairInsert, RecipientChanges, RecipientRepository, ShareKind, ShareRepository,
    StoredContact, StoredEvent, StoredFriendRequest, StoredGift, StoredGrant, StoredRecipient,
    StoredUser, UserRepository,
};

/// File name of the database inside the data directory.
pub const DATABASE_FILE: &str = "planner.redb";
