// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Repository layer providing typed access to the planner database.
//!
//! Each repository provides CRUD operations for a specific entity type and
//! runs every logical operation in a single redb transaction.

pub mod contacts;
pub mod events;
pub mod friends;
pub mod gifts;
pub mod recipients;
pub mod shares;
pub mod users;

pub use contacts::{ContactFields, ContactRepository, StoredContact};
pub use events::{EventCascade, EventFields, EventRepository, StoredEvent};
pub use friends::{FriendRepository, FriendStatus, PairInsert, StoredFriendRequest};
pub use gifts::{GiftChanges, GiftFields, GiftRepository, StoredGift};
pub use recipients::{NewRecipient, RecipientChanges, RecipientRepository, StoredRecipient};
pub use shares::{ShareKind, ShareRepository, StoredGrant};
pub use users::{normalize_identifier, NewUser, StoredUser, UserRepository};
