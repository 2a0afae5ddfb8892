// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Ownership for stored resources.
//!
//! Contacts and events carry their owner directly. Recipients and gifts are
//! owned transitively through their event, which the access layer resolves.

use crate::models::UserId;

/// Trait for resources that have a single owning user.
pub trait OwnedResource {
    /// Get the owner's user ID.
    fn owner_user_id(&self) -> UserId;

    /// Whether `user_id` is the owner.
    fn is_owned_by(&self, user_id: UserId) -> bool {
        self.owner_user_id() == user_id
    }
}
