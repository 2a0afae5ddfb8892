// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Grant permission levels and the actions they cover.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Permission level carried by a contact or event share.
///
/// Levels are cumulative: `write` includes everything `read` allows and
/// `admin` includes everything `write` allows.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum Permission {
    Read,
    Write,
    Admin,
}

impl Permission {
    /// Get the permission as its storage string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Permission::Read => "read",
            Permission::Write => "write",
            Permission::Admin => "admin",
        }
    }

    /// Parse a permission from its storage string.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "read" => Some(Permission::Read),
            "write" => Some(Permission::Write),
            "admin" => Some(Permission::Admin),
            _ => None,
        }
    }

    /// Whether a grantee holding this level may perform `action`.
    ///
    /// Sharing and adding recipients stay with the owner at every level.
    pub fn allows(&self, action: Action) -> bool {
        match action {
            Action::View => true,
            Action::Update | Action::AddGift => *self >= Permission::Write,
            Action::Delete => *self == Permission::Admin,
            Action::AddRecipient | Action::Share => false,
        }
    }
}

impl std::fmt::Display for Permission {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Operation a user attempts on a resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    View,
    Update,
    AddGift,
    AddRecipient,
    Delete,
    /// Create, change, list or revoke grants.
    Share,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::View => "view",
            Action::Update => "update",
            Action::AddGift => "add_gift",
            Action::AddRecipient => "add_recipient",
            Action::Delete => "delete",
            Action::Share => "share",
        }
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
