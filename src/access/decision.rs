// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Access decisions.
//!
//! [`decide`] is a pure function of the acting user, the resolved owner, the
//! acting user's grant (if any) and the attempted action. Everything that
//! touches storage lives in [`super::AccessControl`].

use super::{Action, Permission};
use crate::models::UserId;

/// Why access was allowed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessBasis {
    Owner,
    Grant(Permission),
}

/// Why access was denied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenyReason {
    /// The resource (or one of its parents) does not exist.
    Missing,
    /// The resource exists but the user neither owns it nor holds a grant.
    Hidden,
    /// The user holds a grant that does not cover the action.
    Insufficient {
        permission: Permission,
        action: Action,
    },
    /// Only the owner may perform the action and the user is a grantee.
    OwnerOnly { action: Action },
}

impl DenyReason {
    /// Whether this denial must look like a missing resource to the caller.
    pub fn is_hidden(&self) -> bool {
        matches!(self, DenyReason::Missing | DenyReason::Hidden)
    }
}

/// Result of an access check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessDecision {
    Allow(AccessBasis),
    Deny(DenyReason),
}

impl AccessDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, AccessDecision::Allow(_))
    }
}

/// Decide whether `user` may perform `action` on a resource owned by
/// `owner`, given the grant `user` holds on the nearest shareable ancestor.
pub fn decide(
    user: UserId,
    owner: UserId,
    grant: Option<Permission>,
    action: Action,
) -> AccessDecision {
    if user == owner {
        return AccessDecision::Allow(AccessBasis::Owner);
    }

    match grant {
        None => AccessDecision::Deny(DenyReason::Hidden),
        Some(permission) if permission.allows(action) => {
            AccessDecision::Allow(AccessBasis::Grant(permission))
        }
        Some(_) if matches!(action, Action::Share | Action::AddRecipient) => {
            AccessDecision::Deny(DenyReason::OwnerOnly { action })
        }
        Some(permission) => AccessDecision::Deny(DenyReason::Insufficient { permission, action }),
    }
}
