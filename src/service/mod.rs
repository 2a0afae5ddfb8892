// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Core Services
//!
//! Domain operations sitting between the HTTP handlers and the repositories.
//! Every read or mutation of an owned resource is checked through
//! [`crate::access::AccessControl`] before the store is touched.
//!
//! - [`accounts`]: registration and profiles
//! - [`friends`]: friend request lifecycle and friendship queries
//! - [`sharing`]: contact and event grants
//! - [`contacts`], [`events`], [`gifts`]: owner/grant-aware CRUD

pub mod accounts;
pub mod contacts;
pub mod events;
pub mod friends;
pub mod gifts;
pub mod sharing;

pub use accounts::AccountService;
pub use contacts::ContactService;
pub use events::EventService;
pub use friends::{FriendResponse, FriendService};
pub use gifts::GiftService;
pub use sharing::SharingService;

use crate::auth::AuthError;
use crate::storage::StorageError;

/// Errors raised by the service layer.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// The resource does not exist or is not visible to the caller.
    #[error("{0}")]
    NotFound(String),

    /// The resource is visible but the caller may not perform the action.
    #[error("{0}")]
    Forbidden(String),

    /// The operation would violate a uniqueness or reference constraint.
    #[error("{0}")]
    Conflict(String),

    /// The request makes no sense in the current state.
    #[error("{0}")]
    InvalidOperation(String),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error("storage failure: {0}")]
    Storage(StorageError),
}

impl From<StorageError> for ServiceError {
    fn from(error: StorageError) -> Self {
        match error {
            StorageError::NotFound(what) => ServiceError::NotFound(format!("{what} not found")),
            StorageError::AlreadyExists(message) | StorageError::InUse(message) => {
                ServiceError::Conflict(message)
            }
            other => ServiceError::Storage(other),
        }
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Reject empty or whitespace-only input.
pub(crate) fn require_non_blank(field: &str, value: &str) -> ServiceResult<()> {
    if value.trim().is_empty() {
        return Err(ServiceError::InvalidOperation(format!(
            "{field} must not be empty"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn storage_errors_map_to_domain_errors() {
        assert!(matches!(
            ServiceError::from(StorageError::NotFound("Event 4".into())),
            ServiceError::NotFound(msg) if msg == "Event 4 not found"
        ));
        assert!(matches!(
            ServiceError::from(StorageError::AlreadyExists("Username already registered".into())),
            ServiceError::Conflict(msg) if msg == "Username already registered"
        ));
        assert!(matches!(
            ServiceError::from(StorageError::InUse("still used".into())),
            ServiceError::Conflict(_)
        ));
        assert!(matches!(
            ServiceError::from(StorageError::Corrupt("bad".into())),
            ServiceError::Storage(_)
        ));
    }

    #[test]
    fn blank_input_is_invalid() {
        assert!(require_non_blank("name", "Mom").is_ok());
        assert!(matches!(
            require_non_blank("name", "   "),
            Err(ServiceError::InvalidOperation(msg)) if msg == "name must not be empty"
        ));
    }
}
