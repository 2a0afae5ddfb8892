// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # API Data Models
//!
//! This module defines the request and response data structures used by
//! the REST API. All types derive `Serialize`/`Deserialize` and `ToSchema`
//! for automatic JSON handling and OpenAPI documentation.
//!
//! Stored records live next to their repositories in
//! [`crate::storage::repository`]; the types here are what crosses the wire.
//!
//! ## Model Categories
//!
//! - **Users**: registration, login tokens, public profiles
//! - **Contacts / Events**: owned resources, shareable with friends
//! - **Recipients / Gifts**: per-event gift planning
//! - **Friends**: friend requests and friend lists
//! - **Sharing**: grant requests and grant listings

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::access::Permission;
use crate::storage::{
    FriendStatus, StoredContact, StoredEvent, StoredFriendRequest, StoredGift, StoredGrant,
    StoredRecipient, StoredUser,
};

// =============================================================================
// Identifiers
// =============================================================================

pub type UserId = u64;
pub type ContactId = u64;
pub type EventId = u64;
pub type RecipientId = u64;
pub type GiftId = u64;
pub type FriendRequestId = u64;

// =============================================================================
// User Models
// =============================================================================

/// Public profile of a user. Never carries the password hash.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct UserProfile {
    pub id: UserId,
    pub username: String,
    pub email: String,
    #[serde(default)]
    pub full_name: Option<String>,
}

impl From<StoredUser> for UserProfile {
    fn from(user: StoredUser) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            full_name: user.full_name,
        }
    }
}

/// Request to register a new account.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub full_name: Option<String>,
}

/// Form-encoded login credentials for `/token`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

/// Issued access token.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct TokenResponse {
    pub access_token: String,
    /// Always `bearer`.
    pub token_type: String,
    /// Lifetime of the token in seconds.
    pub expires_in: u64,
}

// =============================================================================
// Contact Models
// =============================================================================

/// A contact owned by one user.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct Contact {
    pub id: ContactId,
    /// Owner of the contact.
    pub user_id: UserId,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub notes: Option<String>,
}

impl From<StoredContact> for Contact {
    fn from(contact: StoredContact) -> Self {
        Self {
            id: contact.id,
            user_id: contact.user_id,
            name: contact.name,
            email: contact.email,
            phone: contact.phone,
            notes: contact.notes,
        }
    }
}

/// Request body for creating or replacing a contact.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ContactRequest {
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

// =============================================================================
// Event Models
// =============================================================================

/// An event owned by one user.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct Event {
    pub id: EventId,
    /// Owner of the event.
    pub user_id: UserId,
    pub name: String,
    pub date: Option<String>,
    pub description: Option<String>,
}

impl From<StoredEvent> for Event {
    fn from(event: StoredEvent) -> Self {
        Self {
            id: event.id,
            user_id: event.user_id,
            name: event.name,
            date: event.date,
            description: event.description,
        }
    }
}

/// Request body for creating or replacing an event.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct EventRequest {
    pub name: String,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

/// An event with its recipients, their contacts and gifts.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct EventDetail {
    #[serde(flatten)]
    pub event: Event,
    pub recipients: Vec<RecipientDetail>,
}

// =============================================================================
// Recipient Models
// =============================================================================

/// A contact attached to an event with a budget.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct Recipient {
    pub id: RecipientId,
    pub event_id: EventId,
    pub contact_id: ContactId,
    pub budget_limit: f64,
    pub notes: Option<String>,
}

impl From<StoredRecipient> for Recipient {
    fn from(recipient: StoredRecipient) -> Self {
        Self {
            id: recipient.id,
            event_id: recipient.event_id,
            contact_id: recipient.contact_id,
            budget_limit: recipient.budget_limit,
            notes: recipient.notes,
        }
    }
}

/// A recipient with its contact and planned gifts.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct RecipientDetail {
    #[serde(flatten)]
    pub recipient: Recipient,
    pub contact: Contact,
    pub gifts: Vec<Gift>,
}

/// Request to add a contact to an event.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateRecipientRequest {
    pub contact_id: ContactId,
    #[serde(default)]
    pub budget_limit: f64,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Partial recipient update.
///
/// An absent key leaves the field unchanged; `"notes": null` clears it.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct UpdateRecipientRequest {
    #[serde(default)]
    pub budget_limit: Option<f64>,
    #[serde(
        default,
        deserialize_with = "nullable_change",
        skip_serializing_if = "Option::is_none"
    )]
    #[schema(value_type = Option<String>)]
    pub notes: Option<Option<String>>,
}

// =============================================================================
// Gift Models
// =============================================================================

/// A gift planned for a recipient.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct Gift {
    pub id: GiftId,
    pub event_recipient_id: RecipientId,
    pub name: String,
    pub description: Option<String>,
    pub amount: f64,
    pub purchased: bool,
    pub url: Option<String>,
}

impl From<StoredGift> for Gift {
    fn from(gift: StoredGift) -> Self {
        Self {
            id: gift.id,
            event_recipient_id: gift.event_recipient_id,
            name: gift.name,
            description: gift.description,
            amount: gift.amount,
            purchased: gift.purchased,
            url: gift.url,
        }
    }
}

/// Request to create a gift.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateGiftRequest {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub amount: f64,
    #[serde(default)]
    pub purchased: bool,
    #[serde(default)]
    pub url: Option<String>,
}

/// Partial gift update.
///
/// Absent keys are left unchanged. `description` and `url` are cleared by an
/// explicit `null`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct UpdateGiftRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(
        default,
        deserialize_with = "nullable_change",
        skip_serializing_if = "Option::is_none"
    )]
    #[schema(value_type = Option<String>)]
    pub description: Option<Option<String>>,
    #[serde(default)]
    pub amount: Option<f64>,
    #[serde(default)]
    pub purchased: Option<bool>,
    #[serde(
        default,
        deserialize_with = "nullable_change",
        skip_serializing_if = "Option::is_none"
    )]
    #[schema(value_type = Option<String>)]
    pub url: Option<Option<String>>,
}

/// A key that is present maps to `Some`, even when its value is `null`.
fn nullable_change<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

// =============================================================================
// Friend Models
// =============================================================================

/// Request to send a friend request by username.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct FriendRequestCreate {
    pub to_username: String,
}

/// A friend request together with the sender's profile.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct FriendRequest {
    pub id: FriendRequestId,
    pub from_user_id: UserId,
    pub to_user_id: UserId,
    pub status: FriendStatus,
    pub created_at: DateTime<Utc>,
    pub from_user: UserProfile,
}

impl FriendRequest {
    pub fn new(request: StoredFriendRequest, from_user: UserProfile) -> Self {
        Self {
            id: request.id,
            from_user_id: request.from_user_id,
            to_user_id: request.to_user_id,
            status: request.status,
            created_at: request.created_at,
            from_user,
        }
    }
}

// =============================================================================
// Sharing Models
// =============================================================================

/// Request to share a contact or event with a friend.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ShareRequest {
    pub shared_with_user_id: UserId,
    pub permission: Permission,
}

/// Outcome of a share request.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct ShareResponse {
    pub resource_id: u64,
    pub shared_with_user_id: UserId,
    pub permission: Permission,
    /// `true` when an existing grant had its permission replaced.
    pub updated: bool,
}

/// A grant on a contact or event as shown to the owner.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct ShareGrant {
    pub shared_with_user_id: UserId,
    pub permission: Permission,
}

impl From<StoredGrant> for ShareGrant {
    fn from(grant: StoredGrant) -> Self {
        Self {
            shared_with_user_id: grant.shared_with_user_id,
            permission: grant.permission,
        }
    }
}

// =============================================================================
// Pagination
// =============================================================================

/// Default page size for listings.
pub const DEFAULT_LIMIT: usize = 100;

/// `skip`/`limit` query parameters.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema, IntoParams, PartialEq, Eq)]
#[into_params(parameter_in = Query)]
pub struct Pagination {
    /// Number of entries to skip. Defaults to 0.
    #[serde(default)]
    pub skip: usize,
    /// Maximum number of entries to return. Defaults to 100.
    #[serde(default = "default_limit")]
    pub limit: usize,
}

fn default_limit() -> usize {
    DEFAULT_LIMIT
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            skip: 0,
            limit: DEFAULT_LIMIT,
        }
    }
}

impl Pagination {
    /// Apply this page window to an already ordered list.
    pub fn apply<T>(&self, items: Vec<T>) -> Vec<T> {
        items.into_iter().skip(self.skip).take(self.limit).collect()
    }
}
