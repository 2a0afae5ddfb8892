// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Storage-backed access control.
//!
//! Resolves who owns a resource (following recipient and gift records up to
//! their event) and which grant the acting user holds on the nearest
//! shareable ancestor, then hands both to [`decide`].

use super::decision::{decide, AccessBasis, AccessDecision, DenyReason};
use super::{Action, Permission};
use crate::models::{ContactId, EventId, GiftId, RecipientId, UserId};
use crate::service::ServiceError;
use crate::storage::{
    AuditEvent, AuditEventType, ContactRepository, Database, EventRepository, GiftRepository,
    RecipientRepository, ShareKind, ShareRepository, StorageResult,
};

/// A resource an access check is made against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resource {
    Contact(ContactId),
    Event(EventId),
    Recipient(RecipientId),
    Gift(GiftId),
}

impl Resource {
    /// Human-readable kind, used in error messages.
    pub fn label(&self) -> &'static str {
        match self {
            Resource::Contact(_) => "Contact",
            Resource::Event(_) => "Event",
            Resource::Recipient(_) => "Recipient",
            Resource::Gift(_) => "Gift",
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Resource::Contact(_) => "contact",
            Resource::Event(_) => "event",
            Resource::Recipient(_) => "recipient",
            Resource::Gift(_) => "gift",
        }
    }

    pub fn id(&self) -> u64 {
        match self {
            Resource::Contact(id)
            | Resource::Event(id)
            | Resource::Recipient(id)
            | Resource::Gift(id) => *id,
        }
    }
}

/// The shareable resource that carries grants for a [`Resource`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ShareTarget {
    pub kind: ShareKind,
    pub id: u64,
}

/// Owner and share target of an existing resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ownership {
    pub owner: UserId,
    pub target: ShareTarget,
}

/// Outcome of a successful [`AccessControl::authorize`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Authorized {
    pub ownership: Ownership,
    pub basis: AccessBasis,
}

impl Authorized {
    pub fn is_owner(&self) -> bool {
        self.basis == AccessBasis::Owner
    }
}

/// Answers "may user U perform action A on resource R?".
pub struct AccessControl<'a> {
    db: &'a Database,
}

impl<'a> AccessControl<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Resolve the owner and share target of a resource.
    ///
    /// Returns `None` if the resource or any parent on the way to its event
    /// no longer exists.
    pub fn resolve(&self, resource: Resource) -> StorageResult<Option<Ownership>> {
        let event_id = match resource {
            Resource::Contact(id) => {
                return Ok(ContactRepository::new(self.db).find(id)?.map(|contact| {
                    Ownership {
                        owner: contact.user_id,
                        target: ShareTarget {
                            kind: ShareKind::Contact,
                            id,
                        },
                    }
                }));
            }
            Resource::Event(id) => id,
            Resource::Recipient(id) => match RecipientRepository::new(self.db).find(id)? {
                Some(recipient) => recipient.event_id,
                None => return Ok(None),
            },
            Resource::Gift(id) => {
                let Some(gift) = GiftRepository::new(self.db).find(id)? else {
                    return Ok(None);
                };
                match RecipientRepository::new(self.db).find(gift.event_recipient_id)? {
                    Some(recipient) => recipient.event_id,
                    None => return Ok(None),
                }
            }
        };

        Ok(EventRepository::new(self.db)
            .find(event_id)?
            .map(|event| Ownership {
                owner: event.user_id,
                target: ShareTarget {
                    kind: ShareKind::Event,
                    id: event_id,
                },
            }))
    }

    /// The grant `user` holds on a share target.
    pub fn grant_for(
        &self,
        target: ShareTarget,
        user: UserId,
    ) -> StorageResult<Option<Permission>> {
        ShareRepository::new(self.db).grant_for(target.kind, target.id, user)
    }

    /// Evaluate an access check without mapping it to an error.
    pub fn check(
        &self,
        user: UserId,
        action: Action,
        resource: Resource,
    ) -> StorageResult<(AccessDecision, Option<Ownership>)> {
        let Some(ownership) = self.resolve(resource)? else {
            return Ok((AccessDecision::Deny(DenyReason::Missing), None));
        };

        // Owners never need the grant lookup
        let grant = if ownership.owner == user {
            None
        } else {
            self.grant_for(ownership.target, user)?
        };

        Ok((decide(user, ownership.owner, grant, action), Some(ownership)))
    }

    /// Require that `user` may perform `action` on `resource`.
    ///
    /// Missing resources and resources the user cannot see both surface as
    /// `NotFound`; visible resources the grant does not cover surface as
    /// `Forbidden`.
    pub fn authorize(
        &self,
        user: UserId,
        action: Action,
        resource: Resource,
    ) -> Result<Authorized, ServiceError> {
        let (decision, ownership) = self.check(user, action, resource)?;

        match (decision, ownership) {
            (AccessDecision::Allow(basis), Some(ownership)) => Ok(Authorized { ownership, basis }),
            (AccessDecision::Deny(reason), _) if reason.is_hidden() => {
                tracing::debug!(
                    user_id = user,
                    resource = resource.kind(),
                    resource_id = resource.id(),
                    action = %action,
                    "Access check: resource not visible"
                );
                Err(ServiceError::NotFound(format!("{} not found", resource.label())))
            }
            (AccessDecision::Deny(reason), _) => {
                let message = match reason {
                    DenyReason::Insufficient { permission, action } => {
                        format!("A {permission} share does not allow {action}")
                    }
                    DenyReason::OwnerOnly {
                        action: Action::AddRecipient,
                    } => "Only the event owner can add recipients".to_string(),
                    DenyReason::OwnerOnly { .. } => {
                        format!("Only the owner can share this {}", resource.kind())
                    }
                    DenyReason::Missing | DenyReason::Hidden => "Access denied".to_string(),
                };
                tracing::info!(
                    user_id = user,
                    resource = resource.kind(),
                    resource_id = resource.id(),
                    action = %action,
                    "Access denied"
                );
                crate::audit_log!(
                    self.db,
                    AuditEvent::new(AuditEventType::PermissionDenied)
                        .with_user(user)
                        .with_resource(resource.kind(), resource.id())
                        .with_details(serde_json::json!({ "action": action.as_str() }))
                        .failed(message.clone())
                );
                Err(ServiceError::Forbidden(message))
            }
            (AccessDecision::Allow(_), None) => Err(ServiceError::NotFound(format!(
                "{} not found",
                resource.label()
            ))),
        }
    }
}
