// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Contact and event sharing.
//!
//! Only the owner of a contact or event may grant, change or revoke access,
//! and grants can only be made to accepted friends. A grant is keyed on
//! `(resource, user)`, so sharing again replaces the permission.

use super::{FriendService, ServiceError, ServiceResult};
use crate::access::{AccessControl, Action, Permission, Resource};
use crate::models::{ShareGrant, ShareResponse, UserId};
use crate::storage::{AuditEvent, AuditEventType, Database, ShareKind, ShareRepository};

fn resource(kind: ShareKind, id: u64) -> Resource {
    match kind {
        ShareKind::Contact => Resource::Contact(id),
        ShareKind::Event => Resource::Event(id),
    }
}

pub struct SharingService<'a> {
    db: &'a Database,
}

impl<'a> SharingService<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Grant `target` access to a contact or event owned by `owner`.
    pub fn share(
        &self,
        kind: ShareKind,
        resource_id: u64,
        owner: UserId,
        target: UserId,
        permission: Permission,
    ) -> ServiceResult<ShareResponse> {
        AccessControl::new(self.db).authorize(owner, Action::Share, resource(kind, resource_id))?;

        if !FriendService::new(self.db).is_friend(owner, target)? {
            return Err(ServiceError::InvalidOperation(
                "Can only share with friends".to_string(),
            ));
        }

        let previous =
            ShareRepository::new(self.db).upsert(kind, resource_id, target, permission)?;
        let event_type = if previous.is_some() {
            AuditEventType::GrantUpdated
        } else {
            AuditEventType::GrantCreated
        };

        tracing::info!(
            resource = kind.as_str(),
            resource_id,
            owner_id = owner,
            shared_with_user_id = target,
            permission = %permission,
            "Share grant stored"
        );
        crate::audit_log!(
            self.db,
            AuditEvent::new(event_type)
                .with_user(owner)
                .with_resource(kind.as_str(), resource_id)
                .with_details(serde_json::json!({
                    "shared_with_user_id": target,
                    "permission": permission.as_str(),
                    "previous": previous.map(|p| p.as_str()),
                }))
        );

        Ok(ShareResponse {
            resource_id,
            shared_with_user_id: target,
            permission,
            updated: previous.is_some(),
        })
    }

    /// Revoke the grant `target` holds. Revoking an absent grant succeeds.
    pub fn unshare(
        &self,
        kind: ShareKind,
        resource_id: u64,
        owner: UserId,
        target: UserId,
    ) -> ServiceResult<()> {
        AccessControl::new(self.db).authorize(owner, Action::Share, resource(kind, resource_id))?;

        if ShareRepository::new(self.db).remove(kind, resource_id, target)? {
            tracing::info!(
                resource = kind.as_str(),
                resource_id,
                owner_id = owner,
                shared_with_user_id = target,
                "Share grant revoked"
            );
            crate::audit_log!(
                self.db,
                AuditEvent::new(AuditEventType::GrantRevoked)
                    .with_user(owner)
                    .with_resource(kind.as_str(), resource_id)
                    .with_details(serde_json::json!({ "shared_with_user_id": target }))
            );
        }
        Ok(())
    }

    /// Grants on a contact or event, for its owner.
    pub fn list_grants(
        &self,
        kind: ShareKind,
        resource_id: u64,
        owner: UserId,
    ) -> ServiceResult<Vec<ShareGrant>> {
        AccessControl::new(self.db).authorize(owner, Action::Share, resource(kind, resource_id))?;

        Ok(ShareRepository::new(self.db)
            .list(kind, resource_id)?
            .into_iter()
            .map(ShareGrant::from)
            .collect())
    }
}
