// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Audit logging for security-sensitive operations.
//!
//! Registrations, logins, friendship changes, share grants, deletes and
//! access denials are appended to the `audit_log` table in the order they
//! happen.

use chrono::{DateTime, Utc};
#[cfg(test)]
use redb::ReadableTable;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::database::{next_id, tables, write_record};
use super::{Database, StorageResult};
use crate::models::UserId;

/// Types of auditable events.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum AuditEventType {
    // Account events
    UserRegistered,

    // Auth events
    AuthSuccess,
    AuthFailure,

    // Friendship events
    FriendRequestSent,
    FriendRequestAccepted,
    FriendRequestRejected,

    // Sharing events
    GrantCreated,
    GrantUpdated,
    GrantRevoked,

    // Resource events
    ContactDeleted,
    EventDeleted,

    PermissionDenied,
}

/// An audit log entry.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AuditEvent {
    /// Unique event ID.
    pub event_id: String,
    /// When the event occurred.
    pub timestamp: DateTime<Utc>,
    /// Type of event.
    pub event_type: AuditEventType,
    /// User who triggered the event (if known).
    pub user_id: Option<UserId>,
    /// Resource affected.
    pub resource_id: Option<u64>,
    /// Resource type (contact, event, friend_request, ...).
    pub resource_type: Option<String>,
    /// Additional details as JSON.
    #[schema(value_type = Option<Object>)]
    pub details: Option<serde_json::Value>,
    /// Whether the operation succeeded.
    pub success: bool,
    /// Error message if operation failed.
    pub error: Option<String>,
}

impl AuditEvent {
    /// Create a new audit event.
    pub fn new(event_type: AuditEventType) -> Self {
        Self {
            event_id: uuid::Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            event_type,
            user_id: None,
            resource_id: None,
            resource_type: None,
            details: None,
            success: true,
            error: None,
        }
    }

    /// Set the user ID.
    pub fn with_user(mut self, user_id: UserId) -> Self {
        self.user_id = Some(user_id);
        self
    }

    /// Set the resource.
    pub fn with_resource(mut self, resource_type: impl Into<String>, resource_id: u64) -> Self {
        self.resource_type = Some(resource_type.into());
        self.resource_id = Some(resource_id);
        self
    }

    /// Add details.
    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }

    /// Mark as failed with error message.
    pub fn failed(mut self, error: impl Into<String>) -> Self {
        self.success = false;
        self.error = Some(error.into());
        self
    }
}

/// Repository for audit events.
pub struct AuditRepository<'a> {
    db: &'a Database,
}

impl<'a> AuditRepository<'a> {
    /// Create a new audit repository.
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Append an audit event.
    pub fn log(&self, event: &AuditEvent) -> StorageResult<()> {
        let txn = self.db.write()?;
        {
            let seq = next_id(&txn, "audit_log")?;
            let mut table = txn.open_table(tables::AUDIT_LOG)?;
            write_record(&mut table, seq, event)?;
        }
        txn.commit()?;
        Ok(())
    }
}

/// Read-side queries used to assert on the trail.
#[cfg(test)]
impl AuditRepository<'_> {
    /// Most recent events first, at most `limit` of them.
    pub(crate) fn recent(&self, limit: usize) -> StorageResult<Vec<AuditEvent>> {
        let txn = self.db.read()?;
        let table = txn.open_table(tables::AUDIT_LOG)?;

        let mut events = Vec::new();
        for entry in table.iter()?.rev().take(limit) {
            let (_, value) = entry?;
            events.push(serde_json::from_slice(value.value())?);
        }
        Ok(events)
    }

    /// Events triggered by a user, oldest first.
    pub(crate) fn by_user(&self, user_id: UserId) -> StorageResult<Vec<AuditEvent>> {
        self.filtered(|e| e.user_id == Some(user_id))
    }

    /// Events affecting one resource, oldest first.
    pub(crate) fn by_resource(
        &self,
        resource_type: &str,
        resource_id: u64,
    ) -> StorageResult<Vec<AuditEvent>> {
        self.filtered(|e| {
            e.resource_type.as_deref() == Some(resource_type) && e.resource_id == Some(resource_id)
        })
    }

    fn filtered(&self, keep: impl Fn(&AuditEvent) -> bool) -> StorageResult<Vec<AuditEvent>> {
        let txn = self.db.read()?;
        let table = txn.open_table(tables::AUDIT_LOG)?;

        let mut events = Vec::new();
        for entry in table.iter()? {
            let (_, value) = entry?;
            let event: AuditEvent = serde_json::from_slice(value.value())?;
            if keep(&event) {
                events.push(event);
            }
        }
        Ok(events)
    }
}

/// Helper macro for logging audit events.
///
/// Audit failures never fail the request; they are reported through
/// `tracing` instead.
#[macro_export]
macro_rules! audit_log {
    ($db:expr, $event:expr) => {{
        let repo = $crate::storage::AuditRepository::new($db);
        if let Err(e) = repo.log(&$event) {
            tracing::warn!(error = %e, "Failed to write audit event");
        }
    }};
    ($db:expr, $event_type:expr, $user_id:expr) => {{
        $crate::audit_log!($db, $crate::storage::AuditEvent::new($event_type).with_user($user_id))
    }};
    ($db:expr, $event_type:expr, $user_id:expr, $resource_type:expr, $resource_id:expr) => {{
        $crate::audit_log!(
            $db,
            $crate::storage::AuditEvent::new($event_type)
                .with_user($user_id)
                .with_resource($resource_type, $resource_id)
        )
    }};
}
