// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Sharing grant repository.
//!
//! Grants live in `contact_grants` / `event_grants` keyed on
//! `(resource id, user id)`, so a second share for the same pair overwrites
//! the first. The `*_grants_by_user` tables map `(user id, resource id)` back
//! for listing what has been shared with a user.

use redb::{ReadableTable, TableDefinition, WriteTransaction};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::super::database::{children_of, tables, GrantTable, IndexTable};
use super::super::{Database, StorageError, StorageResult};
use crate::access::Permission;
use crate::models::UserId;

/// Resource kinds that can carry grants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ShareKind {
    Contact,
    Event,
}

impl ShareKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ShareKind::Contact => "contact",
            ShareKind::Event => "event",
        }
    }

    fn grants(&self) -> GrantTable {
        match self {
            ShareKind::Contact => tables::CONTACT_GRANTS,
            ShareKind::Event => tables::EVENT_GRANTS,
        }
    }

    fn by_user(&self) -> IndexTable {
        match self {
            ShareKind::Contact => tables::CONTACT_GRANTS_BY_USER,
            ShareKind::Event => tables::EVENT_GRANTS_BY_USER,
        }
    }

    fn records(&self) -> TableDefinition<'static, u64, &'static [u8]> {
        match self {
            ShareKind::Contact => tables::CONTACTS,
            ShareKind::Event => tables::EVENTS,
        }
    }
}

/// A permission grant on one contact or event.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct StoredGrant {
    pub resource_id: u64,
    pub shared_with_user_id: UserId,
    pub permission: Permission,
}

fn parse_permission(value: &str) -> StorageResult<Permission> {
    Permission::parse(value)
        .ok_or_else(|| StorageError::Corrupt(format!("unknown permission '{value}'")))
}

/// Repository for share grants.
pub struct ShareRepository<'a> {
    db: &'a Database,
}

impl<'a> ShareRepository<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Insert or overwrite the grant for `(resource_id, user_id)`.
    ///
    /// Returns the permission that was replaced, `None` for a new grant.
    /// Fails with `NotFound` if the resource no longer exists.
    pub fn upsert(
        &self,
        kind: ShareKind,
        resource_id: u64,
        user_id: UserId,
        permission: Permission,
    ) -> StorageResult<Option<Permission>> {
        let txn = self.db.write()?;
        let previous = {
            let records = txn.open_table(kind.records())?;
            if records.get(resource_id)?.is_none() {
                return Err(StorageError::NotFound(format!(
                    "{} {resource_id}",
                    kind.as_str()
                )));
            }

            let mut grants = txn.open_table(kind.grants())?;
            let previous = match grants.insert((resource_id, user_id), permission.as_str())? {
                Some(old) => Some(parse_permission(old.value())?),
                None => None,
            };
            let mut by_user = txn.open_table(kind.by_user())?;
            by_user.insert((user_id, resource_id), ())?;
            previous
        };
        txn.commit()?;
        Ok(previous)
    }

    /// Remove the grant for `(resource_id, user_id)`. Returns whether one existed.
    pub fn remove(
        &self,
        kind: ShareKind,
        resource_id: u64,
        user_id: UserId,
    ) -> StorageResult<bool> {
        let txn = self.db.write()?;
        let removed = {
            let mut grants = txn.open_table(kind.grants())?;
            let removed = grants.remove((resource_id, user_id))?.is_some();
            let mut by_user = txn.open_table(kind.by_user())?;
            by_user.remove((user_id, resource_id))?;
            removed
        };
        if removed {
            txn.commit()?;
        }
        Ok(removed)
    }

    /// The permission `user_id` holds on a resource, if any.
    pub fn grant_for(
        &self,
        kind: ShareKind,
        resource_id: u64,
        user_id: UserId,
    ) -> StorageResult<Option<Permission>> {
        let txn = self.db.read()?;
        let grants = txn.open_table(kind.grants())?;
        match grants.get((resource_id, user_id))? {
            Some(value) => Ok(Some(parse_permission(value.value())?)),
            None => Ok(None),
        }
    }

    /// All grants on a resource, ordered by grantee id.
    pub fn list(&self, kind: ShareKind, resource_id: u64) -> StorageResult<Vec<StoredGrant>> {
        let txn = self.db.read()?;
        let grants = txn.open_table(kind.grants())?;

        let mut result = Vec::new();
        for entry in grants.range((resource_id, 0)..=(resource_id, u64::MAX))? {
            let (key, value) = entry?;
            result.push(StoredGrant {
                resource_id,
                shared_with_user_id: key.value().1,
                permission: parse_permission(value.value())?,
            });
        }
        Ok(result)
    }

    /// Ids of resources of `kind` shared with `user_id`, ascending.
    pub fn shared_ids_for_user(&self, kind: ShareKind, user_id: UserId) -> StorageResult<Vec<u64>> {
        let txn = self.db.read()?;
        let by_user = txn.open_table(kind.by_user())?;
        children_of(&by_user, user_id)
    }
}

/// Remove every grant on a resource inside an open transaction.
///
/// Returns the number of grants removed.
pub(crate) fn remove_all_in(
    txn: &WriteTransaction,
    kind: ShareKind,
    resource_id: u64,
) -> StorageResult<usize> {
    let mut grants = txn.open_table(kind.grants())?;
    let grantees = children_of(&grants, resource_id)?;

    let mut by_user = txn.open_table(kind.by_user())?;
    for user_id in &grantees {
        grants.remove((resource_id, *user_id))?;
        by_user.remove((*user_id, resource_id))?;
    }
    Ok(grantees.len())
}
