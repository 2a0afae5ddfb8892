// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Contact repository.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::super::database::{children_of, next_id, read_record, tables, write_record};
use super::super::{Database, OwnedResource, StorageError, StorageResult};
use super::shares::{self, ShareKind};
use crate::models::{ContactId, UserId};

/// Contact stored in the planner database.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StoredContact {
    pub id: ContactId,
    /// Owning user. Never changes after creation.
    pub user_id: UserId,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl OwnedResource for StoredContact {
    fn owner_user_id(&self) -> UserId {
        self.user_id
    }
}

/// Editable contact fields. Updates replace all of them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactFields {
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub notes: Option<String>,
}

/// Repository for contact operations.
pub struct ContactRepository<'a> {
    db: &'a Database,
}

impl<'a> ContactRepository<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Get a contact by ID, `None` if absent.
    pub fn find(&self, contact_id: ContactId) -> StorageResult<Option<StoredContact>> {
        let txn = self.db.read()?;
        let table = txn.open_table(tables::CONTACTS)?;
        read_record(&table, contact_id)
    }

    /// Create a contact owned by `owner`.
    pub fn create(&self, owner: UserId, fields: ContactFields) -> StorageResult<StoredContact> {
        let txn = self.db.write()?;
        let contact = StoredContact {
            id: next_id(&txn, "contacts")?,
            user_id: owner,
            name: fields.name,
            email: fields.email,
            phone: fields.phone,
            notes: fields.notes,
            created_at: Utc::now(),
        };
        {
            let mut table = txn.open_table(tables::CONTACTS)?;
            write_record(&mut table, contact.id, &contact)?;
            let mut by_owner = txn.open_table(tables::CONTACTS_BY_OWNER)?;
            by_owner.insert((owner, contact.id), ())?;
        }
        txn.commit()?;
        Ok(contact)
    }

    /// Replace the editable fields of a contact.
    pub fn update(
        &self,
        contact_id: ContactId,
        fields: ContactFields,
    ) -> StorageResult<StoredContact> {
        let txn = self.db.write()?;
        let contact = {
            let mut table = txn.open_table(tables::CONTACTS)?;
            let mut contact: StoredContact = read_record(&table, contact_id)?
                .ok_or_else(|| StorageError::NotFound(format!("Contact {contact_id}")))?;
            contact.name = fields.name;
            contact.email = fields.email;
            contact.phone = fields.phone;
            contact.notes = fields.notes;
            write_record(&mut table, contact.id, &contact)?;
            contact
        };
        txn.commit()?;
        Ok(contact)
    }

    /// Delete a contact together with its grants.
    ///
    /// Fails with `InUse` while any event recipient still references it.
    /// Returns the number of grants removed.
    pub fn delete(&self, contact_id: ContactId) -> StorageResult<usize> {
        let txn = self.db.write()?;
        let removed_grants = {
            let mut table = txn.open_table(tables::CONTACTS)?;
            let contact: StoredContact = read_record(&table, contact_id)?
                .ok_or_else(|| StorageError::NotFound(format!("Contact {contact_id}")))?;

            let recipients = txn.open_table(tables::RECIPIENTS_BY_CONTACT)?;
            if !children_of(&recipients, contact_id)?.is_empty() {
                return Err(StorageError::InUse(
                    "Contact is still a recipient of an event".to_string(),
                ));
            }

            table.remove(contact_id)?;
            let mut by_owner = txn.open_table(tables::CONTACTS_BY_OWNER)?;
            by_owner.remove((contact.user_id, contact_id))?;
            shares::remove_all_in(&txn, ShareKind::Contact, contact_id)?
        };
        txn.commit()?;
        Ok(removed_grants)
    }

    /// Contacts owned by `owner`, ascending by id.
    pub fn list_owned(&self, owner: UserId) -> StorageResult<Vec<StoredContact>> {
        let txn = self.db.read()?;
        let by_owner = txn.open_table(tables::CONTACTS_BY_OWNER)?;
        let table = txn.open_table(tables::CONTACTS)?;

        let mut contacts = Vec::new();
        for id in children_of(&by_owner, owner)? {
            if let Some(contact) = read_record(&table, id)? {
                contacts.push(contact);
            }
        }
        Ok(contacts)
    }

    /// Load several contacts, skipping ids that no longer resolve.
    pub fn get_many(&self, contact_ids: &[ContactId]) -> StorageResult<Vec<StoredContact>> {
        let txn = self.db.read()?;
        let table = txn.open_table(tables::CONTACTS)?;
        let mut contacts = Vec::with_capacity(contact_ids.len());
        for id in contact_ids {
            if let Some(contact) = read_record(&table, *id)? {
                contacts.push(contact);
            }
        }
        Ok(contacts)
    }
}
