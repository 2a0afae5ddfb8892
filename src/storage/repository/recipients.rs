// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Event recipient repository.
//!
//! A recipient joins one event to one contact and owns the gift list for
//! that pairing. Removing a recipient removes its gifts in the same
//! transaction.

use redb::{ReadableTable, WriteTransaction};
use serde::{Deserialize, Serialize};

use super::super::database::{children_of, next_id, read_record, tables, write_record};
use super::super::{Database, StorageError, StorageResult};
use crate::models::{ContactId, EventId, RecipientId};

/// Event recipient stored in the planner database.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StoredRecipient {
    pub id: RecipientId,
    pub event_id: EventId,
    pub contact_id: ContactId,
    pub budget_limit: f64,
    pub notes: Option<String>,
}

/// Fields for adding a contact to an event.
#[derive(Debug, Clone, PartialEq)]
pub struct NewRecipient {
    pub contact_id: ContactId,
    pub budget_limit: f64,
    pub notes: Option<String>,
}

/// Partial recipient update. `None` leaves a field unchanged; `notes:
/// Some(None)` clears the notes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecipientChanges {
    pub budget_limit: Option<f64>,
    pub notes: Option<Option<String>>,
}

/// Repository for recipient operations.
pub struct RecipientRepository<'a> {
    db: &'a Database,
}

impl<'a> RecipientRepository<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Get a recipient by ID, `None` if absent.
    pub fn find(&self, recipient_id: RecipientId) -> StorageResult<Option<StoredRecipient>> {
        let txn = self.db.read()?;
        let table = txn.open_table(tables::RECIPIENTS)?;
        read_record(&table, recipient_id)
    }

    /// Add a recipient to an event.
    ///
    /// The event and the contact must both still exist when the write commits.
    pub fn create(
        &self,
        event_id: EventId,
        new_recipient: NewRecipient,
    ) -> StorageResult<StoredRecipient> {
        let txn = self.db.write()?;
        {
            let events = txn.open_table(tables::EVENTS)?;
            if events.get(event_id)?.is_none() {
                return Err(StorageError::NotFound(format!("Event {event_id}")));
            }
            let contacts = txn.open_table(tables::CONTACTS)?;
            if contacts.get(new_recipient.contact_id)?.is_none() {
                return Err(StorageError::NotFound(format!(
                    "Contact {}",
                    new_recipient.contact_id
                )));
            }
        }

        let recipient = StoredRecipient {
            id: next_id(&txn, "recipients")?,
            event_id,
            contact_id: new_recipient.contact_id,
            budget_limit: new_recipient.budget_limit,
            notes: new_recipient.notes,
        };
        {
            let mut table = txn.open_table(tables::RECIPIENTS)?;
            write_record(&mut table, recipient.id, &recipient)?;
            let mut by_event = txn.open_table(tables::RECIPIENTS_BY_EVENT)?;
            by_event.insert((event_id, recipient.id), ())?;
            let mut by_contact = txn.open_table(tables::RECIPIENTS_BY_CONTACT)?;
            by_contact.insert((recipient.contact_id, recipient.id), ())?;
        }
        txn.commit()?;
        Ok(recipient)
    }

    /// Apply a partial update to a recipient.
    pub fn update(
        &self,
        recipient_id: RecipientId,
        changes: RecipientChanges,
    ) -> StorageResult<StoredRecipient> {
        let txn = self.db.write()?;
        let recipient = {
            let mut table = txn.open_table(tables::RECIPIENTS)?;
            let mut recipient: StoredRecipient = read_record(&table, recipient_id)?
                .ok_or_else(|| StorageError::NotFound(format!("Recipient {recipient_id}")))?;
            if let Some(budget_limit) = changes.budget_limit {
                recipient.budget_limit = budget_limit;
            }
            if let Some(notes) = changes.notes {
                recipient.notes = notes;
            }
            write_record(&mut table, recipient.id, &recipient)?;
            recipient
        };
        txn.commit()?;
        Ok(recipient)
    }

    /// Remove a recipient and its gifts. Returns the number of gifts removed.
    pub fn delete(&self, recipient_id: RecipientId) -> StorageResult<usize> {
        let txn = self.db.write()?;
        let recipient: Option<StoredRecipient> = {
            let table = txn.open_table(tables::RECIPIENTS)?;
            let recipient = read_record(&table, recipient_id)?;
            recipient
        };
        let recipient = recipient
            .ok_or_else(|| StorageError::NotFound(format!("Recipient {recipient_id}")))?;

        let removed_gifts = remove_recipient_in(&txn, &recipient)?;
        txn.commit()?;
        Ok(removed_gifts)
    }

    /// Recipients of an event, ascending by id.
    pub fn list_for_event(&self, event_id: EventId) -> StorageResult<Vec<StoredRecipient>> {
        let txn = self.db.read()?;
        let by_event = txn.open_table(tables::RECIPIENTS_BY_EVENT)?;
        let table = txn.open_table(tables::RECIPIENTS)?;

        let mut recipients = Vec::new();
        for id in children_of(&by_event, event_id)? {
            if let Some(recipient) = read_record(&table, id)? {
                recipients.push(recipient);
            }
        }
        Ok(recipients)
    }
}

/// Remove a recipient, its index rows and its gifts inside an open
/// transaction. Returns the number of gifts removed.
pub(crate) fn remove_recipient_in(
    txn: &WriteTransaction,
    recipient: &StoredRecipient,
) -> StorageResult<usize> {
    let mut gifts_by_recipient = txn.open_table(tables::GIFTS_BY_RECIPIENT)?;
    let gift_ids = children_of(&gifts_by_recipient, recipient.id)?;
    {
        let mut gifts = txn.open_table(tables::GIFTS)?;
        for gift_id in &gift_ids {
            gifts.remove(*gift_id)?;
            gifts_by_recipient.remove((recipient.id, *gift_id))?;
        }
    }

    let mut table = txn.open_table(tables::RECIPIENTS)?;
    table.remove(recipient.id)?;
    let mut by_event = txn.open_table(tables::RECIPIENTS_BY_EVENT)?;
    by_event.remove((recipient.event_id, recipient.id))?;
    let mut by_contact = txn.open_table(tables::RECIPIENTS_BY_CONTACT)?;
    by_contact.remove((recipient.contact_id, recipient.id))?;

    Ok(gift_ids.len())
}
