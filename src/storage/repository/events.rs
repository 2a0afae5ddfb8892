// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Event repository.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::super::database::{children_of, next_id, read_record, tables, write_record};
use super::super::{Database, OwnedResource, StorageError, StorageResult};
use super::recipients::{remove_recipient_in, StoredRecipient};
use super::shares::{self, ShareKind};
use crate::models::{EventId, UserId};

/// Event stored in the planner database.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StoredEvent {
    pub id: EventId,
    /// Owning user. Never changes after creation.
    pub user_id: UserId,
    pub name: String,
    /// Free-form date as entered by the user.
    pub date: Option<String>,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl OwnedResource for StoredEvent {
    fn owner_user_id(&self) -> UserId {
        self.user_id
    }
}

/// Editable event fields. Updates replace all of them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventFields {
    pub name: String,
    pub date: Option<String>,
    pub description: Option<String>,
}

/// What an event delete removed alongside the event itself.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EventCascade {
    pub recipients: usize,
    pub gifts: usize,
    pub grants: usize,
}

/// Repository for event operations.
pub struct EventRepository<'a> {
    db: &'a Database,
}

impl<'a> EventRepository<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Get an event by ID, `None` if absent.
    pub fn find(&self, event_id: EventId) -> StorageResult<Option<StoredEvent>> {
        let txn = self.db.read()?;
        let table = txn.open_table(tables::EVENTS)?;
        read_record(&table, event_id)
    }

    /// Create an event owned by `owner`.
    pub fn create(&self, owner: UserId, fields: EventFields) -> StorageResult<StoredEvent> {
        let txn = self.db.write()?;
        let event = StoredEvent {
            id: next_id(&txn, "events")?,
            user_id: owner,
            name: fields.name,
            date: fields.date,
            description: fields.description,
            created_at: Utc::now(),
        };
        {
            let mut table = txn.open_table(tables::EVENTS)?;
            write_record(&mut table, event.id, &event)?;
            let mut by_owner = txn.open_table(tables::EVENTS_BY_OWNER)?;
            by_owner.insert((owner, event.id), ())?;
        }
        txn.commit()?;
        Ok(event)
    }

    /// Replace the editable fields of an event.
    pub fn update(&self, event_id: EventId, fields: EventFields) -> StorageResult<StoredEvent> {
        let txn = self.db.write()?;
        let event = {
            let mut table = txn.open_table(tables::EVENTS)?;
            let mut event: StoredEvent = read_record(&table, event_id)?
                .ok_or_else(|| StorageError::NotFound(format!("Event {event_id}")))?;
            event.name = fields.name;
            event.date = fields.date;
            event.description = fields.description;
            write_record(&mut table, event.id, &event)?;
            event
        };
        txn.commit()?;
        Ok(event)
    }

    /// Delete an event with its recipients, their gifts and all grants on it.
    pub fn delete(&self, event_id: EventId) -> StorageResult<EventCascade> {
        let txn = self.db.write()?;

        let (event, recipients) = {
            let table = txn.open_table(tables::EVENTS)?;
            let event: StoredEvent = read_record(&table, event_id)?
                .ok_or_else(|| StorageError::NotFound(format!("Event {event_id}")))?;

            let by_event = txn.open_table(tables::RECIPIENTS_BY_EVENT)?;
            let recipient_table = txn.open_table(tables::RECIPIENTS)?;
            let mut recipients: Vec<StoredRecipient> = Vec::new();
            for id in children_of(&by_event, event_id)? {
                if let Some(recipient) = read_record(&recipient_table, id)? {
                    recipients.push(recipient);
                }
            }
            (event, recipients)
        };

        let mut cascade = EventCascade {
            recipients: recipients.len(),
            ..Default::default()
        };
        for recipient in &recipients {
            cascade.gifts += remove_recipient_in(&txn, recipient)?;
        }
        cascade.grants = shares::remove_all_in(&txn, ShareKind::Event, event_id)?;

        {
            let mut table = txn.open_table(tables::EVENTS)?;
            table.remove(event_id)?;
            let mut by_owner = txn.open_table(tables::EVENTS_BY_OWNER)?;
            by_owner.remove((event.user_id, event_id))?;
        }
        txn.commit()?;
        Ok(cascade)
    }

    /// Events owned by `owner`, ascending by id.
    pub fn list_owned(&self, owner: UserId) -> StorageResult<Vec<StoredEvent>> {
        let txn = self.db.read()?;
        let by_owner = txn.open_table(tables::EVENTS_BY_OWNER)?;
        let table = txn.open_table(tables::EVENTS)?;

        let mut events = Vec::new();
        for id in children_of(&by_owner, owner)? {
            if let Some(event) = read_record(&table, id)? {
                events.push(event);
            }
        }
        Ok(events)
    }

    /// Load several events, skipping ids that no longer resolve.
    pub fn get_many(&self, event_ids: &[EventId]) -> StorageResult<Vec<StoredEvent>> {
        let txn = self.db.read()?;
        let table = txn.open_table(tables::EVENTS)?;
        let mut events = Vec::with_capacity(event_ids.len());
        for id in event_ids {
            if let Some(event) = read_record(&table, *id)? {
                events.push(event);
            }
        }
        Ok(events)
    }
}
