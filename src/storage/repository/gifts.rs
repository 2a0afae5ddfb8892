// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Gift repository.

use redb::ReadableTable;
use serde::{Deserialize, Serialize};

use super::super::database::{children_of, next_id, read_record, tables, write_record};
use super::super::{Database, StorageError, StorageResult};
use crate::models::{GiftId, RecipientId};

/// Gift idea or purchase planned for one event recipient.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StoredGift {
    pub id: GiftId,
    pub event_recipient_id: RecipientId,
    pub name: String,
    pub description: Option<String>,
    pub amount: f64,
    pub purchased: bool,
    pub url: Option<String>,
}

/// Fields for a new gift.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GiftFields {
    pub name: String,
    pub description: Option<String>,
    pub amount: f64,
    pub purchased: bool,
    pub url: Option<String>,
}

/// Partial gift update. `None` leaves a field unchanged; `Some(None)`
/// clears a nullable one.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GiftChanges {
    pub name: Option<String>,
    pub description: Option<Option<String>>,
    pub amount: Option<f64>,
    pub purchased: Option<bool>,
    pub url: Option<Option<String>>,
}

/// Repository for gift operations.
pub struct GiftRepository<'a> {
    db: &'a Database,
}

impl<'a> GiftRepository<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Get a gift by ID, `None` if absent.
    pub fn find(&self, gift_id: GiftId) -> StorageResult<Option<StoredGift>> {
        let txn = self.db.read()?;
        let table = txn.open_table(tables::GIFTS)?;
        read_record(&table, gift_id)
    }

    /// Add a gift to a recipient that still exists.
    pub fn create(
        &self,
        recipient_id: RecipientId,
        fields: GiftFields,
    ) -> StorageResult<StoredGift> {
        let txn = self.db.write()?;
        {
            let recipients = txn.open_table(tables::RECIPIENTS)?;
            if recipients.get(recipient_id)?.is_none() {
                return Err(StorageError::NotFound(format!("Recipient {recipient_id}")));
            }
        }

        let gift = StoredGift {
            id: next_id(&txn, "gifts")?,
            event_recipient_id: recipient_id,
            name: fields.name,
            description: fields.description,
            amount: fields.amount,
            purchased: fields.purchased,
            url: fields.url,
        };
        {
            let mut table = txn.open_table(tables::GIFTS)?;
            write_record(&mut table, gift.id, &gift)?;
            let mut by_recipient = txn.open_table(tables::GIFTS_BY_RECIPIENT)?;
            by_recipient.insert((recipient_id, gift.id), ())?;
        }
        txn.commit()?;
        Ok(gift)
    }

    /// Apply a partial update to a gift.
    pub fn update(&self, gift_id: GiftId, changes: GiftChanges) -> StorageResult<StoredGift> {
        let txn = self.db.write()?;
        let gift = {
            let mut table = txn.open_table(tables::GIFTS)?;
            let mut gift: StoredGift = read_record(&table, gift_id)?
                .ok_or_else(|| StorageError::NotFound(format!("Gift {gift_id}")))?;
            if let Some(name) = changes.name {
                gift.name = name;
            }
            if let Some(description) = changes.description {
                gift.description = description;
            }
            if let Some(amount) = changes.amount {
                gift.amount = amount;
            }
            if let Some(purchased) = changes.purchased {
                gift.purchased = purchased;
            }
            if let Some(url) = changes.url {
                gift.url = url;
            }
            write_record(&mut table, gift.id, &gift)?;
            gift
        };
        txn.commit()?;
        Ok(gift)
    }

    /// Delete a gift.
    pub fn delete(&self, gift_id: GiftId) -> StorageResult<()> {
        let txn = self.db.write()?;
        {
            let mut table = txn.open_table(tables::GIFTS)?;
            let gift: StoredGift = read_record(&table, gift_id)?
                .ok_or_else(|| StorageError::NotFound(format!("Gift {gift_id}")))?;
            table.remove(gift_id)?;
            let mut by_recipient = txn.open_table(tables::GIFTS_BY_RECIPIENT)?;
            by_recipient.remove((gift.event_recipient_id, gift_id))?;
        }
        txn.commit()?;
        Ok(())
    }

    /// Gifts planned for a recipient, ascending by id.
    pub fn list_for_recipient(&self, recipient_id: RecipientId) -> StorageResult<Vec<StoredGift>> {
        let txn = self.db.read()?;
        let by_recipient = txn.open_table(tables::GIFTS_BY_RECIPIENT)?;
        let table = txn.open_table(tables::GIFTS)?;

        let mut gifts = Vec::new();
        for id in children_of(&by_recipient, recipient_id)? {
            if let Some(gift) = read_record(&table, id)? {
                gifts.push(gift);
            }
        }
        Ok(gifts)
    }
}
