// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Event recipients and their gifts.
//!
//! Both inherit access from their event: an event grant covers every
//! recipient and gift under it. Adding recipients stays with the event
//! owner.

use super::{require_non_blank, ServiceError, ServiceResult};
use crate::access::{AccessControl, Action, Resource};
use crate::models::{
    CreateGiftRequest, CreateRecipientRequest, EventId, Gift, GiftId, Recipient, RecipientDetail,
    RecipientId, UpdateGiftRequest, UpdateRecipientRequest, UserId,
};
use crate::storage::{
    ContactRepository, Database, GiftChanges, GiftFields, GiftRepository, NewRecipient,
    OwnedResource, RecipientChanges, RecipientRepository, StorageError, StoredRecipient,
};

/// Recipients of an event with their contacts and gifts, ascending by id.
pub(crate) fn recipient_details(
    db: &Database,
    event_id: EventId,
) -> ServiceResult<Vec<RecipientDetail>> {
    let contacts = ContactRepository::new(db);
    let gift_repo = GiftRepository::new(db);

    RecipientRepository::new(db)
        .list_for_event(event_id)?
        .into_iter()
        .map(|recipient| -> ServiceResult<RecipientDetail> {
            let contact = contacts.find(recipient.contact_id)?.ok_or_else(|| {
                StorageError::Corrupt(format!(
                    "recipient {} references missing contact {}",
                    recipient.id, recipient.contact_id
                ))
            })?;
            let gifts = gift_repo
                .list_for_recipient(recipient.id)?
                .into_iter()
                .map(Gift::from)
                .collect();
            Ok(RecipientDetail {
                recipient: recipient.into(),
                contact: contact.into(),
                gifts,
            })
        })
        .collect()
}

pub struct GiftService<'a> {
    db: &'a Database,
}

impl<'a> GiftService<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Add one of the event owner's contacts to an event.
    pub fn add_recipient(
        &self,
        user: UserId,
        event_id: EventId,
        request: CreateRecipientRequest,
    ) -> ServiceResult<Recipient> {
        let authorized = AccessControl::new(self.db).authorize(
            user,
            Action::AddRecipient,
            Resource::Event(event_id),
        )?;

        let contact_owned = ContactRepository::new(self.db)
            .find(request.contact_id)?
            .is_some_and(|c| c.is_owned_by(authorized.ownership.owner));
        if !contact_owned {
            return Err(ServiceError::NotFound("Contact not found".to_string()));
        }

        let recipient = RecipientRepository::new(self.db).create(
            event_id,
            NewRecipient {
                contact_id: request.contact_id,
                budget_limit: request.budget_limit,
                notes: request.notes,
            },
        )?;
        tracing::debug!(
            recipient_id = recipient.id,
            event_id,
            contact_id = recipient.contact_id,
            "Recipient added"
        );
        Ok(recipient.into())
    }

    pub fn list_recipients(
        &self,
        user: UserId,
        event_id: EventId,
    ) -> ServiceResult<Vec<RecipientDetail>> {
        AccessControl::new(self.db).authorize(user, Action::View, Resource::Event(event_id))?;
        recipient_details(self.db, event_id)
    }

    /// Apply a partial update to a recipient of `event_id`.
    pub fn update_recipient(
        &self,
        user: UserId,
        event_id: EventId,
        recipient_id: RecipientId,
        request: UpdateRecipientRequest,
    ) -> ServiceResult<Recipient> {
        self.recipient_of(event_id, recipient_id)?;
        AccessControl::new(self.db).authorize(
            user,
            Action::Update,
            Resource::Recipient(recipient_id),
        )?;

        let recipient = RecipientRepository::new(self.db).update(
            recipient_id,
            RecipientChanges {
                budget_limit: request.budget_limit,
                notes: request.notes,
            },
        )?;
        Ok(recipient.into())
    }

    /// Remove a recipient of `event_id` together with its gifts.
    pub fn remove_recipient(
        &self,
        user: UserId,
        event_id: EventId,
        recipient_id: RecipientId,
    ) -> ServiceResult<()> {
        self.recipient_of(event_id, recipient_id)?;
        AccessControl::new(self.db).authorize(
            user,
            Action::Delete,
            Resource::Recipient(recipient_id),
        )?;

        let gifts = RecipientRepository::new(self.db).delete(recipient_id)?;
        tracing::info!(recipient_id, event_id, user_id = user, gifts, "Recipient removed");
        Ok(())
    }

    pub fn create_gift(
        &self,
        user: UserId,
        recipient_id: RecipientId,
        request: CreateGiftRequest,
    ) -> ServiceResult<Gift> {
        AccessControl::new(self.db).authorize(
            user,
            Action::AddGift,
            Resource::Recipient(recipient_id),
        )?;
        require_non_blank("name", &request.name)?;

        let gift = GiftRepository::new(self.db).create(
            recipient_id,
            GiftFields {
                name: request.name.trim().to_string(),
                description: request.description,
                amount: request.amount,
                purchased: request.purchased,
                url: request.url,
            },
        )?;
        tracing::debug!(gift_id = gift.id, recipient_id, user_id = user, "Gift created");
        Ok(gift.into())
    }

    pub fn list_gifts(&self, user: UserId, recipient_id: RecipientId) -> ServiceResult<Vec<Gift>> {
        AccessControl::new(self.db).authorize(
            user,
            Action::View,
            Resource::Recipient(recipient_id),
        )?;

        Ok(GiftRepository::new(self.db)
            .list_for_recipient(recipient_id)?
            .into_iter()
            .map(Gift::from)
            .collect())
    }

    /// Apply a partial update to a gift.
    pub fn update_gift(
        &self,
        user: UserId,
        gift_id: GiftId,
        request: UpdateGiftRequest,
    ) -> ServiceResult<Gift> {
        AccessControl::new(self.db).authorize(user, Action::Update, Resource::Gift(gift_id))?;
        if let Some(name) = &request.name {
            require_non_blank("name", name)?;
        }

        let gift = GiftRepository::new(self.db).update(
            gift_id,
            GiftChanges {
                name: request.name.map(|n| n.trim().to_string()),
                description: request.description,
                amount: request.amount,
                purchased: request.purchased,
                url: request.url,
            },
        )?;
        Ok(gift.into())
    }

    pub fn delete_gift(&self, user: UserId, gift_id: GiftId) -> ServiceResult<()> {
        AccessControl::new(self.db).authorize(user, Action::Delete, Resource::Gift(gift_id))?;
        GiftRepository::new(self.db).delete(gift_id)?;
        tracing::debug!(gift_id, user_id = user, "Gift deleted");
        Ok(())
    }

    /// A recipient addressed through an event path must belong to that event.
    fn recipient_of(
        &self,
        event_id: EventId,
        recipient_id: RecipientId,
    ) -> ServiceResult<StoredRecipient> {
        RecipientRepository::new(self.db)
            .find(recipient_id)?
            .filter(|r| r.event_id == event_id)
            .ok_or_else(|| ServiceError::NotFound("Recipient not found".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access::Permission;
    use crate::storage::{
        ContactFields, EventFields, EventRepository, ShareKind, ShareRepository,
    };

    const ALICE: UserId = 1;
    const BOB: UserId = 2;

    struct Setup {
        db: Database,
        event: EventId,
        contact: u64,
    }

    fn setup() -> Setup {
        let db = Database::in_memory().unwrap();
        let event = EventRepository::new(&db)
            .create(
                ALICE,
                EventFields {
                    name: "Birthday".into(),
                    ..Default::default()
                },
            )
            .unwrap()
            .id;
        let contact = ContactRepository::new(&db)
            .create(
                ALICE,
                ContactFields {
                    name: "Sister".into(),
                    ..Default::default()
                },
            )
            .unwrap()
            .id;
        Setup { db, event, contact }
    }

    fn add(contact_id: u64) -> CreateRecipientRequest {
        CreateRecipientRequest {
            contact_id,
            budget_limit: 40.0,
            notes: None,
        }
    }

    fn gift(name: &str) -> CreateGiftRequest {
        CreateGiftRequest {
            name: name.into(),
            description: None,
            amount: 15.0,
            purchased: false,
            url: None,
        }
    }

    #[test]
    fn owner_plans_gifts() {
        let s = setup();
        let service = GiftService::new(&s.db);

        let recipient = service.add_recipient(ALICE, s.event, add(s.contact)).unwrap();
        assert_eq!(recipient.budget_limit, 40.0);

        let created = service.create_gift(ALICE, recipient.id, gift("Book")).unwrap();
        let updated = service
            .update_gift(
                ALICE,
                created.id,
                UpdateGiftRequest {
                    purchased: Some(true),
                    ..Default::default()
                },
            )
            .unwrap();
        assert!(updated.purchased);
        assert_eq!(updated.name, "Book");
        assert_eq!(updated.amount, 15.0);

        let listed = service.list_recipients(ALICE, s.event).unwrap();
        assert_eq!(listed[0].gifts, vec![updated]);

        let changed = service
            .update_recipient(
                ALICE,
                s.event,
                recipient.id,
                UpdateRecipientRequest {
                    notes: Some(Some("Likes sci-fi".into())),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(changed.budget_limit, 40.0);
        assert_eq!(changed.notes.as_deref(), Some("Likes sci-fi"));

        service.remove_recipient(ALICE, s.event, recipient.id).unwrap();
        assert!(service.list_recipients(ALICE, s.event).unwrap().is_empty());
        assert!(matches!(
            service.list_gifts(ALICE, recipient.id),
            Err(ServiceError::NotFound(_))
        ));
    }

    #[test]
    fn collaborators_cannot_add_recipients() {
        let s = setup();
        ShareRepository::new(&s.db)
            .upsert(ShareKind::Event, s.event, BOB, Permission::Admin)
            .unwrap();

        assert!(matches!(
            GiftService::new(&s.db).add_recipient(BOB, s.event, add(s.contact)),
            Err(ServiceError::Forbidden(_))
        ));
    }

    #[test]
    fn recipient_contact_must_belong_to_event_owner() {
        let s = setup();
        let bobs_contact = ContactRepository::new(&s.db)
            .create(
                BOB,
                ContactFields {
                    name: "Bob's friend".into(),
                    ..Default::default()
                },
            )
            .unwrap()
            .id;

        assert!(matches!(
            GiftService::new(&s.db).add_recipient(ALICE, s.event, add(bobs_contact)),
            Err(ServiceError::NotFound(msg)) if msg == "Contact not found"
        ));
    }

    #[test]
    fn write_grant_adds_gifts_but_cannot_delete() {
        let s = setup();
        let service = GiftService::new(&s.db);
        let recipient = service.add_recipient(ALICE, s.event, add(s.contact)).unwrap();

        let shares = ShareRepository::new(&s.db);
        shares
            .upsert(ShareKind::Event, s.event, BOB, Permission::Read)
            .unwrap();
        assert!(service.list_gifts(BOB, recipient.id).unwrap().is_empty());
        assert!(matches!(
            service.create_gift(BOB, recipient.id, gift("Scarf")),
            Err(ServiceError::Forbidden(_))
        ));

        shares
            .upsert(ShareKind::Event, s.event, BOB, Permission::Write)
            .unwrap();
        let scarf = service.create_gift(BOB, recipient.id, gift("Scarf")).unwrap();
        assert!(matches!(
            service.delete_gift(BOB, scarf.id),
            Err(ServiceError::Forbidden(_))
        ));
        assert!(matches!(
            service.remove_recipient(BOB, s.event, recipient.id),
            Err(ServiceError::Forbidden(_))
        ));

        service.delete_gift(ALICE, scarf.id).unwrap();
        assert!(service.list_gifts(ALICE, recipient.id).unwrap().is_empty());
    }

    #[test]
    fn recipient_must_match_event_path() {
        let s = setup();
        let service = GiftService::new(&s.db);
        let recipient = service.add_recipient(ALICE, s.event, add(s.contact)).unwrap();
        let other = EventRepository::new(&s.db)
            .create(
                ALICE,
                EventFields {
                    name: "Other".into(),
                    ..Default::default()
                },
            )
            .unwrap();

        assert!(matches!(
            service.remove_recipient(ALICE, other.id, recipient.id),
            Err(ServiceError::NotFound(msg)) if msg == "Recipient not found"
        ));
    }
}
