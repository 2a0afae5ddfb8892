// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Event operations for owners and grantees.

use super::gifts::recipient_details;
use super::{require_non_blank, ServiceError, ServiceResult};
use crate::access::{AccessControl, Action, Resource};
use crate::models::{Event, EventDetail, EventId, EventRequest, Pagination, UserId};
use crate::storage::{
    AuditEvent, AuditEventType, Database, EventFields, EventRepository, ShareKind,
    ShareRepository,
};

impl From<EventRequest> for EventFields {
    fn from(request: EventRequest) -> Self {
        Self {
            name: request.name.trim().to_string(),
            date: request.date,
            description: request.description,
        }
    }
}

pub struct EventService<'a> {
    db: &'a Database,
}

impl<'a> EventService<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    pub fn create(&self, owner: UserId, request: EventRequest) -> ServiceResult<Event> {
        require_non_blank("name", &request.name)?;
        let event = EventRepository::new(self.db).create(owner, request.into())?;
        tracing::debug!(event_id = event.id, user_id = owner, "Event created");
        Ok(event.into())
    }

    /// Owned events by id, then events shared with `user` by id, then the
    /// page window.
    pub fn list(&self, user: UserId, page: Pagination) -> ServiceResult<Vec<Event>> {
        let repo = EventRepository::new(self.db);
        let mut events = repo.list_owned(user)?;

        let shared_ids: Vec<EventId> = ShareRepository::new(self.db)
            .shared_ids_for_user(ShareKind::Event, user)?
            .into_iter()
            .filter(|id| !events.iter().any(|e| e.id == *id))
            .collect();
        events.extend(repo.get_many(&shared_ids)?);

        Ok(page.apply(events).into_iter().map(Event::from).collect())
    }

    /// An event with its recipients, their contacts and gifts.
    pub fn detail(&self, user: UserId, event_id: EventId) -> ServiceResult<EventDetail> {
        AccessControl::new(self.db).authorize(user, Action::View, Resource::Event(event_id))?;

        let event = EventRepository::new(self.db)
            .find(event_id)?
            .ok_or_else(|| ServiceError::NotFound("Event not found".to_string()))?;

        Ok(EventDetail {
            event: event.into(),
            recipients: recipient_details(self.db, event_id)?,
        })
    }

    /// Replace every editable field of an event.
    pub fn update(
        &self,
        user: UserId,
        event_id: EventId,
        request: EventRequest,
    ) -> ServiceResult<Event> {
        AccessControl::new(self.db).authorize(user, Action::Update, Resource::Event(event_id))?;
        require_non_blank("name", &request.name)?;

        let event = EventRepository::new(self.db).update(event_id, request.into())?;
        Ok(event.into())
    }

    /// Delete an event with its recipients, their gifts and its grants.
    pub fn delete(&self, user: UserId, event_id: EventId) -> ServiceResult<()> {
        AccessControl::new(self.db).authorize(user, Action::Delete, Resource::Event(event_id))?;

        let cascade = EventRepository::new(self.db).delete(event_id)?;
        tracing::info!(
            event_id,
            user_id = user,
            recipients = cascade.recipients,
            gifts = cascade.gifts,
            grants = cascade.grants,
            "Event deleted"
        );
        crate::audit_log!(
            self.db,
            AuditEvent::new(AuditEventType::EventDeleted)
                .with_user(user)
                .with_resource("event", event_id)
                .with_details(serde_json::json!({
                    "recipients": cascade.recipients,
                    "gifts": cascade.gifts,
                    "grants": cascade.grants,
                }))
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access::Permission;
    use crate::storage::{
        ContactFields, ContactRepository, GiftFields, GiftRepository, NewRecipient,
        RecipientRepository,
    };

    const ALICE: UserId = 1;
    const BOB: UserId = 2;

    fn request(name: &str) -> EventRequest {
        EventRequest {
            name: name.into(),
            date: Some("2026-12-25".into()),
            description: None,
        }
    }

    #[test]
    fn detail_includes_recipients_and_gifts() {
        let db = Database::in_memory().unwrap();
        let events = EventService::new(&db);
        let event = events.create(ALICE, request("Christmas")).unwrap();

        let contact = ContactRepository::new(&db)
            .create(
                ALICE,
                ContactFields {
                    name: "Dad".into(),
                    ..Default::default()
                },
            )
            .unwrap();
        let recipient = RecipientRepository::new(&db)
            .create(
                event.id,
                NewRecipient {
                    contact_id: contact.id,
                    budget_limit: 50.0,
                    notes: None,
                },
            )
            .unwrap();
        GiftRepository::new(&db)
            .create(
                recipient.id,
                GiftFields {
                    name: "Socks".into(),
                    amount: 12.5,
                    ..Default::default()
                },
            )
            .unwrap();

        let detail = events.detail(ALICE, event.id).unwrap();
        assert_eq!(detail.event.name, "Christmas");
        assert_eq!(detail.recipients.len(), 1);
        assert_eq!(detail.recipients[0].contact.name, "Dad");
        assert_eq!(detail.recipients[0].gifts[0].name, "Socks");

        assert!(matches!(
            events.detail(BOB, event.id),
            Err(ServiceError::NotFound(_))
        ));
    }

    #[test]
    fn union_listing_and_regrant() {
        let db = Database::in_memory().unwrap();
        let events = EventService::new(&db);
        let e1 = events.create(ALICE, request("E1")).unwrap();
        let own = events.create(BOB, request("Bob's party")).unwrap();

        let shares = ShareRepository::new(&db);
        shares
            .upsert(ShareKind::Event, e1.id, BOB, Permission::Read)
            .unwrap();
        let listed: Vec<EventId> = events
            .list(BOB, Pagination::default())
            .unwrap()
            .iter()
            .map(|e| e.id)
            .collect();
        assert_eq!(listed, vec![own.id, e1.id]);

        shares
            .upsert(ShareKind::Event, e1.id, BOB, Permission::Write)
            .unwrap();
        let grants = shares.list(ShareKind::Event, e1.id).unwrap();
        assert_eq!(grants.len(), 1);
        assert_eq!(grants[0].permission, Permission::Write);

        let updated = events.update(BOB, e1.id, request("E1 renamed")).unwrap();
        assert_eq!(updated.name, "E1 renamed");
        assert!(matches!(
            events.delete(BOB, e1.id),
            Err(ServiceError::Forbidden(_))
        ));
    }

    #[test]
    fn owner_delete_clears_grants() {
        let db = Database::in_memory().unwrap();
        let events = EventService::new(&db);
        let event = events.create(ALICE, request("Wedding")).unwrap();
        let shares = ShareRepository::new(&db);
        shares
            .upsert(ShareKind::Event, event.id, BOB, Permission::Admin)
            .unwrap();

        events.delete(ALICE, event.id).unwrap();

        assert!(shares.list(ShareKind::Event, event.id).unwrap().is_empty());
        assert!(events.list(BOB, Pagination::default()).unwrap().is_empty());
        assert!(matches!(
            events.detail(ALICE, event.id),
            Err(ServiceError::NotFound(_))
        ));
    }
}
