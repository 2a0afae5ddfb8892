// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Contact operations for owners and grantees.

use super::{require_non_blank, ServiceError, ServiceResult};
use crate::access::{AccessControl, Action, Resource};
use crate::models::{Contact, ContactId, ContactRequest, Pagination, UserId};
use crate::storage::{
    AuditEventType, ContactFields, ContactRepository, Database, ShareKind, ShareRepository,
};

impl From<ContactRequest> for ContactFields {
    fn from(request: ContactRequest) -> Self {
        Self {
            name: request.name.trim().to_string(),
            email: request.email,
            phone: request.phone,
            notes: request.notes,
        }
    }
}

pub struct ContactService<'a> {
    db: &'a Database,
}

impl<'a> ContactService<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    pub fn create(&self, owner: UserId, request: ContactRequest) -> ServiceResult<Contact> {
        require_non_blank("name", &request.name)?;
        let contact = ContactRepository::new(self.db).create(owner, request.into())?;
        tracing::debug!(contact_id = contact.id, user_id = owner, "Contact created");
        Ok(contact.into())
    }

    /// Owned contacts by id, then contacts shared with `user` by id, then
    /// the page window.
    pub fn list(&self, user: UserId, page: Pagination) -> ServiceResult<Vec<Contact>> {
        let repo = ContactRepository::new(self.db);
        let mut contacts = repo.list_owned(user)?;

        let shared_ids: Vec<ContactId> = ShareRepository::new(self.db)
            .shared_ids_for_user(ShareKind::Contact, user)?
            .into_iter()
            .filter(|id| !contacts.iter().any(|c| c.id == *id))
            .collect();
        contacts.extend(repo.get_many(&shared_ids)?);

        Ok(page
            .apply(contacts)
            .into_iter()
            .map(Contact::from)
            .collect())
    }

    pub fn get(&self, user: UserId, contact_id: ContactId) -> ServiceResult<Contact> {
        AccessControl::new(self.db).authorize(user, Action::View, Resource::Contact(contact_id))?;
        ContactRepository::new(self.db)
            .find(contact_id)?
            .map(Contact::from)
            .ok_or_else(|| ServiceError::NotFound("Contact not found".to_string()))
    }

    /// Replace every editable field of a contact.
    pub fn update(
        &self,
        user: UserId,
        contact_id: ContactId,
        request: ContactRequest,
    ) -> ServiceResult<Contact> {
        AccessControl::new(self.db)
            .authorize(user, Action::Update, Resource::Contact(contact_id))?;
        require_non_blank("name", &request.name)?;

        let contact = ContactRepository::new(self.db).update(contact_id, request.into())?;
        Ok(contact.into())
    }

    /// Delete a contact and every grant on it.
    pub fn delete(&self, user: UserId, contact_id: ContactId) -> ServiceResult<()> {
        AccessControl::new(self.db)
            .authorize(user, Action::Delete, Resource::Contact(contact_id))?;

        let grants = ContactRepository::new(self.db).delete(contact_id)?;
        tracing::info!(contact_id, user_id = user, grants, "Contact deleted");
        crate::audit_log!(
            self.db,
            AuditEventType::ContactDeleted,
            user,
            "contact",
            contact_id
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access::Permission;
    use crate::storage::{EventFields, EventRepository, NewRecipient, RecipientRepository};

    const ALICE: UserId = 1;
    const BOB: UserId = 2;

    fn request(name: &str) -> ContactRequest {
        ContactRequest {
            name: name.into(),
            email: None,
            phone: None,
            notes: None,
        }
    }

    #[test]
    fn listing_puts_owned_before_shared() {
        let db = Database::in_memory().unwrap();
        let contacts = ContactService::new(&db);

        let bobs_first = contacts.create(BOB, request("Bob's uncle")).unwrap();
        let alices = contacts.create(ALICE, request("Alice's aunt")).unwrap();
        let bobs_second = contacts.create(BOB, request("Bob's cousin")).unwrap();

        let shares = ShareRepository::new(&db);
        shares
            .upsert(ShareKind::Contact, alices.id, BOB, Permission::Read)
            .unwrap();

        let listed: Vec<ContactId> = contacts
            .list(BOB, Pagination::default())
            .unwrap()
            .iter()
            .map(|c| c.id)
            .collect();
        assert_eq!(listed, vec![bobs_first.id, bobs_second.id, alices.id]);

        let page: Vec<ContactId> = contacts
            .list(BOB, Pagination { skip: 1, limit: 1 })
            .unwrap()
            .iter()
            .map(|c| c.id)
            .collect();
        assert_eq!(page, vec![bobs_second.id]);

        assert_eq!(contacts.list(ALICE, Pagination::default()).unwrap().len(), 1);
    }

    #[test]
    fn grant_level_gates_mutation() {
        let db = Database::in_memory().unwrap();
        let contacts = ContactService::new(&db);
        let contact = contacts.create(ALICE, request("Mom")).unwrap();

        assert!(matches!(
            contacts.get(BOB, contact.id),
            Err(ServiceError::NotFound(_))
        ));

        let shares = ShareRepository::new(&db);
        shares
            .upsert(ShareKind::Contact, contact.id, BOB, Permission::Read)
            .unwrap();
        assert_eq!(contacts.get(BOB, contact.id).unwrap().name, "Mom");
        assert!(matches!(
            contacts.update(BOB, contact.id, request("Mother")),
            Err(ServiceError::Forbidden(_))
        ));

        shares
            .upsert(ShareKind::Contact, contact.id, BOB, Permission::Write)
            .unwrap();
        let updated = contacts.update(BOB, contact.id, request("Mother")).unwrap();
        assert_eq!(updated.name, "Mother");
        assert_eq!(updated.user_id, ALICE);
        assert!(matches!(
            contacts.delete(BOB, contact.id),
            Err(ServiceError::Forbidden(_))
        ));

        shares
            .upsert(ShareKind::Contact, contact.id, BOB, Permission::Admin)
            .unwrap();
        contacts.delete(BOB, contact.id).unwrap();
        assert!(matches!(
            contacts.get(ALICE, contact.id),
            Err(ServiceError::NotFound(_))
        ));
        assert!(shares
            .list(ShareKind::Contact, contact.id)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn referenced_contact_cannot_be_deleted() {
        let db = Database::in_memory().unwrap();
        let contacts = ContactService::new(&db);
        let contact = contacts.create(ALICE, request("Dad")).unwrap();
        let event = EventRepository::new(&db)
            .create(
                ALICE,
                EventFields {
                    name: "Father's Day".into(),
                    ..Default::default()
                },
            )
            .unwrap();
        RecipientRepository::new(&db)
            .create(
                event.id,
                NewRecipient {
                    contact_id: contact.id,
                    budget_limit: 0.0,
                    notes: None,
                },
            )
            .unwrap();

        assert!(matches!(
            contacts.delete(ALICE, contact.id),
            Err(ServiceError::Conflict(_))
        ));
    }

    #[test]
    fn blank_name_is_rejected() {
        let db = Database::in_memory().unwrap();
        assert!(matches!(
            ContactService::new(&db).create(ALICE, request(" ")),
            Err(ServiceError::InvalidOperation(_))
        ));
    }
}
