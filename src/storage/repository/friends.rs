// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Friend request repository.
//!
//! At most one request exists per unordered pair of users. The
//! `friend_pairs` table is keyed on `(low id, high id)` and points at that
//! request; `friend_links` lists request ids per user for both parties.

use chrono::{DateTime, Utc};
use redb::{ReadableTable, WriteTransaction};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::super::database::{children_of, next_id, read_record, tables, write_record};
use super::super::{Database, StorageResult};
use crate::models::{FriendRequestId, UserId};

/// Friend request lifecycle state.
///
/// `Accepted` and `Rejected` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum FriendStatus {
    Pending,
    Accepted,
    Rejected,
}

impl FriendStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, FriendStatus::Pending)
    }
}

/// Friend request stored in the planner database.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct StoredFriendRequest {
    pub id: FriendRequestId,
    pub from_user_id: UserId,
    pub to_user_id: UserId,
    pub status: FriendStatus,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub responded_at: Option<DateTime<Utc>>,
}

impl StoredFriendRequest {
    /// The party on the other side of this request from `user_id`.
    pub fn other_side(&self, user_id: UserId) -> UserId {
        if self.to_user_id == user_id {
            self.from_user_id
        } else {
            self.to_user_id
        }
    }
}

/// Result of trying to open a request between two users.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PairInsert {
    /// A new pending request was stored.
    Created(StoredFriendRequest),
    /// A pending or accepted request already links the pair.
    Existing(StoredFriendRequest),
}

fn pair_key(a: UserId, b: UserId) -> (u64, u64) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

/// Repository for friend request operations.
pub struct FriendRepository<'a> {
    db: &'a Database,
}

impl<'a> FriendRepository<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Get a request by ID, `None` if absent.
    pub fn find(&self, request_id: FriendRequestId) -> StorageResult<Option<StoredFriendRequest>> {
        let txn = self.db.read()?;
        let table = txn.open_table(tables::FRIEND_REQUESTS)?;
        read_record(&table, request_id)
    }

    /// The request currently linking two users, in either direction.
    pub fn between(&self, a: UserId, b: UserId) -> StorageResult<Option<StoredFriendRequest>> {
        let txn = self.db.read()?;
        let pairs = txn.open_table(tables::FRIEND_PAIRS)?;
        let Some(request_id) = pairs.get(pair_key(a, b))?.map(|v| v.value()) else {
            return Ok(None);
        };
        let table = txn.open_table(tables::FRIEND_REQUESTS)?;
        read_record(&table, request_id)
    }

    /// Create a pending request `from → to` unless the pair is already
    /// linked by a pending or accepted request.
    ///
    /// A rejected request for the pair is replaced by the new one.
    pub fn insert_pending(&self, from: UserId, to: UserId) -> StorageResult<PairInsert> {
        let key = pair_key(from, to);
        let txn = self.db.write()?;

        let existing_id = {
            let pairs = txn.open_table(tables::FRIEND_PAIRS)?;
            let id = pairs.get(key)?.map(|v| v.value());
            id
        };

        if let Some(existing_id) = existing_id {
            let existing: Option<StoredFriendRequest> = {
                let table = txn.open_table(tables::FRIEND_REQUESTS)?;
                read_record(&table, existing_id)?
            };
            match existing {
                Some(request) if request.status != FriendStatus::Rejected => {
                    return Ok(PairInsert::Existing(request));
                }
                Some(request) => remove_request(&txn, &request)?,
                None => {}
            }
        }

        let request = StoredFriendRequest {
            id: next_id(&txn, "friend_requests")?,
            from_user_id: from,
            to_user_id: to,
            status: FriendStatus::Pending,
            created_at: Utc::now(),
            responded_at: None,
        };
        {
            let mut table = txn.open_table(tables::FRIEND_REQUESTS)?;
            write_record(&mut table, request.id, &request)?;
            let mut pairs = txn.open_table(tables::FRIEND_PAIRS)?;
            pairs.insert(key, request.id)?;
            let mut links = txn.open_table(tables::FRIEND_LINKS)?;
            links.insert((from, request.id), ())?;
            links.insert((to, request.id), ())?;
        }
        txn.commit()?;
        Ok(PairInsert::Created(request))
    }

    /// Move a pending request addressed to `responder` into `status`.
    ///
    /// Returns `None` when no such pending request exists.
    pub fn respond(
        &self,
        request_id: FriendRequestId,
        responder: UserId,
        status: FriendStatus,
    ) -> StorageResult<Option<StoredFriendRequest>> {
        let txn = self.db.write()?;
        let updated = {
            let mut table = txn.open_table(tables::FRIEND_REQUESTS)?;
            let current: Option<StoredFriendRequest> = read_record(&table, request_id)?;
            match current {
                Some(mut request)
                    if request.to_user_id == responder && !request.status.is_terminal() =>
                {
                    request.status = status;
                    request.responded_at = Some(Utc::now());
                    write_record(&mut table, request.id, &request)?;
                    Some(request)
                }
                _ => None,
            }
        };
        if updated.is_some() {
            txn.commit()?;
        }
        Ok(updated)
    }

    /// Every request (any status) the user takes part in, oldest first.
    pub fn list_involving(&self, user_id: UserId) -> StorageResult<Vec<StoredFriendRequest>> {
        let txn = self.db.read()?;
        let links = txn.open_table(tables::FRIEND_LINKS)?;
        let table = txn.open_table(tables::FRIEND_REQUESTS)?;

        let mut requests = Vec::new();
        for request_id in children_of(&links, user_id)? {
            if let Some(request) = read_record::<StoredFriendRequest, _>(&table, request_id)? {
                requests.push(request);
            }
        }
        Ok(requests)
    }
}

/// Drop a request together with its pair and link rows.
fn remove_request(txn: &WriteTransaction, request: &StoredFriendRequest) -> StorageResult<()> {
    let mut table = txn.open_table(tables::FRIEND_REQUESTS)?;
    table.remove(request.id)?;
    let mut pairs = txn.open_table(tables::FRIEND_PAIRS)?;
    pairs.remove(pair_key(request.from_user_id, request.to_user_id))?;
    let mut links = txn.open_table(tables::FRIEND_LINKS)?;
    links.remove((request.from_user_id, request.id))?;
    links.remove((request.to_user_id, request.id))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn created(outcome: PairInsert) -> StoredFriendRequest {
        match outcome {
            PairInsert::Created(request) => request,
            PairInsert::Existing(request) => panic!("expected new request, got {request:?}"),
        }
    }

    #[test]
    fn insert_pending_links_both_users() {
        let db = Database::in_memory().unwrap();
        let repo = FriendRepository::new(&db);

        let request = created(repo.insert_pending(1, 2).unwrap());
        assert_eq!(request.status, FriendStatus::Pending);

        assert_eq!(repo.list_involving(1).unwrap(), vec![request.clone()]);
        assert_eq!(repo.list_involving(2).unwrap(), vec![request.clone()]);
        assert_eq!(repo.between(2, 1).unwrap(), Some(request));
    }

    #[test]
    fn pair_is_unordered() {
        let db = Database::in_memory().unwrap();
        let repo = FriendRepository::new(&db);

        let first = created(repo.insert_pending(1, 2).unwrap());
        let second = repo.insert_pending(2, 1).unwrap();
        assert_eq!(second, PairInsert::Existing(first));
    }

    #[test]
    fn respond_only_by_recipient_and_only_once() {
        let db = Database::in_memory().unwrap();
        let repo = FriendRepository::new(&db);
        let request = created(repo.insert_pending(1, 2).unwrap());

        // Sender cannot answer their own request
        assert!(repo.respond(request.id, 1, FriendStatus::Accepted).unwrap().is_none());

        let accepted = repo.respond(request.id, 2, FriendStatus::Accepted).unwrap().unwrap();
        assert_eq!(accepted.status, FriendStatus::Accepted);
        assert!(accepted.responded_at.is_some());

        // Terminal state
        assert!(repo.respond(request.id, 2, FriendStatus::Rejected).unwrap().is_none());
        assert_eq!(repo.find(request.id).unwrap().unwrap().status, FriendStatus::Accepted);
    }

    #[test]
    fn rejected_request_is_replaced() {
        let db = Database::in_memory().unwrap();
        let repo = FriendRepository::new(&db);
        let request = created(repo.insert_pending(1, 2).unwrap());
        repo.respond(request.id, 2, FriendStatus::Rejected).unwrap().unwrap();

        let retry = created(repo.insert_pending(2, 1).unwrap());
        assert_ne!(retry.id, request.id);
        assert!(repo.find(request.id).unwrap().is_none());
        assert_eq!(repo.list_involving(1).unwrap(), vec![retry.clone()]);
        assert_eq!(repo.between(1, 2).unwrap(), Some(retry));
    }
}
