// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Friend request lifecycle.
//!
//! A pair of users is linked by at most one request at a time. Only the
//! addressee of a pending request may answer it; accepted and rejected are
//! terminal.

use super::{ServiceError, ServiceResult};
use crate::models::{FriendRequest, FriendRequestId, UserId, UserProfile};
use crate::storage::{
    AuditEventType, Database, FriendRepository, FriendStatus, PairInsert, StoredFriendRequest,
    UserRepository,
};

/// How the addressee answers a friend request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FriendResponse {
    Accept,
    Reject,
}

impl FriendResponse {
    fn status(self) -> FriendStatus {
        match self {
            FriendResponse::Accept => FriendStatus::Accepted,
            FriendResponse::Reject => FriendStatus::Rejected,
        }
    }

    fn audit_event(self) -> AuditEventType {
        match self {
            FriendResponse::Accept => AuditEventType::FriendRequestAccepted,
            FriendResponse::Reject => AuditEventType::FriendRequestRejected,
        }
    }
}

pub struct FriendService<'a> {
    db: &'a Database,
}

impl<'a> FriendService<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Send a friend request from `from` to the user named `to_username`.
    pub fn send_request(&self, from: UserId, to_username: &str) -> ServiceResult<FriendRequest> {
        let users = UserRepository::new(self.db);
        let to_user = users
            .find_by_username(to_username)?
            .ok_or_else(|| ServiceError::NotFound("User not found".to_string()))?;

        if to_user.id == from {
            return Err(ServiceError::InvalidOperation(
                "Cannot send friend request to yourself".to_string(),
            ));
        }

        let request = match FriendRepository::new(self.db).insert_pending(from, to_user.id)? {
            PairInsert::Created(request) => request,
            PairInsert::Existing(existing) if existing.status == FriendStatus::Accepted => {
                return Err(ServiceError::Conflict("Already friends".to_string()));
            }
            PairInsert::Existing(_) => {
                return Err(ServiceError::Conflict(
                    "Friend request already exists".to_string(),
                ));
            }
        };

        tracing::info!(
            request_id = request.id,
            from_user_id = from,
            to_user_id = to_user.id,
            "Friend request sent"
        );
        crate::audit_log!(
            self.db,
            AuditEventType::FriendRequestSent,
            from,
            "friend_request",
            request.id
        );

        let sender = users.get(from)?;
        Ok(FriendRequest::new(request, sender.into()))
    }

    /// Accept or reject a pending request addressed to `responder`.
    pub fn respond(
        &self,
        request_id: FriendRequestId,
        responder: UserId,
        response: FriendResponse,
    ) -> ServiceResult<FriendRequest> {
        let request = FriendRepository::new(self.db)
            .respond(request_id, responder, response.status())?
            .ok_or_else(|| ServiceError::NotFound("Friend request not found".to_string()))?;

        tracing::info!(
            request_id,
            user_id = responder,
            status = ?request.status,
            "Friend request answered"
        );
        crate::audit_log!(
            self.db,
            response.audit_event(),
            responder,
            "friend_request",
            request_id
        );

        self.with_sender(request)
    }

    /// Pending requests addressed to `user`, oldest first.
    pub fn incoming_requests(&self, user: UserId) -> ServiceResult<Vec<FriendRequest>> {
        FriendRepository::new(self.db)
            .list_involving(user)?
            .into_iter()
            .filter(|r| r.to_user_id == user && r.status == FriendStatus::Pending)
            .map(|r| self.with_sender(r))
            .collect()
    }

    /// Users joined to `user` by an accepted request.
    pub fn friends(&self, user: UserId) -> ServiceResult<Vec<UserProfile>> {
        let friend_ids: Vec<UserId> = FriendRepository::new(self.db)
            .list_involving(user)?
            .into_iter()
            .filter(|r| r.status == FriendStatus::Accepted)
            .map(|r| r.other_side(user))
            .collect();

        Ok(UserRepository::new(self.db)
            .get_many(&friend_ids)?
            .into_iter()
            .map(UserProfile::from)
            .collect())
    }

    /// Whether an accepted request links `a` and `b` in either direction.
    pub fn is_friend(&self, a: UserId, b: UserId) -> ServiceResult<bool> {
        Ok(FriendRepository::new(self.db)
            .between(a, b)?
            .is_some_and(|r| r.status == FriendStatus::Accepted))
    }

    fn with_sender(&self, request: StoredFriendRequest) -> ServiceResult<FriendRequest> {
        let sender = UserRepository::new(self.db).get(request.from_user_id)?;
        Ok(FriendRequest::new(request, sender.into()))
    }
}
