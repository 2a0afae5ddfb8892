// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Friend request endpoints.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::{
    auth::Auth,
    error::ApiError,
    models::{FriendRequest, FriendRequestCreate, FriendRequestId, UserProfile},
    service::{FriendResponse, FriendService},
    state::AppState,
};

/// Send a friend request by username.
#[utoipa::path(
    post,
    path = "/friends/request",
    tag = "Friends",
    security(("bearer_auth" = [])),
    request_body = FriendRequestCreate,
    responses(
        (status = 201, body = FriendRequest),
        (status = 400, description = "Cannot send friend request to yourself"),
        (status = 404, description = "User not found"),
        (status = 409, description = "Already friends or request pending")
    )
)]
pub async fn send_friend_request(
    Auth(user): Auth,
    State(state): State<AppState>,
    Json(request): Json<FriendRequestCreate>,
) -> Result<(StatusCode, Json<FriendRequest>), ApiError> {
    let created = FriendService::new(&state.db).send_request(user.user_id, &request.to_username)?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Pending requests addressed to the caller.
#[utoipa::path(
    get,
    path = "/friends/requests",
    tag = "Friends",
    security(("bearer_auth" = [])),
    responses((status = 200, body = [FriendRequest]))
)]
pub async fn list_friend_requests(
    Auth(user): Auth,
    State(state): State<AppState>,
) -> Result<Json<Vec<FriendRequest>>, ApiError> {
    Ok(Json(
        FriendService::new(&state.db).incoming_requests(user.user_id)?,
    ))
}

#[utoipa::path(
    post,
    path = "/friends/requests/{request_id}/accept",
    tag = "Friends",
    security(("bearer_auth" = [])),
    params(("request_id" = u64, Path, description = "Friend request identifier")),
    responses(
        (status = 200, body = FriendRequest),
        (status = 404, description = "Friend request not found")
    )
)]
pub async fn accept_friend_request(
    Auth(user): Auth,
    State(state): State<AppState>,
    Path(request_id): Path<FriendRequestId>,
) -> Result<Json<FriendRequest>, ApiError> {
    let request = FriendService::new(&state.db).respond(
        request_id,
        user.user_id,
        FriendResponse::Accept,
    )?;
    Ok(Json(request))
}

#[utoipa::path(
    post,
    path = "/friends/requests/{request_id}/reject",
    tag = "Friends",
    security(("bearer_auth" = [])),
    params(("request_id" = u64, Path, description = "Friend request identifier")),
    responses(
        (status = 200, body = FriendRequest),
        (status = 404, description = "Friend request not found")
    )
)]
pub async fn reject_friend_request(
    Auth(user): Auth,
    State(state): State<AppState>,
    Path(request_id): Path<FriendRequestId>,
) -> Result<Json<FriendRequest>, ApiError> {
    let request = FriendService::new(&state.db).respond(
        request_id,
        user.user_id,
        FriendResponse::Reject,
    )?;
    Ok(Json(request))
}

#[utoipa::path(
    get,
    path = "/friends",
    tag = "Friends",
    security(("bearer_auth" = [])),
    responses((status = 200, body = [UserProfile]))
)]
pub async fn list_friends(
    Auth(user): Auth,
    State(state): State<AppState>,
) -> Result<Json<Vec<UserProfile>>, ApiError> {
    Ok(Json(FriendService::new(&state.db).friends(user.user_id)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::AuthenticatedUser;
    use crate::storage::{FriendStatus, NewUser, UserRepository};

    fn signed_up(state: &AppState, username: &str) -> Auth {
        let user = UserRepository::new(&state.db)
            .create(NewUser {
                username: username.into(),
                email: format!("{username}@example.com"),
                full_name: None,
                password_hash: "unused".into(),
            })
            .unwrap();
        Auth(AuthenticatedUser {
            user_id: user.id,
            username: user.username,
            expires_at: 0,
        })
    }

    #[tokio::test]
    async fn request_accept_and_list() {
        let state = AppState::for_tests();
        let alice = signed_up(&state, "alice");
        let bob = signed_up(&state, "bob");
        let (alice_id, bob_id) = (alice.0.user_id, bob.0.user_id);

        let (status, Json(request)) = send_friend_request(
            alice,
            State(state.clone()),
            Json(FriendRequestCreate {
                to_username: "bob".into(),
            }),
        )
        .await
        .unwrap();
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(request.to_user_id, bob_id);

        let Json(pending) = list_friend_requests(signed_in(bob_id), State(state.clone()))
            .await
            .unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].from_user.id, alice_id);

        let Json(accepted) =
            accept_friend_request(signed_in(bob_id), State(state.clone()), Path(request.id))
                .await
                .unwrap();
        assert_eq!(accepted.status, FriendStatus::Accepted);

        let err = reject_friend_request(signed_in(bob_id), State(state.clone()), Path(request.id))
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::NOT_FOUND);

        let Json(friends) = list_friends(signed_in(alice_id), State(state))
            .await
            .unwrap();
        assert_eq!(friends.len(), 1);
        assert_eq!(friends[0].id, bob_id);
    }

    #[tokio::test]
    async fn duplicate_request_conflicts() {
        let state = AppState::for_tests();
        let alice = signed_up(&state, "alice");
        let bob = signed_up(&state, "bob");
        let alice_id = alice.0.user_id;

        let (status, _) = send_friend_request(
            alice,
            State(state.clone()),
            Json(FriendRequestCreate {
                to_username: "bob".into(),
            }),
        )
        .await
        .unwrap();
        assert_eq!(status, StatusCode::CREATED);

        let err = send_friend_request(
            bob,
            State(state.clone()),
            Json(FriendRequestCreate {
                to_username: "alice".into(),
            }),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status, StatusCode::CONFLICT);

        let err = send_friend_request(
            signed_in(alice_id),
            State(state),
            Json(FriendRequestCreate {
                to_username: "alice".into(),
            }),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
    }

    fn signed_in(user_id: u64) -> Auth {
        Auth(AuthenticatedUser {
            user_id,
            username: String::new(),
            expires_at: 0,
        })
    }
}
