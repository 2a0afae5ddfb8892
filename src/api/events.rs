// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Event endpoints, including sharing and event recipients.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use crate::{
    auth::Auth,
    error::ApiError,
    models::{
        CreateRecipientRequest, Event, EventDetail, EventId, EventRequest, Pagination, Recipient,
        RecipientDetail, RecipientId, ShareGrant, ShareRequest, ShareResponse,
        UpdateRecipientRequest, UserId,
    },
    service::{EventService, GiftService, SharingService},
    state::AppState,
    storage::ShareKind,
};

#[utoipa::path(
    post,
    path = "/events",
    tag = "Events",
    security(("bearer_auth" = [])),
    request_body = EventRequest,
    responses(
        (status = 201, description = "Event created", body = Event),
        (status = 400, description = "Name is blank")
    )
)]
pub async fn create_event(
    Auth(user): Auth,
    State(state): State<AppState>,
    Json(request): Json<EventRequest>,
) -> Result<(StatusCode, Json<Event>), ApiError> {
    let event = EventService::new(&state.db).create(user.user_id, request)?;
    Ok((StatusCode::CREATED, Json(event)))
}

/// List owned events followed by events shared with the caller.
#[utoipa::path(
    get,
    path = "/events",
    tag = "Events",
    security(("bearer_auth" = [])),
    params(Pagination),
    responses((status = 200, body = [Event]))
)]
pub async fn list_events(
    Auth(user): Auth,
    State(state): State<AppState>,
    Query(page): Query<Pagination>,
) -> Result<Json<Vec<Event>>, ApiError> {
    Ok(Json(EventService::new(&state.db).list(user.user_id, page)?))
}

/// Event with its recipients, their contacts and gifts.
#[utoipa::path(
    get,
    path = "/events/{event_id}",
    tag = "Events",
    security(("bearer_auth" = [])),
    params(("event_id" = u64, Path, description = "Event identifier")),
    responses(
        (status = 200, body = EventDetail),
        (status = 404, description = "Event not found")
    )
)]
pub async fn get_event(
    Auth(user): Auth,
    State(state): State<AppState>,
    Path(event_id): Path<EventId>,
) -> Result<Json<EventDetail>, ApiError> {
    Ok(Json(EventService::new(&state.db).detail(user.user_id, event_id)?))
}

#[utoipa::path(
    put,
    path = "/events/{event_id}",
    tag = "Events",
    security(("bearer_auth" = [])),
    params(("event_id" = u64, Path, description = "Event identifier")),
    request_body = EventRequest,
    responses(
        (status = 200, body = Event),
        (status = 403, description = "Grant does not allow editing"),
        (status = 404, description = "Event not found")
    )
)]
pub async fn update_event(
    Auth(user): Auth,
    State(state): State<AppState>,
    Path(event_id): Path<EventId>,
    Json(request): Json<EventRequest>,
) -> Result<Json<Event>, ApiError> {
    Ok(Json(
        EventService::new(&state.db).update(user.user_id, event_id, request)?,
    ))
}

/// Delete an event with its recipients, gifts and grants.
#[utoipa::path(
    delete,
    path = "/events/{event_id}",
    tag = "Events",
    security(("bearer_auth" = [])),
    params(("event_id" = u64, Path, description = "Event identifier")),
    responses(
        (status = 204),
        (status = 403, description = "Grant does not allow deleting"),
        (status = 404, description = "Event not found")
    )
)]
pub async fn delete_event(
    Auth(user): Auth,
    State(state): State<AppState>,
    Path(event_id): Path<EventId>,
) -> Result<StatusCode, ApiError> {
    EventService::new(&state.db).delete(user.user_id, event_id)?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/events/{event_id}/share",
    tag = "Sharing",
    security(("bearer_auth" = [])),
    params(("event_id" = u64, Path, description = "Event identifier")),
    request_body = ShareRequest,
    responses(
        (status = 200, body = ShareResponse),
        (status = 400, description = "Target is not a friend"),
        (status = 403, description = "Only the owner can share"),
        (status = 404, description = "Event not found")
    )
)]
pub async fn share_event(
    Auth(user): Auth,
    State(state): State<AppState>,
    Path(event_id): Path<EventId>,
    Json(request): Json<ShareRequest>,
) -> Result<Json<ShareResponse>, ApiError> {
    let response = SharingService::new(&state.db).share(
        ShareKind::Event,
        event_id,
        user.user_id,
        request.shared_with_user_id,
        request.permission,
    )?;
    Ok(Json(response))
}

#[utoipa::path(
    get,
    path = "/events/{event_id}/shares",
    tag = "Sharing",
    security(("bearer_auth" = [])),
    params(("event_id" = u64, Path, description = "Event identifier")),
    responses(
        (status = 200, body = [ShareGrant]),
        (status = 403, description = "Only the owner can list grants"),
        (status = 404, description = "Event not found")
    )
)]
pub async fn list_event_shares(
    Auth(user): Auth,
    State(state): State<AppState>,
    Path(event_id): Path<EventId>,
) -> Result<Json<Vec<ShareGrant>>, ApiError> {
    let grants =
        SharingService::new(&state.db).list_grants(ShareKind::Event, event_id, user.user_id)?;
    Ok(Json(grants))
}

#[utoipa::path(
    delete,
    path = "/events/{event_id}/share/{user_id}",
    tag = "Sharing",
    security(("bearer_auth" = [])),
    params(
        ("event_id" = u64, Path, description = "Event identifier"),
        ("user_id" = u64, Path, description = "User whose grant is revoked")
    ),
    responses(
        (status = 204),
        (status = 403, description = "Only the owner can unshare"),
        (status = 404, description = "Event not found")
    )
)]
pub async fn unshare_event(
    Auth(user): Auth,
    State(state): State<AppState>,
    Path((event_id, target)): Path<(EventId, UserId)>,
) -> Result<StatusCode, ApiError> {
    SharingService::new(&state.db).unshare(ShareKind::Event, event_id, user.user_id, target)?;
    Ok(StatusCode::NO_CONTENT)
}

/// Add one of the owner's contacts to an event. Owner only.
#[utoipa::path(
    post,
    path = "/events/{event_id}/recipients",
    tag = "Recipients",
    security(("bearer_auth" = [])),
    params(("event_id" = u64, Path, description = "Event identifier")),
    request_body = CreateRecipientRequest,
    responses(
        (status = 201, body = Recipient),
        (status = 403, description = "Only the event owner can add recipients"),
        (status = 404, description = "Event or contact not found")
    )
)]
pub async fn add_recipient(
    Auth(user): Auth,
    State(state): State<AppState>,
    Path(event_id): Path<EventId>,
    Json(request): Json<CreateRecipientRequest>,
) -> Result<(StatusCode, Json<Recipient>), ApiError> {
    let recipient = GiftService::new(&state.db).add_recipient(user.user_id, event_id, request)?;
    Ok((StatusCode::CREATED, Json(recipient)))
}

#[utoipa::path(
    get,
    path = "/events/{event_id}/recipients",
    tag = "Recipients",
    security(("bearer_auth" = [])),
    params(("event_id" = u64, Path, description = "Event identifier")),
    responses(
        (status = 200, body = [RecipientDetail]),
        (status = 404, description = "Event not found")
    )
)]
pub async fn list_recipients(
    Auth(user): Auth,
    State(state): State<AppState>,
    Path(event_id): Path<EventId>,
) -> Result<Json<Vec<RecipientDetail>>, ApiError> {
    Ok(Json(
        GiftService::new(&state.db).list_recipients(user.user_id, event_id)?,
    ))
}

/// Partially update a recipient's budget or notes.
#[utoipa::path(
    put,
    path = "/events/{event_id}/recipients/{recipient_id}",
    tag = "Recipients",
    security(("bearer_auth" = [])),
    params(
        ("event_id" = u64, Path, description = "Event identifier"),
        ("recipient_id" = u64, Path, description = "Recipient identifier")
    ),
    request_body = UpdateRecipientRequest,
    responses(
        (status = 200, body = Recipient),
        (status = 403, description = "Grant does not allow editing"),
        (status = 404, description = "Recipient not found")
    )
)]
pub async fn update_recipient(
    Auth(user): Auth,
    State(state): State<AppState>,
    Path((event_id, recipient_id)): Path<(EventId, RecipientId)>,
    Json(request): Json<UpdateRecipientRequest>,
) -> Result<Json<Recipient>, ApiError> {
    let recipient = GiftService::new(&state.db).update_recipient(
        user.user_id,
        event_id,
        recipient_id,
        request,
    )?;
    Ok(Json(recipient))
}

#[utoipa::path(
    delete,
    path = "/events/{event_id}/recipients/{recipient_id}",
    tag = "Recipients",
    security(("bearer_auth" = [])),
    params(
        ("event_id" = u64, Path, description = "Event identifier"),
        ("recipient_id" = u64, Path, description = "Recipient identifier")
    ),
    responses(
        (status = 204),
        (status = 403, description = "Grant does not allow deleting"),
        (status = 404, description = "Recipient not found")
    )
)]
pub async fn remove_recipient(
    Auth(user): Auth,
    State(state): State<AppState>,
    Path((event_id, recipient_id)): Path<(EventId, RecipientId)>,
) -> Result<StatusCode, ApiError> {
    GiftService::new(&state.db).remove_recipient(user.user_id, event_id, recipient_id)?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::AuthenticatedUser;
    use crate::models::ContactRequest;
    use crate::service::ContactService;

    fn auth(user_id: UserId) -> Auth {
        Auth(AuthenticatedUser {
            user_id,
            username: format!("user{user_id}"),
            expires_at: 0,
        })
    }

    fn event_request(name: &str) -> EventRequest {
        EventRequest {
            name: name.into(),
            date: None,
            description: Some("Family dinner".into()),
        }
    }

    #[tokio::test]
    async fn event_lifecycle() {
        let state = AppState::for_tests();

        let (status, Json(event)) =
            create_event(auth(1), State(state.clone()), Json(event_request("Birthday")))
                .await
                .unwrap();
        assert_eq!(status, StatusCode::CREATED);

        let contact = ContactService::new(&state.db)
            .create(
                1,
                ContactRequest {
                    name: "Grandpa".into(),
                    email: None,
                    phone: None,
                    notes: None,
                },
            )
            .unwrap();

        let (status, Json(recipient)) = add_recipient(
            auth(1),
            State(state.clone()),
            Path(event.id),
            Json(CreateRecipientRequest {
                contact_id: contact.id,
                budget_limit: 25.0,
                notes: None,
            }),
        )
        .await
        .unwrap();
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(recipient.event_id, event.id);

        let Json(detail) = get_event(auth(1), State(state.clone()), Path(event.id))
            .await
            .unwrap();
        assert_eq!(detail.recipients.len(), 1);
        assert_eq!(detail.recipients[0].contact, contact);

        let Json(updated) = update_recipient(
            auth(1),
            State(state.clone()),
            Path((event.id, recipient.id)),
            Json(UpdateRecipientRequest {
                budget_limit: Some(30.0),
                notes: None,
            }),
        )
        .await
        .unwrap();
        assert_eq!(updated.budget_limit, 30.0);

        let status = delete_event(auth(1), State(state.clone()), Path(event.id))
            .await
            .unwrap();
        assert_eq!(status, StatusCode::NO_CONTENT);

        let err = list_recipients(auth(1), State(state), Path(event.id))
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn unknown_event_is_not_found() {
        let state = AppState::for_tests();
        let err = get_event(auth(1), State(state.clone()), Path(77))
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::NOT_FOUND);
        assert_eq!(err.message, "Event not found");

        let err = list_event_shares(auth(1), State(state), Path(77))
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::NOT_FOUND);
    }
}
