// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Gift endpoints.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::{
    auth::Auth,
    error::ApiError,
    models::{CreateGiftRequest, Gift, GiftId, RecipientId, UpdateGiftRequest},
    service::GiftService,
    state::AppState,
};

/// Plan a gift for a recipient. Requires ownership or a write grant on the event.
#[utoipa::path(
    post,
    path = "/recipients/{recipient_id}/gifts",
    tag = "Gifts",
    security(("bearer_auth" = [])),
    params(("recipient_id" = u64, Path, description = "Recipient identifier")),
    request_body = CreateGiftRequest,
    responses(
        (status = 201, body = Gift),
        (status = 403, description = "Grant does not allow adding gifts"),
        (status = 404, description = "Recipient not found")
    )
)]
pub async fn create_gift(
    Auth(user): Auth,
    State(state): State<AppState>,
    Path(recipient_id): Path<RecipientId>,
    Json(request): Json<CreateGiftRequest>,
) -> Result<(StatusCode, Json<Gift>), ApiError> {
    let gift = GiftService::new(&state.db).create_gift(user.user_id, recipient_id, request)?;
    Ok((StatusCode::CREATED, Json(gift)))
}

#[utoipa::path(
    get,
    path = "/recipients/{recipient_id}/gifts",
    tag = "Gifts",
    security(("bearer_auth" = [])),
    params(("recipient_id" = u64, Path, description = "Recipient identifier")),
    responses(
        (status = 200, body = [Gift]),
        (status = 404, description = "Recipient not found")
    )
)]
pub async fn list_gifts(
    Auth(user): Auth,
    State(state): State<AppState>,
    Path(recipient_id): Path<RecipientId>,
) -> Result<Json<Vec<Gift>>, ApiError> {
    Ok(Json(
        GiftService::new(&state.db).list_gifts(user.user_id, recipient_id)?,
    ))
}

/// Partially update a gift.
#[utoipa::path(
    put,
    path = "/gifts/{gift_id}",
    tag = "Gifts",
    security(("bearer_auth" = [])),
    params(("gift_id" = u64, Path, description = "Gift identifier")),
    request_body = UpdateGiftRequest,
    responses(
        (status = 200, body = Gift),
        (status = 403, description = "Grant does not allow editing"),
        (status = 404, description = "Gift not found")
    )
)]
pub async fn update_gift(
    Auth(user): Auth,
    State(state): State<AppState>,
    Path(gift_id): Path<GiftId>,
    Json(request): Json<UpdateGiftRequest>,
) -> Result<Json<Gift>, ApiError> {
    Ok(Json(
        GiftService::new(&state.db).update_gift(user.user_id, gift_id, request)?,
    ))
}

#[utoipa::path(
    delete,
    path = "/gifts/{gift_id}",
    tag = "Gifts",
    security(("bearer_auth" = [])),
    params(("gift_id" = u64, Path, description = "Gift identifier")),
    responses(
        (status = 204),
        (status = 403, description = "Grant does not allow deleting"),
        (status = 404, description = "Gift not found")
    )
)]
pub async fn delete_gift(
    Auth(user): Auth,
    State(state): State<AppState>,
    Path(gift_id): Path<GiftId>,
) -> Result<StatusCode, ApiError> {
    GiftService::new(&state.db).delete_gift(user.user_id, gift_id)?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::AuthenticatedUser;
    use crate::storage::{
        ContactFields, ContactRepository, EventFields, EventRepository, NewRecipient,
        RecipientRepository,
    };

    fn auth(user_id: u64) -> Auth {
        Auth(AuthenticatedUser {
            user_id,
            username: format!("user{user_id}"),
            expires_at: 0,
        })
    }

    fn recipient_for(state: &AppState, owner: u64) -> RecipientId {
        let event = EventRepository::new(&state.db)
            .create(
                owner,
                EventFields {
                    name: "Graduation".into(),
                    ..Default::default()
                },
            )
            .unwrap();
        let contact = ContactRepository::new(&state.db)
            .create(
                owner,
                ContactFields {
                    name: "Nephew".into(),
                    ..Default::default()
                },
            )
            .unwrap();
        RecipientRepository::new(&state.db)
            .create(
                event.id,
                NewRecipient {
                    contact_id: contact.id,
                    budget_limit: 100.0,
                    notes: None,
                },
            )
            .unwrap()
            .id
    }

    fn gift_request(name: &str) -> CreateGiftRequest {
        CreateGiftRequest {
            name: name.into(),
            description: None,
            amount: 80.0,
            purchased: false,
            url: Some("https://shop.example.com/watch".into()),
        }
    }

    #[tokio::test]
    async fn gift_crud() {
        let state = AppState::for_tests();
        let recipient_id = recipient_for(&state, 1);

        let (status, Json(gift)) = create_gift(
            auth(1),
            State(state.clone()),
            Path(recipient_id),
            Json(gift_request("Watch")),
        )
        .await
        .unwrap();
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(gift.event_recipient_id, recipient_id);

        let Json(updated) = update_gift(
            auth(1),
            State(state.clone()),
            Path(gift.id),
            Json(UpdateGiftRequest {
                purchased: Some(true),
                ..Default::default()
            }),
        )
        .await
        .unwrap();
        assert!(updated.purchased);
        assert_eq!(updated.url, gift.url);

        let request: UpdateGiftRequest = serde_json::from_str(r#"{"url": null}"#).unwrap();
        let Json(cleared) =
            update_gift(auth(1), State(state.clone()), Path(gift.id), Json(request))
                .await
                .unwrap();
        assert_eq!(cleared.url, None);
        assert!(cleared.purchased);

        let status = delete_gift(auth(1), State(state.clone()), Path(gift.id))
            .await
            .unwrap();
        assert_eq!(status, StatusCode::NO_CONTENT);

        let Json(remaining) = list_gifts(auth(1), State(state), Path(recipient_id))
            .await
            .unwrap();
        assert!(remaining.is_empty());
    }

    #[tokio::test]
    async fn gifts_are_hidden_from_strangers() {
        let state = AppState::for_tests();
        let recipient_id = recipient_for(&state, 1);

        let err = create_gift(
            auth(2),
            State(state.clone()),
            Path(recipient_id),
            Json(gift_request("Watch")),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status, StatusCode::NOT_FOUND);

        let err = list_gifts(auth(2), State(state), Path(recipient_id))
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::NOT_FOUND);
    }
}
