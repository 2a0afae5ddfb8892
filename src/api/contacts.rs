// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Contact endpoints, including sharing.
//!
//! Contacts shared with the caller are listed after the caller's own and
//! are readable or editable according to the grant.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use crate::{
    auth::Auth,
    error::ApiError,
    models::{
        Contact, ContactId, ContactRequest, Pagination, ShareGrant, ShareRequest, ShareResponse,
        UserId,
    },
    service::{ContactService, SharingService},
    state::AppState,
    storage::ShareKind,
};

#[utoipa::path(
    post,
    path = "/contacts",
    tag = "Contacts",
    security(("bearer_auth" = [])),
    request_body = ContactRequest,
    responses(
        (status = 201, description = "Contact created", body = Contact),
        (status = 400, description = "Name is blank"),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn create_contact(
    Auth(user): Auth,
    State(state): State<AppState>,
    Json(request): Json<ContactRequest>,
) -> Result<(StatusCode, Json<Contact>), ApiError> {
    let contact = ContactService::new(&state.db).create(user.user_id, request)?;
    Ok((StatusCode::CREATED, Json(contact)))
}

/// List owned contacts followed by contacts shared with the caller.
#[utoipa::path(
    get,
    path = "/contacts",
    tag = "Contacts",
    security(("bearer_auth" = [])),
    params(Pagination),
    responses(
        (status = 200, body = [Contact]),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn list_contacts(
    Auth(user): Auth,
    State(state): State<AppState>,
    Query(page): Query<Pagination>,
) -> Result<Json<Vec<Contact>>, ApiError> {
    Ok(Json(ContactService::new(&state.db).list(user.user_id, page)?))
}

#[utoipa::path(
    get,
    path = "/contacts/{contact_id}",
    tag = "Contacts",
    security(("bearer_auth" = [])),
    params(("contact_id" = u64, Path, description = "Contact identifier")),
    responses(
        (status = 200, body = Contact),
        (status = 404, description = "Contact not found")
    )
)]
pub async fn get_contact(
    Auth(user): Auth,
    State(state): State<AppState>,
    Path(contact_id): Path<ContactId>,
) -> Result<Json<Contact>, ApiError> {
    Ok(Json(ContactService::new(&state.db).get(user.user_id, contact_id)?))
}

/// Replace a contact. Requires ownership or a write grant.
#[utoipa::path(
    put,
    path = "/contacts/{contact_id}",
    tag = "Contacts",
    security(("bearer_auth" = [])),
    params(("contact_id" = u64, Path, description = "Contact identifier")),
    request_body = ContactRequest,
    responses(
        (status = 200, body = Contact),
        (status = 403, description = "Grant does not allow editing"),
        (status = 404, description = "Contact not found")
    )
)]
pub async fn update_contact(
    Auth(user): Auth,
    State(state): State<AppState>,
    Path(contact_id): Path<ContactId>,
    Json(request): Json<ContactRequest>,
) -> Result<Json<Contact>, ApiError> {
    let contact = ContactService::new(&state.db).update(user.user_id, contact_id, request)?;
    Ok(Json(contact))
}

/// Delete a contact and its grants. Requires ownership or an admin grant.
#[utoipa::path(
    delete,
    path = "/contacts/{contact_id}",
    tag = "Contacts",
    security(("bearer_auth" = [])),
    params(("contact_id" = u64, Path, description = "Contact identifier")),
    responses(
        (status = 204),
        (status = 403, description = "Grant does not allow deleting"),
        (status = 404, description = "Contact not found"),
        (status = 409, description = "Contact is still an event recipient")
    )
)]
pub async fn delete_contact(
    Auth(user): Auth,
    State(state): State<AppState>,
    Path(contact_id): Path<ContactId>,
) -> Result<StatusCode, ApiError> {
    ContactService::new(&state.db).delete(user.user_id, contact_id)?;
    Ok(StatusCode::NO_CONTENT)
}

/// Share a contact with a friend, or change the permission of an existing grant.
#[utoipa::path(
    post,
    path = "/contacts/{contact_id}/share",
    tag = "Sharing",
    security(("bearer_auth" = [])),
    params(("contact_id" = u64, Path, description = "Contact identifier")),
    request_body = ShareRequest,
    responses(
        (status = 200, body = ShareResponse),
        (status = 400, description = "Target is not a friend"),
        (status = 403, description = "Only the owner can share"),
        (status = 404, description = "Contact not found")
    )
)]
pub async fn share_contact(
    Auth(user): Auth,
    State(state): State<AppState>,
    Path(contact_id): Path<ContactId>,
    Json(request): Json<ShareRequest>,
) -> Result<Json<ShareResponse>, ApiError> {
    let response = SharingService::new(&state.db).share(
        ShareKind::Contact,
        contact_id,
        user.user_id,
        request.shared_with_user_id,
        request.permission,
    )?;
    Ok(Json(response))
}

#[utoipa::path(
    get,
    path = "/contacts/{contact_id}/shares",
    tag = "Sharing",
    security(("bearer_auth" = [])),
    params(("contact_id" = u64, Path, description = "Contact identifier")),
    responses(
        (status = 200, body = [ShareGrant]),
        (status = 403, description = "Only the owner can list grants"),
        (status = 404, description = "Contact not found")
    )
)]
pub async fn list_contact_shares(
    Auth(user): Auth,
    State(state): State<AppState>,
    Path(contact_id): Path<ContactId>,
) -> Result<Json<Vec<ShareGrant>>, ApiError> {
    let grants =
        SharingService::new(&state.db).list_grants(ShareKind::Contact, contact_id, user.user_id)?;
    Ok(Json(grants))
}

/// Revoke a grant. Revoking a grant that does not exist succeeds.
#[utoipa::path(
    delete,
    path = "/contacts/{contact_id}/share/{user_id}",
    tag = "Sharing",
    security(("bearer_auth" = [])),
    params(
        ("contact_id" = u64, Path, description = "Contact identifier"),
        ("user_id" = u64, Path, description = "User whose grant is revoked")
    ),
    responses(
        (status = 204),
        (status = 403, description = "Only the owner can unshare"),
        (status = 404, description = "Contact not found")
    )
)]
pub async fn unshare_contact(
    Auth(user): Auth,
    State(state): State<AppState>,
    Path((contact_id, target)): Path<(ContactId, UserId)>,
) -> Result<StatusCode, ApiError> {
    SharingService::new(&state.db).unshare(ShareKind::Contact, contact_id, user.user_id, target)?;
    Ok(StatusCode::NO_CONTENT)
}
