// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    http::{header, HeaderValue, Method},
    routing::{delete, get, post, put},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::CorsLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    access::Permission,
    models::{
        Contact, ContactRequest, CreateGiftRequest, CreateRecipientRequest, Event, EventDetail,
        EventRequest, FriendRequest, FriendRequestCreate, Gift, LoginForm, Pagination, Recipient,
        RecipientDetail, RegisterRequest, ShareGrant, ShareRequest, ShareResponse, TokenResponse,
        UpdateGiftRequest, UpdateRecipientRequest, UserProfile,
    },
    state::AppState,
    storage::FriendStatus,
};

pub mod contacts;
pub mod events;
pub mod friends;
pub mod gifts;
pub mod health;
pub mod users;

/// Build the full application router.
///
/// `allowed_origins` feeds the CORS layer; entries that are not valid header
/// values are skipped with a warning.
pub fn router(state: AppState, allowed_origins: &[String]) -> Router {
    let routes = Router::new()
        .route("/register", post(users::register))
        .route("/token", post(users::login))
        .route("/users/me", get(users::get_current_user))
        .route(
            "/contacts",
            get(contacts::list_contacts).post(contacts::create_contact),
        )
        .route(
            "/contacts/{contact_id}",
            get(contacts::get_contact)
                .put(contacts::update_contact)
                .delete(contacts::delete_contact),
        )
        .route("/contacts/{contact_id}/share", post(contacts::share_contact))
        .route(
            "/contacts/{contact_id}/shares",
            get(contacts::list_contact_shares),
        )
        .route(
            "/contacts/{contact_id}/share/{user_id}",
            delete(contacts::unshare_contact),
        )
        .route("/events", get(events::list_events).post(events::create_event))
        .route(
            "/events/{event_id}",
            get(events::get_event)
                .put(events::update_event)
                .delete(events::delete_event),
        )
        .route("/events/{event_id}/share", post(events::share_event))
        .route("/events/{event_id}/shares", get(events::list_event_shares))
        .route(
            "/events/{event_id}/share/{user_id}",
            delete(events::unshare_event),
        )
        .route(
            "/events/{event_id}/recipients",
            get(events::list_recipients).post(events::add_recipient),
        )
        .route(
            "/events/{event_id}/recipients/{recipient_id}",
            put(events::update_recipient).delete(events::remove_recipient),
        )
        .route(
            "/recipients/{recipient_id}/gifts",
            get(gifts::list_gifts).post(gifts::create_gift),
        )
        .route(
            "/gifts/{gift_id}",
            put(gifts::update_gift).delete(gifts::delete_gift),
        )
        .route("/friends", get(friends::list_friends))
        .route("/friends/request", post(friends::send_friend_request))
        .route("/friends/requests", get(friends::list_friend_requests))
        .route(
            "/friends/requests/{request_id}/accept",
            post(friends::accept_friend_request),
        )
        .route(
            "/friends/requests/{request_id}/reject",
            post(friends::reject_friend_request),
        )
        .route("/health", get(health::health))
        .route("/health/live", get(health::liveness))
        .route("/health/ready", get(health::readiness))
        .with_state(state);

    Router::new()
        .merge(routes)
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(cors_layer(allowed_origins))
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                .layer(TraceLayer::new_for_http())
                .layer(PropagateRequestIdLayer::x_request_id()),
        )
}

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .allow_credentials(true)
}

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        users::register,
        users::login,
        users::get_current_user,
        contacts::create_contact,
        contacts::list_contacts,
        contacts::get_contact,
        contacts::update_contact,
        contacts::delete_contact,
        contacts::share_contact,
        contacts::list_contact_shares,
        contacts::unshare_contact,
        events::create_event,
        events::list_events,
        events::get_event,
        events::update_event,
        events::delete_event,
        events::share_event,
        events::list_event_shares,
        events::unshare_event,
        events::add_recipient,
        events::list_recipients,
        events::update_recipient,
        events::remove_recipient,
        gifts::create_gift,
        gifts::list_gifts,
        gifts::update_gift,
        gifts::delete_gift,
        friends::send_friend_request,
        friends::list_friend_requests,
        friends::accept_friend_request,
        friends::reject_friend_request,
        friends::list_friends,
        health::health,
        health::liveness,
        health::readiness
    ),
    components(
        schemas(
            UserProfile,
            RegisterRequest,
            LoginForm,
            TokenResponse,
            Contact,
            ContactRequest,
            Event,
            EventRequest,
            EventDetail,
            Recipient,
            RecipientDetail,
            CreateRecipientRequest,
            UpdateRecipientRequest,
            Gift,
            CreateGiftRequest,
            UpdateGiftRequest,
            FriendRequest,
            FriendRequestCreate,
            FriendStatus,
            ShareRequest,
            ShareResponse,
            ShareGrant,
            Permission,
            Pagination,
            health::ReadyResponse,
            health::HealthChecks,
            health::HealthResponse
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Users", description = "Registration, login and profile"),
        (name = "Contacts", description = "Contact management"),
        (name = "Events", description = "Event management and detail"),
        (name = "Recipients", description = "Contacts attached to events"),
        (name = "Gifts", description = "Gift planning per recipient"),
        (name = "Sharing", description = "Contact and event grants for friends"),
        (name = "Friends", description = "Friend requests and friendships"),
        (name = "Health", description = "Liveness and readiness probes")
    )
)]
struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    fn app() -> Router {
        router(AppState::for_tests(), &["http://localhost:5173".to_string()])
    }

    #[tokio::test]
    async fn health_is_public() {
        let (status, body) = send(
            &app(),
            Request::get("/health/live").body(Body::empty()).unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn protected_routes_need_a_token() {
        let app = app();
        let (status, body) = send(
            &app,
            Request::get("/contacts").body(Body::empty()).unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn register_login_and_create_contact() {
        let app = app();

        let register = Request::post("/register")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(
                json!({
                    "username": "alice",
                    "email": "alice@example.com",
                    "password": "correct horse battery"
                })
                .to_string(),
            ))
            .unwrap();
        let (status, profile) = send(&app, register).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(profile["username"], "alice");

        let login = Request::post("/token")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from("username=alice&password=correct+horse+battery"))
            .unwrap();
        let (status, token) = send(&app, login).await;
        assert_eq!(status, StatusCode::OK);
        let bearer = format!("Bearer {}", token["access_token"].as_str().unwrap());

        let create = Request::post("/contacts")
            .header(header::AUTHORIZATION, &bearer)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json!({ "name": "Grandma" }).to_string()))
            .unwrap();
        let (status, contact) = send(&app, create).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(contact["name"], "Grandma");

        let list = Request::get("/contacts?skip=0&limit=10")
            .header(header::AUTHORIZATION, &bearer)
            .body(Body::empty())
            .unwrap();
        let (status, contacts) = send(&app, list).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(contacts.as_array().map(Vec::len), Some(1));
    }

    #[tokio::test]
    async fn responses_carry_a_request_id() {
        let response = app()
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert!(response.headers().contains_key("x-request-id"));
    }

    #[test]
    fn openapi_document_declares_bearer_auth() {
        let doc = ApiDoc::openapi();
        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key("bearer_auth"));
        assert!(doc.paths.paths.contains_key("/events/{event_id}/recipients/{recipient_id}"));
    }
}
