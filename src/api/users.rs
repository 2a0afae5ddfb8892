// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Registration, login and the current user.

use axum::{extract::State, http::StatusCode, Form, Json};

use crate::{
    auth::Auth,
    error::ApiError,
    models::{LoginForm, RegisterRequest, TokenResponse, UserProfile},
    service::AccountService,
    state::AppState,
};

/// Register a new account.
#[utoipa::path(
    post,
    path = "/register",
    tag = "Users",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = UserProfile),
        (status = 400, description = "A required field is blank"),
        (status = 409, description = "Username or email already registered")
    )
)]
pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<UserProfile>), ApiError> {
    let profile = AccountService::new(&state.db, state.auth.as_ref()).register(request)?;
    Ok((StatusCode::CREATED, Json(profile)))
}

/// Exchange form-encoded credentials for a bearer token.
#[utoipa::path(
    post,
    path = "/token",
    tag = "Users",
    request_body(content = LoginForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "Access token", body = TokenResponse),
        (status = 401, description = "Incorrect username or password")
    )
)]
pub async fn login(
    State(state): State<AppState>,
    Form(form): Form<LoginForm>,
) -> Result<Json<TokenResponse>, ApiError> {
    let token =
        AccountService::new(&state.db, state.auth.as_ref()).login(&form.username, &form.password)?;
    Ok(Json(token))
}

/// Profile of the authenticated user.
#[utoipa::path(
    get,
    path = "/users/me",
    tag = "Users",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "User information", body = UserProfile),
        (status = 401, description = "Unauthorized - invalid or missing token")
    )
)]
pub async fn get_current_user(
    Auth(user): Auth,
    State(state): State<AppState>,
) -> Result<Json<UserProfile>, ApiError> {
    let profile = AccountService::new(&state.db, state.auth.as_ref()).profile(user.user_id)?;
    Ok(Json(profile))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::AuthenticatedUser;

    fn register_request(username: &str) -> RegisterRequest {
        RegisterRequest {
            username: username.into(),
            email: format!("{username}@example.com"),
            password: "hunter22".into(),
            full_name: None,
        }
    }

    #[tokio::test]
    async fn register_login_and_me() {
        let state = AppState::for_tests();

        let (status, Json(profile)) =
            register(State(state.clone()), Json(register_request("alice")))
                .await
                .expect("registration succeeds");
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(profile.username, "alice");

        let Json(token) = login(
            State(state.clone()),
            Form(LoginForm {
                username: "alice".into(),
                password: "hunter22".into(),
            }),
        )
        .await
        .expect("login succeeds");
        assert_eq!(token.token_type, "bearer");

        let current = state.auth.current_user(&token.access_token).unwrap();
        let Json(me) = get_current_user(Auth(current), State(state))
            .await
            .expect("profile lookup succeeds");
        assert_eq!(me, profile);
    }

    #[tokio::test]
    async fn duplicate_registration_conflicts() {
        let state = AppState::for_tests();
        let (status, _) = register(State(state.clone()), Json(register_request("bob")))
            .await
            .unwrap();
        assert_eq!(status, StatusCode::CREATED);

        let err = register(State(state), Json(register_request("bob")))
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::CONFLICT);
        assert_eq!(err.message, "Username already registered");
    }

    #[tokio::test]
    async fn wrong_password_is_unauthorized() {
        let state = AppState::for_tests();
        let (status, _) = register(State(state.clone()), Json(register_request("carol")))
            .await
            .unwrap();
        assert_eq!(status, StatusCode::CREATED);

        let err = login(
            State(state),
            Form(LoginForm {
                username: "carol".into(),
                password: "nope".into(),
            }),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn me_for_deleted_account_is_not_found() {
        let state = AppState::for_tests();
        let ghost = AuthenticatedUser {
            user_id: 404,
            username: "ghost".into(),
            expires_at: 0,
        };

        let err = get_current_user(Auth(ghost), State(state))
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::NOT_FOUND);
    }
}
