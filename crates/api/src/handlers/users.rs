//! Handlers for the `/user` and `/users` resources.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use userdir_core::types::DbId;
use userdir_core::user::{Credentials, ProfileUpdate, PublicUser, Registration};
use validator::Validate;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::response::{DataResponse, MessageResponse};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /users`.
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 3, max = 60))]
    pub name: String,
    #[validate(custom(function = "userdir_core::validation::validate_phone"))]
    pub phone: String,
    #[validate(custom(function = "userdir_core::validation::validate_password"))]
    pub password: String,
}

/// Request body for `POST /users/login`.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(custom(function = "userdir_core::validation::validate_phone"))]
    pub phone: String,
    #[validate(custom(function = "userdir_core::validation::validate_password"))]
    pub password: String,
}

/// Request body for `PATCH /user`.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateProfileRequest {
    #[validate(length(min = 3, max = 60))]
    pub name: String,
    #[validate(custom(function = "userdir_core::validation::validate_phone"))]
    pub phone: String,
}

/// `data` of a successful registration.
#[derive(Debug, Serialize)]
pub struct RegisteredUser {
    pub id: DbId,
}

/// `data` of a successful login.
#[derive(Debug, Serialize)]
pub struct LoginData {
    pub id: DbId,
    pub token: String,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /api/v1/user
///
/// Current data of the user the bearer token belongs to.
pub async fn get_current_user(
    State(state): State<AppState>,
    auth: AuthUser,
) -> AppResult<Json<DataResponse<PublicUser>>> {
    let ctx = state.request_context();
    let user = state.identity.get_by_id(&ctx, auth.user_id).await?;

    Ok(Json(DataResponse::new("Successfully get user data!", user)))
}

/// POST /api/v1/users
pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> AppResult<Json<DataResponse<RegisteredUser>>> {
    let Json(input) = payload?;
    input.validate()?;

    let ctx = state.request_context();
    let id = state
        .identity
        .register(
            &ctx,
            &Registration {
                name: input.name,
                phone: input.phone,
                password: input.password,
            },
        )
        .await?;

    Ok(Json(DataResponse::new(
        "Successfully Register!",
        RegisteredUser { id },
    )))
}

/// PATCH /api/v1/user
///
/// The target user comes from the token; the body carries the new name and phone.
pub async fn update_profile(
    State(state): State<AppState>,
    auth: AuthUser,
    payload: Result<Json<UpdateProfileRequest>, JsonRejection>,
) -> AppResult<Json<MessageResponse>> {
    let Json(input) = payload?;
    input.validate()?;

    let ctx = state.request_context();
    state
        .identity
        .update_profile(
            &ctx,
            auth.user_id,
            &ProfileUpdate {
                name: input.name,
                phone: input.phone,
            },
        )
        .await?;

    Ok(Json(MessageResponse {
        message: "Successfully update user!",
    }))
}

/// POST /api/v1/users/login
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> AppResult<Json<DataResponse<LoginData>>> {
    let Json(input) = payload?;
    input.validate()?;

    let ctx = state.request_context();
    let outcome = state
        .identity
        .login(
            &ctx,
            &Credentials {
                phone: input.phone,
                password: input.password,
            },
        )
        .await?;

    Ok(Json(DataResponse::new(
        "Successfully login!",
        LoginData {
            id: outcome.user_id,
            token: outcome.token,
        },
    )))
}
