//! Route definitions for the `/user` and `/users` resources.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::users;
use crate::state::AppState;

/// User routes, mounted at the `/api/v1` root.
///
/// ```text
/// GET   /user          -> get_current_user (requires auth)
/// PATCH /user          -> update_profile (requires auth)
/// POST  /users         -> register
/// POST  /users/login   -> login
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/user",
            get(users::get_current_user).patch(users::update_profile),
        )
        .route("/users", post(users::register))
        .route("/users/login", post(users::login))
}
