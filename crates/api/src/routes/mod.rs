pub mod health;
pub mod users;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /user                 get current user, update profile (requires auth)
/// /users                register (public)
/// /users/login          login (public)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new().merge(users::router())
}
