//! Shared response envelope types for API handlers.
//!
//! Successful responses carry a human-readable `message` and, where the
//! operation returns something, a `data` payload.

use serde::Serialize;

/// Standard `{ "message": ..., "data": T }` response envelope.
///
/// # Example
///
/// ```ignore
/// Ok(Json(DataResponse::new("Successfully login!", outcome)))
/// ```
#[derive(Debug, Serialize)]
pub struct DataResponse<T: Serialize> {
    pub message: &'static str,
    pub data: T,
}

impl<T: Serialize> DataResponse<T> {
    pub fn new(message: &'static str, data: T) -> Self {
        Self { message, data }
    }
}

/// `{ "message": ... }` for operations with nothing to return.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}
