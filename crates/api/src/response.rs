//! Shared response envelope types for API handlers.
//!
//! List and detail responses use a `{ "data": ... }` envelope. Use
//! [`DataResponse`] instead of ad-hoc `json!({ "data": ... })`.

use serde::Serialize;

/// Standard `{ "data": T }` response envelope.
#[derive(Debug, Serialize)]
pub struct DataResponse<T: Serialize> {
    pub data: T,
}

impl<T: Serialize> DataResponse<T> {
    pub fn new(data: T) -> Self {
        Self { data }
    }
}
