//! Shared response envelope types for API handlers.

use serde::Serialize;

/// Standard `{ "data": T }` response envelope.
///
/// Used where a bare JSON array would otherwise be returned.
///
/// # Example
///
/// ```ignore
/// Ok(Json(DataResponse { data: changed }))
/// ```
#[derive(Debug, Serialize)]
pub struct DataResponse<T: Serialize> {
    pub data: T,
}
