//! Shared query parameter types for API handlers.

use clubhouse_core::pagination::PageRequest;
use clubhouse_core::rsvp::RsvpStatus;
use clubhouse_core::types::DbId;
use clubhouse_db::models::activity::ActivityFilter;
use clubhouse_db::models::rsvp::RsvpFilter;
use serde::Deserialize;

/// Generic pagination parameters (`?page=&limit=`).
///
/// Values are clamped by [`PageRequest::new`].
#[derive(Debug, Default, Deserialize)]
pub struct PaginationParams {
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

impl PaginationParams {
    pub fn page_request(&self) -> PageRequest {
        PageRequest::new(self.page, self.limit)
    }
}

/// Query parameters for `GET /rsvps`.
#[derive(Debug, Default, Deserialize)]
pub struct RsvpListParams {
    pub rsvp_id: Option<DbId>,
    pub event_id: Option<DbId>,
    pub user_id: Option<DbId>,
    pub status: Option<RsvpStatus>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

impl RsvpListParams {
    /// Split into the repository filter and the clamped page request.
    pub fn into_parts(self) -> (RsvpFilter, PageRequest) {
        let page = PageRequest::new(self.page, self.limit);
        let filter = RsvpFilter {
            rsvp_id: self.rsvp_id,
            event_id: self.event_id,
            user_id: self.user_id,
            status: self.status,
        };
        (filter, page)
    }
}

/// Query parameters for `GET /activity`.
#[derive(Debug, Default, Deserialize)]
pub struct ActivityListParams {
    pub event_id: Option<DbId>,
    pub user_id: Option<DbId>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

impl ActivityListParams {
    pub fn into_parts(self) -> (ActivityFilter, PageRequest) {
        let page = PageRequest::new(self.page, self.limit);
        let filter = ActivityFilter {
            event_id: self.event_id,
            user_id: self.user_id,
        };
        (filter, page)
    }
}
