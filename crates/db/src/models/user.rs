//! User entity model and DTOs.
//!
//! Users are a collaborator of the RSVP engine: it only needs their
//! existence and display name.

use clubhouse_core::error::CoreError;
use clubhouse_core::types::{DbId, Timestamp};
use clubhouse_core::validation::{validate_email, validate_username};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `users` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct User {
    pub id: DbId,
    pub username: String,
    pub email: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a new user.
#[derive(Debug, Deserialize)]
pub struct CreateUser {
    pub username: String,
    pub email: String,
}

impl CreateUser {
    pub fn validate(&self) -> Result<(), CoreError> {
        validate_username(&self.username)?;
        validate_email(&self.email)
    }
}
