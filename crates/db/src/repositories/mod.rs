//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods. Plain
//! reads and inserts accept `&PgPool`; the admission-path methods accept an
//! open `Transaction` so the caller can hold the event row lock across the
//! whole decision.

pub mod activity_repo;
pub mod event_repo;
pub mod rsvp_repo;
pub mod user_repo;

pub use activity_repo::ActivityRepo;
pub use event_repo::EventRepo;
pub use rsvp_repo::RsvpRepo;
pub use user_repo::UserRepo;

/// Transaction handle accepted by repository methods that must run under a lock.
pub type PgTransaction<'a> = sqlx::Transaction<'a, sqlx::Postgres>;
