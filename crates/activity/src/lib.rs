//! Clubhouse activity log.
//!
//! A one-way notification channel: the admission engine and the collaborator
//! modules publish activities and never wait on, or fail because of, their
//! delivery.
//!
//! - [`ActivityBus`]: in-process publish/subscribe hub backed by
//!   `tokio::sync::broadcast`.
//! - [`ActivityEvent`]: the activity envelope.
//! - [`ActivityPersistence`]: background service that durably writes every
//!   activity to the `activity_logs` table.

pub mod bus;
pub mod persistence;

pub use bus::{ActivityBus, ActivityEvent};
pub use persistence::ActivityPersistence;
