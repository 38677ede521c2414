//! Clubhouse domain core.
//!
//! Zero internal dependencies: identifiers, the shared error type, the RSVP
//! state machine and admission arithmetic, pagination and input validation.
//! Used by the repository layer, the activity bus and the API server alike.

pub mod activity;
pub mod error;
pub mod pagination;
pub mod rsvp;
pub mod types;
pub mod validation;
