//! RSVP admission engine.
//!
//! Owns every write that can change who holds a seat in an event. Handlers
//! and the background sweep call into [`RsvpEngine`]; nothing else touches
//! RSVP status.

pub mod rsvp;

pub use rsvp::RsvpEngine;
