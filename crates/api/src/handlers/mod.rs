pub mod activity;
pub mod events;
pub mod rsvps;
pub mod users;
