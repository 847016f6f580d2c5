//! Review and edit session protocol for Vermeer.
//!
//! Reviewer button presses and free-text replies arrive as events. The pure
//! [`transition`] function turns the current [`ReviewState`] and an event into
//! the next edit session and a list of [`ReviewEffect`]s; the
//! [`ReviewService`] loads state, runs the transition and carries out the
//! effects against the store, the job queue and the messaging transport.
//!
//! Callbacks for posts that were already decided are acknowledged and
//! otherwise ignored.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod machine;
mod service;
mod session;
mod settings;

pub use machine::{ReviewEffect, ReviewEvent, ReviewState, Transition, transition};
pub use service::ReviewService;
pub use session::SessionStore;
pub use settings::ReviewSettings;
