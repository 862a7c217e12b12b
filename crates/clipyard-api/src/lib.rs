//! HTTP façades for the autocrop and organizer services.
//!
//! Both services share the error rendering, telemetry and server lifecycle in this
//! crate; each binary builds its own router with [`setup::routes`].

pub mod error;
pub mod handlers;
pub mod setup;
pub mod state;
