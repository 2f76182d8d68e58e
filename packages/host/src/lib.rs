//! Development host for Duet webview clients.
//!
//! Assigns identities, lets one connection host a session, relays join
//! requests to that host, and fans chat out to the admitted members.

pub mod domain;
pub mod error;
pub mod handler;
pub mod server;
pub mod signal;
pub mod state;

pub use server::Server;
