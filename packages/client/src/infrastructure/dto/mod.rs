//! Data Transfer Objects exchanged with the host.
//!
//! The envelope types themselves live in `duet_shared::envelope`; this module
//! re-exports them and holds the conversions to and from domain types.

pub mod conversion;

pub use duet_shared::envelope::{ChatPayload, CodeReferencePayload, Command, EnvelopeError, Event};
