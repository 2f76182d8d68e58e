//! Duet client: session and messaging core of a pair-programming chat panel.
//!
//! Layers, leaves first:
//!
//! - `domain`: session state machine, roster, pending requests, mentions, chat
//! - `usecase`: the dispatch controller and the handshake coordinator
//! - `infrastructure`: DTO conversions and the transport to the host
//! - `ui`: terminal front end and reconnecting runner

pub mod config;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod ui;
pub mod usecase;
