//! Shared building blocks for the Duet webview client and its host.
//!
//! - `envelope`: the wire contract exchanged between a webview and its host
//! - `logger`: tracing subscriber setup for the binaries
//! - `time`: clock abstraction and timestamp formatting

pub mod envelope;
pub mod logger;
pub mod time;
