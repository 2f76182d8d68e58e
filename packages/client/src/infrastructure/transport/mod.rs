//! Carriers for envelopes between the client core and its host.
//!
//! - `channel`: in-process sink backed by an unbounded mpsc channel
//! - `websocket`: WebSocket connection that drains the channel onto the socket

mod channel;
mod websocket;

pub use channel::ChannelSink;
pub use websocket::WebSocketConnection;
