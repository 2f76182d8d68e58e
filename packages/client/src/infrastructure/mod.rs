//! Infrastructure layer: wire DTO conversions and the transport to the host.

pub mod dto;
pub mod transport;
