//! Networking records
//!
//! Peers are kept as address records for a later chain-resolution exchange.
//! There is no transport, discovery or handshake in this crate.

pub mod peer;

pub use peer::{Peer, MIN_PEER_PORT};
