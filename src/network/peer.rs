//! Peer address records
//!
//! A peer is the root address of another ledger node. Only the record and
//! its syntactic validation live here; connecting to peers is left to the
//! host application.

use crate::crypto::Canonical;
use crate::error::{LedgerError, LedgerResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lowest port a peer may listen on
pub const MIN_PEER_PORT: u16 = 1000;

/// Path to the root address of another ledger
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Peer {
    pub host: String,
    pub port: u16,
}

impl Peer {
    /// Create and validate a peer
    pub fn new(host: &str, port: u16) -> LedgerResult<Self> {
        let peer = Self {
            host: host.to_string(),
            port,
        };

        if !peer.is_valid() {
            log::warn!("Rejected peer {}", peer);
            return Err(LedgerError::InvalidData);
        }

        Ok(peer)
    }

    /// Full root address of the peer
    ///
    /// ```
    /// use pow_ledger::network::Peer;
    ///
    /// let peer = Peer::new("192.168.1.1", 6060).unwrap();
    /// assert_eq!(peer.address(false), "http://192.168.1.1:6060/");
    /// assert_eq!(peer.address(true), "https://192.168.1.1:6060/");
    /// ```
    pub fn address(&self, use_tls: bool) -> String {
        let scheme = if use_tls { "https" } else { "http" };
        format!("{}://{}:{}/", scheme, self.host, self.port)
    }

    /// A peer needs a well-formed host and a port of at least 1000
    pub fn is_valid(&self) -> bool {
        is_valid_host(&self.host) && self.port >= MIN_PEER_PORT
    }
}

impl fmt::Display for Peer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

impl Canonical for Peer {}

/// `localhost`, or four dot-separated groups of up to three digits
///
/// The check is syntactic only: octet ranges are not enforced and empty
/// groups are accepted.
fn is_valid_host(host: &str) -> bool {
    if host == "localhost" {
        return true;
    }

    let groups: Vec<&str> = host.split('.').collect();
    groups.len() == 4
        && groups
            .iter()
            .all(|g| g.len() <= 3 && g.bytes().all(|b| b.is_ascii_digit()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_peers() {
        assert!(Peer::new("localhost", 3000).is_ok());
        assert!(Peer::new("192.168.1.1", 6060).is_ok());
        assert!(Peer::new("10.0.0.1", 1000).is_ok());
    }

    #[test]
    fn test_lenient_hosts_accepted() {
        assert!(Peer::new("999.999.999.999", 8080).is_ok());
        assert!(Peer::new("1..2.", 8080).is_ok());
    }

    #[test]
    fn test_invalid_hosts_rejected() {
        for host in ["example.com", "1.2.3", "1.2.3.4.5", "1234.1.1.1", "", "local host"] {
            assert!(
                matches!(Peer::new(host, 8080), Err(LedgerError::InvalidData)),
                "host {host:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_low_port_rejected() {
        assert!(matches!(
            Peer::new("localhost", 999),
            Err(LedgerError::InvalidData)
        ));
    }

    #[test]
    fn test_address() {
        let peer = Peer::new("localhost", 3000).unwrap();
        assert_eq!(peer.address(false), "http://localhost:3000/");
        assert_eq!(peer.address(true), "https://localhost:3000/");
    }

    #[test]
    fn test_json_string() {
        let peer = Peer::new("localhost", 3000).unwrap();
        assert_eq!(
            peer.json_string().unwrap(),
            r#"{"host":"localhost","port":3000}"#
        );
    }
}
