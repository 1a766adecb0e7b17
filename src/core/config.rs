//! Chain configuration
//!
//! Difficulty and identifier length are fixed per chain at construction.
//! Changing either after blocks exist would make earlier validity results
//! inconsistent, so `Blockchain` exposes no setter for its config.

use crate::crypto::HASH_STRING_SIZE;
use crate::error::{LedgerError, LedgerResult};
use crate::mining::MiningPolicy;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Default mining difficulty (leading zero hex characters)
pub const DEFAULT_TARGET: usize = 4;

/// Default length of a chain identifier
pub const DEFAULT_ID_LENGTH: usize = 16;

/// Per-chain settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChainConfig {
    /// Required leading zero hex characters in every block hash
    pub target: usize,
    /// Required length of the chain identifier
    pub id_length: usize,
    /// How the miner reads the transaction pool during a search
    pub mining_policy: MiningPolicy,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            target: DEFAULT_TARGET,
            id_length: DEFAULT_ID_LENGTH,
            mining_policy: MiningPolicy::default(),
        }
    }
}

impl ChainConfig {
    /// Default config with a custom difficulty
    pub fn with_target(target: usize) -> Self {
        Self {
            target,
            ..Self::default()
        }
    }

    /// Same config with a different mining policy
    pub fn with_policy(mut self, policy: MiningPolicy) -> Self {
        self.mining_policy = policy;
        self
    }

    /// Check that a chain built from this config can be mined and validated
    ///
    /// Chain ids are cut from a hex hash, so neither the target nor the id
    /// length can exceed the hash length. An empty id leaves the reward
    /// transaction without a sender.
    pub fn validate(&self) -> LedgerResult<()> {
        if self.target > HASH_STRING_SIZE {
            return Err(LedgerError::Config(format!(
                "target {} exceeds hash length {}",
                self.target, HASH_STRING_SIZE
            )));
        }

        if self.id_length == 0 || self.id_length > HASH_STRING_SIZE {
            return Err(LedgerError::Config(format!(
                "id_length {} must be between 1 and {}",
                self.id_length, HASH_STRING_SIZE
            )));
        }

        Ok(())
    }

    /// Parse and validate a JSON config; missing fields take their defaults
    pub fn from_json_str(json: &str) -> LedgerResult<Self> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| LedgerError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load a JSON config file
    pub fn from_json_file(path: &Path) -> LedgerResult<Self> {
        let data = fs::read_to_string(path)
            .map_err(|e| LedgerError::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_json_str(&data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = ChainConfig::default();
        assert_eq!(config.target, 4);
        assert_eq!(config.id_length, 16);
        assert_eq!(config.mining_policy, MiningPolicy::LiveRead);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = ChainConfig::from_json_str(r#"{"target": 2}"#).unwrap();
        assert_eq!(config.target, 2);
        assert_eq!(config.id_length, DEFAULT_ID_LENGTH);

        let config = ChainConfig::from_json_str(r#"{"mining_policy": "snapshot"}"#).unwrap();
        assert_eq!(config.mining_policy, MiningPolicy::Snapshot);
    }

    #[test]
    fn test_bad_json_is_config_error() {
        let result = ChainConfig::from_json_str("{target: ");
        assert!(matches!(result, Err(LedgerError::Config(_))));
    }

    #[test]
    fn test_validate_bounds() {
        assert!(ChainConfig::default().validate().is_ok());
        assert!(ChainConfig::with_target(HASH_STRING_SIZE).validate().is_ok());

        let long_id = ChainConfig {
            id_length: HASH_STRING_SIZE,
            ..ChainConfig::default()
        };
        assert!(long_id.validate().is_ok());

        for config in [
            ChainConfig::with_target(HASH_STRING_SIZE + 1),
            ChainConfig {
                id_length: HASH_STRING_SIZE + 1,
                ..ChainConfig::default()
            },
            ChainConfig {
                id_length: 0,
                ..ChainConfig::default()
            },
        ] {
            assert!(matches!(config.validate(), Err(LedgerError::Config(_))));
        }
    }

    #[test]
    fn test_json_with_oversized_id_length_rejected() {
        let result = ChainConfig::from_json_str(r#"{"id_length": 500}"#);
        assert!(matches!(result, Err(LedgerError::Config(_))));
    }

    #[test]
    fn test_from_json_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"target": 1, "id_length": 8}}"#).unwrap();

        let config = ChainConfig::from_json_file(file.path()).unwrap();
        assert_eq!(
            config,
            ChainConfig {
                target: 1,
                id_length: 8,
                mining_policy: MiningPolicy::LiveRead,
            }
        );
    }

    #[test]
    fn test_missing_file_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = ChainConfig::from_json_file(&dir.path().join("absent.json"));
        assert!(matches!(result, Err(LedgerError::Config(_))));
    }
}
