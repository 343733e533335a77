use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use waypoint_primitives::{
    constants::{DEFAULT_BUFFER_SIZE, DEFAULT_MAX_BATCH_SIZE},
    prelude::ChainId,
};

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("no chains configured")]
    NoChains,

    #[error("chain {0} configured twice")]
    DuplicateChain(ChainId),

    #[error("chain {child} names parent {parent}, which isn't configured before it")]
    UnknownParent { child: ChainId, parent: ChainId },

    #[error("buffer size must be nonzero")]
    ZeroBufferSize,

    #[error("max batch size must be nonzero")]
    ZeroMaxBatchSize,
}

/// How messages from a chain's parent reach it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessengerKind {
    /// Retryable tickets with an aliased sender.
    #[default]
    Retryable,

    /// Native messenger exposing the cross-domain sender.
    Native,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainConfig {
    pub id: ChainId,
    pub name: String,

    /// Parent chain, `None` for the root chain.
    #[serde(default)]
    pub parent: Option<ChainId>,

    /// Only meaningful for chains with a parent.
    #[serde(default)]
    pub messenger: MessengerKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BufferConfig {
    /// Number of parent chain block hashes each buffer retains.
    #[serde(default = "default_buffer_size")]
    pub size: u64,
}

impl Default for BufferConfig {
    fn default() -> Self {
        Self {
            size: default_buffer_size(),
        }
    }
}

fn default_buffer_size() -> u64 {
    DEFAULT_BUFFER_SIZE
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PusherConfig {
    #[serde(default = "default_max_batch_size")]
    pub max_batch_size: u64,
}

impl Default for PusherConfig {
    fn default() -> Self {
        Self {
            max_batch_size: default_max_batch_size(),
        }
    }
}

fn default_max_batch_size() -> u64 {
    DEFAULT_MAX_BATCH_SIZE
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Label included in the whoami string, overridden by the environment.
    #[serde(default)]
    pub service_label: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub buffer: BufferConfig,

    #[serde(default)]
    pub pusher: PusherConfig,

    pub chains: Vec<ChainConfig>,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Checks the chain topology and limits.  Parents must be listed before
    /// their children, which also rules out cycles.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.chains.is_empty() {
            return Err(ConfigError::NoChains);
        }
        if self.buffer.size == 0 {
            return Err(ConfigError::ZeroBufferSize);
        }
        if self.pusher.max_batch_size == 0 {
            return Err(ConfigError::ZeroMaxBatchSize);
        }

        let mut seen = HashSet::new();
        for chain in &self.chains {
            if let Some(parent) = chain.parent {
                if !seen.contains(&parent) {
                    return Err(ConfigError::UnknownParent {
                        child: chain.id,
                        parent,
                    });
                }
            }
            if !seen.insert(chain.id) {
                return Err(ConfigError::DuplicateChain(chain.id));
            }
        }

        Ok(())
    }

    pub fn chain(&self, id: ChainId) -> Option<&ChainConfig> {
        self.chains.iter().find(|c| c.id == id)
    }

    /// Ids from `id` up to its root chain, starting with `id`.
    pub fn ancestry(&self, id: ChainId) -> Vec<ChainId> {
        let mut out = Vec::new();
        let mut cur = self.chain(id);
        while let Some(chain) = cur {
            out.push(chain.id);
            cur = chain.parent.and_then(|p| self.chain(p));
        }
        out
    }
}

#[cfg(test)]
mod test {
    use super::*;

    const SAMPLE: &str = r#"
        [buffer]
        size = 1024

        [[chains]]
        id = 1
        name = "ethereum"

        [[chains]]
        id = 42161
        name = "arbitrum"
        parent = 1
        messenger = "retryable"

        [[chains]]
        id = 8453
        name = "base"
        parent = 1
        messenger = "native"

        [[chains]]
        id = 660279
        name = "xai"
        parent = 42161

        [logging]
        service_label = "sim-0"
    "#;

    #[test]
    fn test_config_load() {
        let config = toml::from_str::<Config>(SAMPLE);
        assert!(
            config.is_ok(),
            "should be able to load TOML config but got: {:?}",
            config.err()
        );
        let config = config.unwrap();

        assert_eq!(config.buffer.size, 1024);
        assert_eq!(config.pusher.max_batch_size, DEFAULT_MAX_BATCH_SIZE);
        assert_eq!(config.chain(8453).unwrap().messenger, MessengerKind::Native);
        assert_eq!(config.chain(660279).unwrap().messenger, MessengerKind::Retryable);
        assert_eq!(config.ancestry(660279), vec![660279, 42161, 1]);
        assert_eq!(config.logging.service_label.as_deref(), Some("sim-0"));
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn test_validate_topology() {
        let mut config = toml::from_str::<Config>(SAMPLE).unwrap();
        config.chains.swap(0, 1);
        assert_eq!(
            config.validate(),
            Err(ConfigError::UnknownParent {
                child: 42161,
                parent: 1
            })
        );

        let mut config = toml::from_str::<Config>(SAMPLE).unwrap();
        let dup = config.chains[2].clone();
        config.chains.push(dup);
        assert_eq!(config.validate(), Err(ConfigError::DuplicateChain(8453)));

        let config = toml::from_str::<Config>("chains = []").unwrap();
        assert_eq!(config.validate(), Err(ConfigError::NoChains));
    }
}
