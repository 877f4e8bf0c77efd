use serde::{Deserialize, Serialize};

use crate::chains::{self, ChainFamily};
use crate::error::CcipError;
use crate::events::EventDiscriminators;
use crate::receiver::SeedCatalog;

/// A chain added through configuration, on top of the built-in registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainConfig {
    pub selector: u64,
    pub name: String,
    pub family: ChainFamily,
    #[serde(default)]
    pub is_testnet: bool,
}

/// Size limits a destination receiver enforces on incoming messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReceiverLimits {
    pub max_data_len: usize,
    pub max_token_amounts: usize,
}

impl ReceiverLimits {
    /// Limits of the reference receiver program.
    pub const BASIC_RECEIVER: Self = Self {
        max_data_len: 1024,
        max_token_amounts: 10,
    };
}

/// Everything the assembler needs besides the user's intent.
///
/// The default is the built-in chain registry, the reference receiver seeds,
/// no receiver limits and no event discriminators.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProtocolConfig {
    /// Extra chains. An entry whose selector is built in takes precedence.
    pub chains: Vec<ChainConfig>,
    pub seeds: SeedCatalog,
    pub receiver_limits: Option<ReceiverLimits>,
    pub event_discriminators: EventDiscriminators,
}

impl ProtocolConfig {
    pub fn from_json(json: &str) -> Result<Self, CcipError> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| CcipError::Config(format!("failed to parse config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String, CcipError> {
        serde_json::to_string_pretty(self)
            .map_err(|e| CcipError::Config(format!("failed to serialize config: {e}")))
    }

    fn validate(&self) -> Result<(), CcipError> {
        for (i, chain) in self.chains.iter().enumerate() {
            if self.chains[..i].iter().any(|c| c.selector == chain.selector) {
                return Err(CcipError::Config(format!(
                    "duplicate chain selector {}",
                    chain.selector
                )));
            }
        }
        Ok(())
    }

    /// Family of the chain behind `selector`, from configuration first and
    /// then the built-in registry.
    pub fn chain_family(&self, selector: u64) -> Result<ChainFamily, CcipError> {
        if let Some(chain) = self.chains.iter().find(|c| c.selector == selector) {
            return Ok(chain.family);
        }
        chains::get_chain(selector)
            .map(|c| c.family)
            .ok_or(CcipError::UnknownChain(selector))
    }

    pub fn chain_name(&self, selector: u64) -> Option<&str> {
        self.chains
            .iter()
            .find(|c| c.selector == selector)
            .map(|c| c.name.as_str())
            .or_else(|| chains::get_chain(selector).map(|c| c.name))
    }
}
