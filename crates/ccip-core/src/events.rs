//! Identification of receiver program events in transaction logs.
//!
//! Each event payload starts with an 8-byte discriminator. The values depend
//! on how the receiver program was built, so they come from configuration
//! and are never derived here.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::CcipError;

/// Length of an event discriminator.
pub const DISCRIMINATOR_LEN: usize = 8;

/// Event names emitted by the reference receiver program.
pub const RECEIVER_INITIALIZED: &str = "ReceiverInitialized";
pub const MESSAGE_RECEIVED: &str = "MessageReceived";
pub const TOKEN_RECEIVED: &str = "TokenReceived";
pub const TOKENS_FORWARDED: &str = "TokensForwarded";

/// Event name to discriminator map. Serialized as `{ name: "hex" }`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventDiscriminators {
    entries: BTreeMap<String, [u8; DISCRIMINATOR_LEN]>,
}

impl EventDiscriminators {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, discriminator: [u8; DISCRIMINATOR_LEN]) {
        self.entries.insert(name.into(), discriminator);
    }

    pub fn get(&self, name: &str) -> Result<[u8; DISCRIMINATOR_LEN], CcipError> {
        self.entries
            .get(name)
            .copied()
            .ok_or_else(|| CcipError::Config(format!("no discriminator configured for event {name}")))
    }

    /// Name of the event whose discriminator prefixes `log_data`, if any.
    pub fn identify(&self, log_data: &[u8]) -> Option<&str> {
        let prefix = log_data.get(..DISCRIMINATOR_LEN)?;
        self.entries
            .iter()
            .find(|(_, d)| d.as_slice() == prefix)
            .map(|(name, _)| name.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for EventDiscriminators {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.entries.iter().map(|(k, v)| (k, hex::encode(v))))
    }
}

impl<'de> Deserialize<'de> for EventDiscriminators {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = BTreeMap::<String, String>::deserialize(deserializer)?;
        let mut entries = BTreeMap::new();
        for (name, value) in raw {
            let hex_part = value.strip_prefix("0x").unwrap_or(&value);
            let bytes = hex::decode(hex_part).map_err(serde::de::Error::custom)?;
            let discriminator: [u8; DISCRIMINATOR_LEN] = bytes.try_into().map_err(|v: Vec<u8>| {
                serde::de::Error::custom(format!(
                    "discriminator for {name} must be {DISCRIMINATOR_LEN} bytes, got {}",
                    v.len()
                ))
            })?;
            entries.insert(name, discriminator);
        }
        Ok(Self { entries })
    }
}
