use std::fmt;

use serde::{Deserialize, Serialize};

use crate::canonical::{AddressWidth, NativeAddress};

/// Execution model of a chain, which fixes its native address width and the
/// extra-args schemas it accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChainFamily {
    Evm,
    Svm,
}

impl ChainFamily {
    pub fn address_width(&self) -> AddressWidth {
        match self {
            ChainFamily::Evm => AddressWidth::Bytes20,
            ChainFamily::Svm => AddressWidth::Bytes32,
        }
    }

    /// Fee-token sentinel meaning "pay in the chain's native currency".
    pub fn native_fee_token(&self) -> NativeAddress {
        match self {
            ChainFamily::Evm => NativeAddress::Evm([0u8; 20]),
            ChainFamily::Svm => NativeAddress::Svm([0u8; 32]),
        }
    }
}

impl fmt::Display for ChainFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChainFamily::Evm => f.write_str("EVM"),
            ChainFamily::Svm => f.write_str("SVM"),
        }
    }
}

/// A chain reachable through the messaging protocol.
#[derive(Debug, Clone, Serialize)]
pub struct CcipChain {
    pub selector: u64,
    pub name: &'static str,
    pub family: ChainFamily,
    pub is_testnet: bool,
}

/// Ethereum Mainnet.
pub const ETHEREUM: CcipChain = CcipChain {
    selector: 5009297550715157269,
    name: "Ethereum",
    family: ChainFamily::Evm,
    is_testnet: false,
};

/// Ethereum Sepolia testnet.
pub const SEPOLIA: CcipChain = CcipChain {
    selector: 16015286601757825753,
    name: "Sepolia",
    family: ChainFamily::Evm,
    is_testnet: true,
};

/// Arbitrum Sepolia testnet.
pub const ARBITRUM_SEPOLIA: CcipChain = CcipChain {
    selector: 3478487238524512106,
    name: "Arbitrum Sepolia",
    family: ChainFamily::Evm,
    is_testnet: true,
};

/// Base Sepolia testnet.
pub const BASE_SEPOLIA: CcipChain = CcipChain {
    selector: 10344971235874465080,
    name: "Base Sepolia",
    family: ChainFamily::Evm,
    is_testnet: true,
};

/// Solana Mainnet.
pub const SOLANA: CcipChain = CcipChain {
    selector: 124615329519749607,
    name: "Solana",
    family: ChainFamily::Svm,
    is_testnet: false,
};

/// Solana Devnet.
pub const SOLANA_DEVNET: CcipChain = CcipChain {
    selector: 16423721717087811551,
    name: "Solana Devnet",
    family: ChainFamily::Svm,
    is_testnet: true,
};

const ALL_CHAINS: &[&CcipChain] = &[
    &ETHEREUM,
    &SEPOLIA,
    &ARBITRUM_SEPOLIA,
    &BASE_SEPOLIA,
    &SOLANA,
    &SOLANA_DEVNET,
];

/// Returns the chain definition for a given selector, or `None` if unknown.
pub fn get_chain(selector: u64) -> Option<&'static CcipChain> {
    ALL_CHAINS.iter().find(|c| c.selector == selector).copied()
}

/// Returns all built-in chain definitions.
pub fn supported_chains() -> Vec<&'static CcipChain> {
    ALL_CHAINS.to_vec()
}
