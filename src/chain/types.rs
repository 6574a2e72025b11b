//! Chain identifiers and integer scaling.

use alloy::primitives::U256;
use serde::{Deserialize, Serialize};
use std::fmt;

/// EVM networks the sentinel knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChainId {
    Ethereum,
    Polygon,
    Arbitrum,
    Optimism,
    Base,
    Avalanche,
    Bsc,
}

impl ChainId {
    /// Every supported chain, in display order.
    pub const ALL: [ChainId; 7] = [
        ChainId::Ethereum,
        ChainId::Polygon,
        ChainId::Arbitrum,
        ChainId::Optimism,
        ChainId::Base,
        ChainId::Avalanche,
        ChainId::Bsc,
    ];

    /// Numeric EIP-155 chain id.
    pub fn id(&self) -> u64 {
        match self {
            ChainId::Ethereum => 1,
            ChainId::Polygon => 137,
            ChainId::Arbitrum => 42161,
            ChainId::Optimism => 10,
            ChainId::Base => 8453,
            ChainId::Avalanche => 43114,
            ChainId::Bsc => 56,
        }
    }

    /// Look up a chain by its numeric id.
    pub fn from_id(id: u64) -> Option<Self> {
        Self::ALL.into_iter().find(|chain| chain.id() == id)
    }

    /// Human readable network name.
    pub fn name(&self) -> &'static str {
        match self {
            ChainId::Ethereum => "Ethereum",
            ChainId::Polygon => "Polygon",
            ChainId::Arbitrum => "Arbitrum",
            ChainId::Optimism => "Optimism",
            ChainId::Base => "Base",
            ChainId::Avalanche => "Avalanche",
            ChainId::Bsc => "BSC",
        }
    }
}

impl fmt::Display for ChainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name(), self.id())
    }
}

impl TryFrom<u64> for ChainId {
    type Error = u64;

    fn try_from(id: u64) -> Result<Self, Self::Error> {
        Self::from_id(id).ok_or(id)
    }
}

/// Integer value divided by a decimal scaling factor (e.g. `1e8`).
///
/// `U256::MAX` converts to roughly `1.16e77`, never to infinity.
pub fn scale_down(value: U256, divisor: f64) -> f64 {
    let float = match u128::try_from(value) {
        Ok(small) => small as f64,
        Err(_) => value
            .as_limbs()
            .iter()
            .rev()
            .fold(0.0, |acc, limb| acc * 18_446_744_073_709_551_616.0 + *limb as f64),
    };
    float / divisor
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chain_lookup() {
        assert_eq!(ChainId::from_id(42161), Some(ChainId::Arbitrum));
        assert_eq!(ChainId::from_id(56), Some(ChainId::Bsc));
        assert_eq!(ChainId::from_id(250), None);
        assert_eq!(ChainId::try_from(250u64), Err(250));
        assert_eq!(ChainId::Base.to_string(), "Base (8453)");
    }

    #[test]
    fn test_scale_down() {
        assert_eq!(scale_down(U256::from(500_000_000_000u128), 1e8), 5000.0);
        assert_eq!(scale_down(U256::from(1_650_000_000_000_000_000u128), 1e18), 1.65);
        assert_eq!(scale_down(U256::ZERO, 1e18), 0.0);

        let max = scale_down(U256::MAX, 1.0);
        assert!(max.is_finite() && max > 1e77);
    }
}
