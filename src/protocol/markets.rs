//! Lending market contract addresses per protocol and chain.

use alloy::primitives::address;

use crate::chain::{Address, ChainId};

use super::ProtocolKind;

const AAVE_V3_POOLS: &[(ChainId, Address)] = &[
    (ChainId::Ethereum, address!("87870Bca3F3fD6335C3F4ce8392D69350B4fA4E2")),
    (ChainId::Polygon, address!("794a61358D6845594F94dc1DB02A252b5b4814aD")),
    (ChainId::Arbitrum, address!("794a61358D6845594F94dc1DB02A252b5b4814aD")),
    (ChainId::Optimism, address!("794a61358D6845594F94dc1DB02A252b5b4814aD")),
    (ChainId::Base, address!("A238Dd80C259a72e81d7e4664a9801593F98d1c5")),
    (ChainId::Avalanche, address!("794a61358D6845594F94dc1DB02A252b5b4814aD")),
];

// USDC Comet deployments
const COMPOUND_V3_COMETS: &[(ChainId, Address)] = &[
    (ChainId::Ethereum, address!("c3d688B66703497DAA19211EEdff47f25384cdc3")),
    (ChainId::Polygon, address!("F25212E676D1F7F89Cd72fFEe66158f541246445")),
    (ChainId::Arbitrum, address!("A5EDBDD9646f8dFF606d7448e414884C7d905dCA")),
    (ChainId::Base, address!("b125E6687d4313864e53df431d5425969c15Eb2F")),
];

const SPARK_POOLS: &[(ChainId, Address)] = &[(
    ChainId::Ethereum,
    address!("C13e21B648A5Ee794902342038FF3aDAB66BE987"),
)];

const RADIANT_POOLS: &[(ChainId, Address)] = &[
    (ChainId::Arbitrum, address!("F4B1486DD74D07706052A33d31d7c0AAFD0659E1")),
    (ChainId::Avalanche, address!("F4B1486DD74D07706052A33d31d7c0AAFD0659E1")),
    (ChainId::Bsc, address!("d50Cf00b6e600Dd036Ba8eF475677d816d6c4281")),
];

fn table(protocol: ProtocolKind) -> &'static [(ChainId, Address)] {
    match protocol {
        ProtocolKind::AaveV3 => AAVE_V3_POOLS,
        ProtocolKind::CompoundV3 => COMPOUND_V3_COMETS,
        ProtocolKind::Spark => SPARK_POOLS,
        ProtocolKind::Radiant => RADIANT_POOLS,
    }
}

/// Market contract for a protocol on a chain, if deployed there.
pub fn market_address(protocol: ProtocolKind, chain: ChainId) -> Option<Address> {
    table(protocol)
        .iter()
        .find(|(c, _)| *c == chain)
        .map(|(_, addr)| *addr)
}

/// Chains on which a protocol has a registered market.
pub fn supported_chains(protocol: ProtocolKind) -> Vec<ChainId> {
    table(protocol).iter().map(|(chain, _)| *chain).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pool_address_is_checksummed() {
        let pool = market_address(ProtocolKind::AaveV3, ChainId::Ethereum).unwrap();
        assert_eq!(pool.to_string(), "0x87870Bca3F3fD6335C3F4ce8392D69350B4fA4E2");
    }

    #[test]
    fn test_support_matrix() {
        assert_eq!(supported_chains(ProtocolKind::Spark), vec![ChainId::Ethereum]);
        assert!(market_address(ProtocolKind::Spark, ChainId::Polygon).is_none());
        assert!(market_address(ProtocolKind::AaveV3, ChainId::Bsc).is_none());
        assert!(market_address(ProtocolKind::CompoundV3, ChainId::Optimism).is_none());
        assert!(market_address(ProtocolKind::Radiant, ChainId::Bsc).is_some());
    }

    #[test]
    fn test_radiant_binds_its_own_pool() {
        let radiant = market_address(ProtocolKind::Radiant, ChainId::Arbitrum).unwrap();
        let aave = market_address(ProtocolKind::AaveV3, ChainId::Arbitrum).unwrap();
        assert_ne!(radiant, aave);
    }
}
