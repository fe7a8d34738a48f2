//! Subgraph pool record schemas
//!
//! The cache never looks inside these records. They are here so each adapter
//! can name its payload type, and so that type can name its protocol tag.

use crate::chain::Protocol;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

/// Anything the cache core can deserialize, log a sample of, and share across tasks
pub trait PoolRecord: DeserializeOwned + Debug + Send + Sync + 'static {}

impl<T> PoolRecord for T where T: DeserializeOwned + Debug + Send + Sync + 'static {}

/// A pool schema bound to one protocol tag
pub trait SubgraphPool: PoolRecord {
    const PROTOCOL: Protocol;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubgraphToken {
    pub id: String,
}

/// Uniswap V2 style pair as exported from the subgraph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct V2SubgraphPool {
    pub id: String,
    pub token0: SubgraphToken,
    pub token1: SubgraphToken,
    pub supply: f64,
    pub reserve: f64,
    #[serde(rename = "reserveUSD")]
    pub reserve_usd: f64,
}

impl SubgraphPool for V2SubgraphPool {
    const PROTOCOL: Protocol = Protocol::V2;
}

/// Uniswap V3 style pool as exported from the subgraph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct V3SubgraphPool {
    pub id: String,
    /// Fee tier in hundredths of a bip, kept as the decimal string the subgraph emits
    #[serde(rename = "feeTier")]
    pub fee_tier: String,
    pub liquidity: String,
    pub token0: SubgraphToken,
    pub token1: SubgraphToken,
    #[serde(rename = "tvlETH")]
    pub tvl_eth: f64,
    #[serde(rename = "tvlUSD")]
    pub tvl_usd: f64,
}

impl SubgraphPool for V3SubgraphPool {
    const PROTOCOL: Protocol = Protocol::V3;
}
