//! Chain and protocol identifiers that scope every cache line

use num_enum::{IntoPrimitive, TryFromPrimitive};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Networks the router serves pools for, numbered by EVM chain id
#[repr(u32)]
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, TryFromPrimitive, IntoPrimitive, Serialize, Deserialize,
)]
#[serde(try_from = "u32", into = "u32")]
pub enum ChainId {
    Mainnet = 1,
    Goerli = 5,
    Optimism = 10,
    Bnb = 56,
    Polygon = 137,
    Base = 8453,
    Arbitrum = 42161,
    Celo = 42220,
    Avalanche = 43114,
    Sepolia = 11155111,
}

impl ChainId {
    /// Numeric chain id as used in cache keys
    pub fn id(self) -> u32 {
        self.into()
    }
}

impl fmt::Display for ChainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id())
    }
}

/// Pool schema family a cache line belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Protocol {
    V2,
    V3,
}

impl Protocol {
    pub fn as_str(&self) -> &'static str {
        match self {
            Protocol::V2 => "V2",
            Protocol::V3 => "V3",
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Protocol {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "V2" => Ok(Protocol::V2),
            "V3" => Ok(Protocol::V3),
            other => Err(format!("unknown protocol: {}", other)),
        }
    }
}
