//! Cache key derivation
//!
//! Durable keys are shared with the offline jobs that publish pool snapshots,
//! so their format must not change between releases.

use crate::chain::{ChainId, Protocol};

/// Object key of a pool snapshot in the durable store
pub fn durable_key(base_key: &str, chain: ChainId, protocol: Protocol) -> String {
    format!("{}-{}-{}", base_key, chain.id(), protocol)
}

/// Local cache slot for a chain.
///
/// The protocol is not part of the key: every protocol on a chain shares one slot.
pub fn local_key(chain: ChainId) -> String {
    format!("pools{}", chain.id())
}
