use alloy_primitives::Address;
use alloy_primitives::B256;

pub mod thor;

pub type BlockNr = u64;

/// Identifier of a named entity in the registry, as produced by namehash.
pub type NodeId = B256;

/// Render bytes as lower-case, `0x`-prefixed hex.
///
/// This is the canonical text form of node IDs and addresses in the store,
/// so that equality comparisons never depend on EIP-55 checksum casing.
pub fn hex_string(bytes: impl AsRef<[u8]>) -> String {
    format!("0x{}", hex::encode(bytes))
}

pub fn node_hex(node: &NodeId) -> String {
    hex_string(node)
}

pub fn address_hex(address: &Address) -> String {
    hex_string(address)
}
