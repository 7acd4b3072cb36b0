use alloy_primitives::keccak256;
use alloy_primitives::Address;
use vdn_messages::NodeId;

/// Suffix of the namespace holding reverse records.
pub const REVERSE_SUFFIX: &str = "addr.reverse";

/// Node ID of a dotted name, following the EIP-137 namehash scheme.
///
/// Labels are hashed as given; the caller is responsible for normalising
/// the name first.
pub fn namehash(name: &str) -> NodeId {
    if name.is_empty() {
        return NodeId::ZERO;
    }

    name.rsplit('.').fold(NodeId::ZERO, |node, label| {
        let mut buffer = [0u8; 64];
        buffer[..32].copy_from_slice(node.as_slice());
        buffer[32..].copy_from_slice(keccak256(label.as_bytes()).as_slice());
        keccak256(buffer)
    })
}

/// Node under which the primary name of `address` is published:
/// `namehash("<lower-case hex without 0x>.addr.reverse")`.
pub fn reverse_node(address: &Address) -> NodeId {
    namehash(&format!("{}.{REVERSE_SUFFIX}", hex::encode(address)))
}
