use alloy_primitives::Address;
use tracing::debug;
use vdn_messages::thor::Criteria;
use vdn_messages::thor::RawLog;
use vdn_messages::BlockNr;
use vdn_messages::NodeId;

use crate::error::SyncResult;
use crate::events::AddrChanged;
use crate::events::ContenthashChanged;
use crate::events::DNSRecordChanged;
use crate::events::DNSRecordDeleted;
use crate::events::DNSZonehashChanged;
use crate::events::EventCatalogue;
use crate::events::NameChanged;
use crate::events::ResolverEvent;
use crate::events::TextChanged;
use crate::namehash::reverse_node;
use crate::replay::SyncPass;
use crate::store::RecordKind;
use crate::store::RecordValue;
use crate::store::Store;
use crate::store::Table;

/// Tables written by this pass; together they hold its checkpoint.
const CHECKPOINT_TABLES: [Table; 4] = [
    Table::NodeNames,
    Table::NodeAddresses,
    Table::Records,
    Table::RecordDeletions,
];

/// Replays record updates from every resolver.
///
/// Logs are selected by topic only, since any contract may act as a
/// resolver. Every write is keyed by the emitting address, and the node
/// projection only follows the resolver currently assigned to the node.
#[derive(Clone, Debug, Default)]
pub struct ResolverRecordPass;

impl SyncPass for ResolverRecordPass {
    type Event = ResolverEvent;

    fn name(&self) -> &'static str {
        "records"
    }

    fn checkpoint(
        &self,
        store: &Store,
    ) -> SyncResult<Option<BlockNr>> {
        let mut checkpoint = None;
        for table in CHECKPOINT_TABLES {
            checkpoint = checkpoint.max(store.max_block_height(table)?);
        }
        Ok(checkpoint)
    }

    fn criteria(&self) -> Vec<Criteria> {
        ResolverEvent::topics()
            .into_iter()
            .map(Criteria::topic0)
            .collect()
    }

    fn apply(
        &self,
        store: &Store,
        event: ResolverEvent,
        log: &RawLog,
    ) -> SyncResult<()> {
        let resolver = &log.address;
        let height = log.block_number();

        match event {
            ResolverEvent::NameChanged(event) => name_changed(store, resolver, &event, height),
            ResolverEvent::AddrChanged(event) => addr_changed(store, resolver, &event, height),
            ResolverEvent::TextChanged(event) => text_changed(store, resolver, event, height),
            ResolverEvent::ContenthashChanged(event) => {
                contenthash_changed(store, resolver, event, height)
            },
            ResolverEvent::DNSRecordChanged(event) => {
                dns_record_changed(store, resolver, event, height)
            },
            ResolverEvent::DNSRecordDeleted(event) => {
                dns_record_deleted(store, resolver, &event, height)
            },
            ResolverEvent::DNSZonehashChanged(event) => {
                dns_zonehash_changed(store, resolver, event, height)
            },
        }
    }
}

fn name_changed(
    store: &Store,
    resolver: &Address,
    event: &NameChanged,
    height: BlockNr,
) -> SyncResult<()> {
    debug!("Name changed. node: {} name: {}", event.node, event.name);
    store.upsert_name_record(resolver, &event.node, &event.name, height)?;
    store.update_node_name(resolver, &event.node, &event.name, height)?;
    Ok(())
}

fn addr_changed(
    store: &Store,
    resolver: &Address,
    event: &AddrChanged,
    height: BlockNr,
) -> SyncResult<()> {
    debug!("Address changed. node: {} address: {}", event.node, event.a);
    store.upsert_address_record(resolver, &event.node, &event.a, height)?;
    store.update_node_address(resolver, &event.node, &event.a, &reverse_node(&event.a), height)?;
    Ok(())
}

fn text_changed(
    store: &Store,
    resolver: &Address,
    event: TextChanged,
    height: BlockNr,
) -> SyncResult<()> {
    debug!(
        "Text changed. node: {} key: {} value: {}",
        event.node, event.key, event.value
    );
    store.upsert_record(
        &event.node,
        resolver,
        &RecordKind::Text { key: event.key },
        &RecordValue::Text(event.value),
        height,
    )
}

fn contenthash_changed(
    store: &Store,
    resolver: &Address,
    event: ContenthashChanged,
    height: BlockNr,
) -> SyncResult<()> {
    debug!("Content hash changed. node: {} hash: {:?}", event.node, event.hash);
    write_or_delete(
        store,
        resolver,
        &event.node,
        &RecordKind::Contenthash,
        event.hash.to_vec(),
        height,
    )
}

fn dns_record_changed(
    store: &Store,
    resolver: &Address,
    event: DNSRecordChanged,
    height: BlockNr,
) -> SyncResult<()> {
    let kind = RecordKind::dns(&event.name, event.resource);
    debug!(
        "DNS record changed. node: {} key: {} record: {:?}",
        event.node,
        kind.key(),
        event.record
    );
    write_or_delete(store, resolver, &event.node, &kind, event.record.to_vec(), height)
}

fn dns_record_deleted(
    store: &Store,
    resolver: &Address,
    event: &DNSRecordDeleted,
    height: BlockNr,
) -> SyncResult<()> {
    let kind = RecordKind::dns(&event.name, event.resource);
    debug!("DNS record deleted. node: {} key: {}", event.node, kind.key());
    store.delete_record(&event.node, resolver, &kind, height)?;
    Ok(())
}

fn dns_zonehash_changed(
    store: &Store,
    resolver: &Address,
    event: DNSZonehashChanged,
    height: BlockNr,
) -> SyncResult<()> {
    debug!(
        "DNS zone hash changed. node: {} zonehash: {:?}",
        event.node, event.zonehash
    );
    store.upsert_record(
        &event.node,
        resolver,
        &RecordKind::Zonehash,
        &RecordValue::Bytes(event.zonehash.to_vec()),
        height,
    )
}

/// An empty value clears the record instead of storing zero bytes.
fn write_or_delete(
    store: &Store,
    resolver: &Address,
    node: &NodeId,
    kind: &RecordKind,
    value: Vec<u8>,
    height: BlockNr,
) -> SyncResult<()> {
    if value.is_empty() {
        store.delete_record(node, resolver, kind, height)?;
        return Ok(());
    }
    store.upsert_record(node, resolver, kind, &RecordValue::Bytes(value), height)
}
