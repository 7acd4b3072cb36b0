use alloy_primitives::Address;
use tracing::debug;
use vdn_messages::thor::Criteria;
use vdn_messages::thor::RawLog;
use vdn_messages::BlockNr;

use crate::error::SyncResult;
use crate::events::EventCatalogue;
use crate::events::NewResolver;
use crate::events::RegistryEvent;
use crate::replay::SyncPass;
use crate::store::Store;
use crate::store::Table;

/// Replays `NewResolver` from the registry contract.
#[derive(Clone, Debug)]
pub struct ResolverAssignmentPass {
    registry: Address,
}

impl ResolverAssignmentPass {
    pub fn new(registry: Address) -> Self {
        Self { registry }
    }
}

impl SyncPass for ResolverAssignmentPass {
    type Event = RegistryEvent;

    fn name(&self) -> &'static str {
        "resolvers"
    }

    fn checkpoint(
        &self,
        store: &Store,
    ) -> SyncResult<Option<BlockNr>> {
        store.max_block_height(Table::NodeResolvers)
    }

    fn criteria(&self) -> Vec<Criteria> {
        RegistryEvent::topics()
            .into_iter()
            .map(|topic| Criteria::topic0(topic).emitted_by(self.registry))
            .collect()
    }

    fn apply(
        &self,
        store: &Store,
        event: RegistryEvent,
        log: &RawLog,
    ) -> SyncResult<()> {
        match event {
            RegistryEvent::NewResolver(event) => {
                new_resolver(store, &event, log.block_number())
            },
        }
    }
}

fn new_resolver(
    store: &Store,
    event: &NewResolver,
    block_height: BlockNr,
) -> SyncResult<()> {
    debug!(
        "Resolver update. node: {} resolver: {} block: {}",
        event.node, event.resolver, block_height
    );
    store.upsert_node_resolver(&event.node, &event.resolver, block_height)?;
    store.upsert_node_projection_resolver(&event.node, &event.resolver, block_height)
}
