//! Incremental indexer of a naming registry's on-chain events.
//!
//! Event logs are paged from a Thor node, decoded against fixed event
//! catalogues and folded into a SQLite projection answering "which resolver
//! serves this node", "what does it resolve to" and "what is the primary
//! name of this address".
pub mod error;
pub mod events;
pub mod namehash;
pub mod passes;
pub mod replay;
pub mod source;
pub mod store;

#[cfg(test)]
mod testing;

use alloy_primitives::Address;
use tracing::info_span;
use tracing::Instrument;

pub use crate::error::SyncError;
pub use crate::error::SyncResult;
use crate::passes::ResolverAssignmentPass;
use crate::passes::ResolverRecordPass;
use crate::replay::PassReport;
use crate::replay::ReplayEngine;
use crate::source::LogSource;
use crate::store::Store;

/// Reports of one full sync cycle.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CycleReport {
    pub resolvers: PassReport,
    pub records: PassReport,
}

/// Run both passes to the chain head, resolver assignments first.
pub async fn sync_cycle<S: LogSource>(
    source: &S,
    store: &Store,
    registry: Address,
) -> SyncResult<CycleReport> {
    let engine = ReplayEngine::new(source, store);

    let resolvers = engine
        .run(&ResolverAssignmentPass::new(registry))
        .instrument(info_span!("pass", name = "resolvers"))
        .await?;
    let records = engine
        .run(&ResolverRecordPass)
        .instrument(info_span!("pass", name = "records"))
        .await?;

    Ok(CycleReport { resolvers, records })
}
