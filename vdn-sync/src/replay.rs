//! Checkpointed replay of event logs into the store.
//!
//! A pass resumes one block past the highest height already present in its
//! tables and pages through `[from, head]` in ascending order until the
//! source returns an empty page. Each page is decoded and written in one
//! store transaction before the next page is requested, so an interrupted
//! run resumes from the last committed page.
use metrics::counter;
use metrics::gauge;
use tracing::debug;
use tracing::info;
use tracing::trace;
use vdn_messages::thor::BlockRange;
use vdn_messages::thor::Criteria;
use vdn_messages::thor::LogQuery;
use vdn_messages::thor::Order;
use vdn_messages::thor::QueryOptions;
use vdn_messages::thor::RawLog;
use vdn_messages::BlockNr;

use crate::error::SyncResult;
use crate::events::Decoded;
use crate::events::EventCatalogue;
use crate::source::LogSource;
use crate::store::Store;

/// Number of logs requested per page.
pub const PAGE_SIZE: u64 = 256;

/// What a pass replays and how each decoded event lands in the store.
pub trait SyncPass {
    type Event: EventCatalogue;

    fn name(&self) -> &'static str;

    /// Highest block height already reflected in the tables this pass writes.
    fn checkpoint(
        &self,
        store: &Store,
    ) -> SyncResult<Option<BlockNr>>;

    /// Server-side filter selecting the logs of this pass.
    fn criteria(&self) -> Vec<Criteria>;

    /// Write the effects of one decoded event.
    fn apply(
        &self,
        store: &Store,
        event: Self::Event,
        log: &RawLog,
    ) -> SyncResult<()>;
}

/// Summary of one completed pass.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PassReport {
    pub from: BlockNr,
    pub to: BlockNr,
    /// Page requests issued, including the final empty one.
    pub requests: u64,
    pub fetched: u64,
    pub applied: u64,
    pub skipped: u64,
}

pub struct ReplayEngine<'a, S> {
    source: &'a S,
    store: &'a Store,
}

impl<'a, S: LogSource> ReplayEngine<'a, S> {
    pub fn new(
        source: &'a S,
        store: &'a Store,
    ) -> Self {
        Self { source, store }
    }

    /// Catch `pass` up with the current chain head.
    ///
    /// Transport and store failures end the pass; everything committed
    /// before the failure stays in place.
    pub async fn run<P: SyncPass>(
        &self,
        pass: &P,
    ) -> SyncResult<PassReport> {
        let checkpoint = pass.checkpoint(self.store)?;
        let head = self.source.current_height().await?;

        let from = checkpoint.map_or(0, |height| height + 1);
        let mut report = PassReport {
            from,
            to: head,
            ..Default::default()
        };

        if from > head {
            info!(
                "Pass already at chain head. pass: {} checkpoint: {:?} head: {}",
                pass.name(),
                checkpoint,
                head
            );
            return Ok(report);
        }

        info!(
            "Replaying logs. pass: {} from: {} to: {}",
            pass.name(),
            from,
            head
        );

        let criteria_set = pass.criteria();
        let mut offset = 0;
        loop {
            let query = LogQuery {
                range: BlockRange::blocks(from, head),
                options: QueryOptions {
                    offset,
                    limit: PAGE_SIZE,
                },
                criteria_set: criteria_set.clone(),
                order: Order::Asc,
            };

            debug!(
                "Fetching logs. pass: {} offset: {}",
                pass.name(),
                offset
            );
            let logs = self.source.query_logs(&query).await?;
            report.requests += 1;
            counter!("vdn_sync_pages_fetched_total", "pass" => pass.name()).increment(1);

            if logs.is_empty() {
                break;
            }

            self.apply_logs(pass, &logs, &mut report)?;
            offset += PAGE_SIZE;
        }

        if let Some(height) = pass.checkpoint(self.store)? {
            gauge!("vdn_sync_checkpoint_height", "pass" => pass.name()).set(height as f64);
        }

        info!(
            "Pass complete. pass: {} fetched: {} applied: {} skipped: {}",
            pass.name(),
            report.fetched,
            report.applied,
            report.skipped
        );

        Ok(report)
    }

    /// Decode and apply one page of logs inside a single transaction.
    pub(crate) fn apply_logs<P: SyncPass>(
        &self,
        pass: &P,
        logs: &[RawLog],
        report: &mut PassReport,
    ) -> SyncResult<()> {
        let (applied, skipped) = self.store.transaction(|store| {
            let mut applied = 0u64;
            let mut skipped = 0u64;
            for log in logs {
                match P::Event::decode(log) {
                    Decoded::Matched(event) => {
                        trace!(
                            "Applying event. pass: {} event: {} block: {}",
                            pass.name(),
                            event.name(),
                            log.block_number()
                        );
                        pass.apply(store, event, log)?;
                        applied += 1;
                    },
                    Decoded::Unmatched => {
                        trace!(
                            "Skipping unrecognized log. pass: {} address: {} block: {}",
                            pass.name(),
                            log.address,
                            log.block_number()
                        );
                        skipped += 1;
                    },
                }
            }
            Ok((applied, skipped))
        })?;

        report.fetched += logs.len() as u64;
        report.applied += applied;
        report.skipped += skipped;
        counter!("vdn_sync_logs_fetched_total", "pass" => pass.name())
            .increment(logs.len() as u64);
        counter!("vdn_sync_events_applied_total", "pass" => pass.name()).increment(applied);
        counter!("vdn_sync_logs_skipped_total", "pass" => pass.name()).increment(skipped);

        Ok(())
    }
}
