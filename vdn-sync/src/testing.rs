//! Fixtures shared by the unit tests of this crate.
use std::sync::Mutex;

use alloy::sol_types::SolEvent;
use alloy_primitives::Address;
use alloy_primitives::B256;
use async_trait::async_trait;
use vdn_messages::thor::LogMeta;
use vdn_messages::thor::LogQuery;
use vdn_messages::thor::Order;
use vdn_messages::thor::RawLog;
use vdn_messages::BlockNr;

use crate::error::SyncError;
use crate::error::SyncResult;
use crate::source::LogSource;

/// Build a raw log carrying `event`, as the node would return it.
pub(crate) fn raw_log<E: SolEvent>(
    emitter: Address,
    block_number: BlockNr,
    event: &E,
) -> RawLog {
    let data = event.encode_log_data();
    RawLog {
        address: emitter,
        topics: data.topics().to_vec(),
        data: data.data,
        meta: LogMeta {
            block_id: B256::left_padding_from(&block_number.to_be_bytes()),
            block_number,
            block_timestamp: 1_700_000_000 + block_number,
            tx_id: None,
            tx_origin: None,
            clause_index: None,
        },
    }
}

/// In-process log source serving a fixed list of logs with the node's
/// filtering and paging semantics.
pub(crate) struct MockSource {
    head: BlockNr,
    logs: Vec<RawLog>,
    fail_at_offset: Option<u64>,
    requests: Mutex<Vec<LogQuery>>,
}

impl MockSource {
    pub(crate) fn new(
        head: BlockNr,
        logs: Vec<RawLog>,
    ) -> Self {
        Self {
            head,
            logs,
            fail_at_offset: None,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Answer any page request at `offset` with a server error.
    pub(crate) fn failing_at(
        mut self,
        offset: u64,
    ) -> Self {
        self.fail_at_offset = Some(offset);
        self
    }

    pub(crate) fn requests(&self) -> Vec<LogQuery> {
        self.requests.lock().unwrap().clone()
    }

    pub(crate) fn offsets(&self) -> Vec<u64> {
        self.requests()
            .iter()
            .map(|query| query.options.offset)
            .collect()
    }
}

#[async_trait]
impl LogSource for MockSource {
    async fn current_height(&self) -> SyncResult<BlockNr> {
        Ok(self.head)
    }

    async fn query_logs(
        &self,
        query: &LogQuery,
    ) -> SyncResult<Vec<RawLog>> {
        self.requests.lock().unwrap().push(query.clone());

        if self.fail_at_offset == Some(query.options.offset) {
            return Err(SyncError::Status {
                url: "mock://logs/event".to_string(),
                status: reqwest::StatusCode::SERVICE_UNAVAILABLE,
            });
        }

        let mut matching: Vec<RawLog> = self
            .logs
            .iter()
            .filter(|log| query.range.contains(log.block_number()))
            .filter(|log| {
                query
                    .criteria_set
                    .iter()
                    .any(|criteria| criteria.matches(log))
            })
            .cloned()
            .collect();
        matching.sort_by_key(RawLog::block_number);
        if query.order == Order::Desc {
            matching.reverse();
        }

        Ok(matching
            .into_iter()
            .skip(query.options.offset as usize)
            .take(query.options.limit as usize)
            .collect())
    }
}
