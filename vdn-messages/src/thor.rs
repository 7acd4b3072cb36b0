//! Request and response bodies of the Thor REST log API.
//!
//! Only the subset needed to page through event logs is modelled: the
//! `/blocks/best` head query and the `/logs/event` filter query.
use alloy_primitives::Address;
use alloy_primitives::Bytes;
use alloy_primitives::B256;
use serde_derive::Deserialize;
use serde_derive::Serialize;

use crate::BlockNr;

/// Response of `GET /blocks/best`. Only the height is of interest.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct BestBlock {
    pub number: BlockNr,
    pub id: Option<B256>,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RangeUnit {
    #[default]
    Block,
    Time,
}

/// An inclusive range of blocks.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct BlockRange {
    pub unit: RangeUnit,
    pub from: BlockNr,
    pub to: BlockNr,
}

impl BlockRange {
    pub fn blocks(
        from: BlockNr,
        to: BlockNr,
    ) -> Self {
        Self {
            unit: RangeUnit::Block,
            from,
            to,
        }
    }

    pub fn contains(
        &self,
        height: BlockNr,
    ) -> bool {
        self.from <= height && height <= self.to
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Order {
    #[default]
    Asc,
    Desc,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct QueryOptions {
    pub offset: u64,
    pub limit: u64,
}

/// One entry of a criteria set. Entries of a set are OR'd server side, the
/// fields inside an entry are AND'd.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Criteria {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<Address>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub topic0: Option<B256>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub topic1: Option<B256>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub topic2: Option<B256>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub topic3: Option<B256>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub topic4: Option<B256>,
}

impl Criteria {
    /// Match every log whose first topic is `topic0`, whatever its emitter.
    pub fn topic0(topic0: B256) -> Self {
        Self {
            topic0: Some(topic0),
            ..Default::default()
        }
    }

    /// Restrict this criterion to logs emitted by `address`.
    pub fn emitted_by(
        mut self,
        address: Address,
    ) -> Self {
        self.address = Some(address);
        self
    }

    /// Whether `log` satisfies this criterion.
    pub fn matches(
        &self,
        log: &RawLog,
    ) -> bool {
        if self
            .address
            .is_some_and(|address| address != log.address)
        {
            return false;
        }

        [
            self.topic0,
            self.topic1,
            self.topic2,
            self.topic3,
            self.topic4,
        ]
        .iter()
        .enumerate()
        .all(|(i, expected)| {
            match expected {
                Some(expected) => log.topics.get(i) == Some(expected),
                None => true,
            }
        })
    }
}

/// Body of `POST /logs/event`.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct LogQuery {
    pub range: BlockRange,
    pub options: QueryOptions,
    #[serde(rename = "criteriaSet")]
    pub criteria_set: Vec<Criteria>,
    pub order: Order,
}

/// Where and when a log was emitted.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct LogMeta {
    #[serde(rename = "blockID")]
    pub block_id: B256,
    #[serde(rename = "blockNumber")]
    pub block_number: BlockNr,
    #[serde(rename = "blockTimestamp")]
    pub block_timestamp: u64,
    #[serde(rename = "txID", default, skip_serializing_if = "Option::is_none")]
    pub tx_id: Option<B256>,
    #[serde(rename = "txOrigin", default, skip_serializing_if = "Option::is_none")]
    pub tx_origin: Option<Address>,
    #[serde(rename = "clauseIndex", default, skip_serializing_if = "Option::is_none")]
    pub clause_index: Option<u32>,
}

/// An undecoded event log as returned by the node.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct RawLog {
    pub address: Address,
    pub topics: Vec<B256>,
    pub data: Bytes,
    pub meta: LogMeta,
}

impl RawLog {
    pub fn block_number(&self) -> BlockNr {
        self.meta.block_number
    }
}
