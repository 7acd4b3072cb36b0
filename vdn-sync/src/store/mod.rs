//! The derived store: a SQLite projection of registry and resolver events.
//!
//! Every row carries the height of the block that last wrote it. Writes
//! overwrite by primary key, so replaying events in ascending block order
//! leaves the latest value for each key.
use std::path::Path;
use std::str::FromStr;

use alloy_primitives::Address;
use rusqlite::params;
use rusqlite::types::Type;
use rusqlite::Connection;
use rusqlite::OpenFlags;
use rusqlite::OptionalExtension;
use rusqlite::Row;
use tracing::debug;
use vdn_messages::address_hex;
use vdn_messages::node_hex;
use vdn_messages::BlockNr;
use vdn_messages::NodeId;

use crate::error::SyncResult;

mod record;
mod schema;

pub use record::RecordKind;
pub use record::RecordValue;

/// Tables whose maximum block height serves as a checkpoint.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Table {
    NodeResolvers,
    NodeAddresses,
    NodeNames,
    Nodes,
    Records,
    RecordDeletions,
}

impl Table {
    pub fn name(&self) -> &'static str {
        match self {
            Table::NodeResolvers => "node_resolvers",
            Table::NodeAddresses => "node_addresses",
            Table::NodeNames => "node_names",
            Table::Nodes => "nodes",
            Table::Records => "records",
            Table::RecordDeletions => "record_deletions",
        }
    }
}

/// Current state of a node, denormalised from the other tables.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NodeRow {
    pub node: NodeId,
    pub reverse_node: Option<NodeId>,
    pub resolver: Option<Address>,
    pub address: Option<Address>,
    pub name: Option<String>,
    pub block_height: BlockNr,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PrimaryName {
    pub name: String,
    pub block_height: BlockNr,
}

/// A value together with the height it was written at.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Versioned<T> {
    pub value: T,
    pub block_height: BlockNr,
}

pub struct Store {
    conn: Connection,
}

impl Store {
    /// Open (or create) the database at `path` and make sure the schema exists.
    pub fn open(path: impl AsRef<Path>) -> SyncResult<Self> {
        let conn = Connection::open(path.as_ref())?;
        let journal_mode: String =
            conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))?;
        debug!(
            "Opened store. path: {:?} journal_mode: {}",
            path.as_ref(),
            journal_mode
        );
        Self::with_connection(conn)
    }

    /// Open an existing database for lookups only. Nothing is created when
    /// `path` does not exist, and every write fails.
    pub fn open_read_only(path: impl AsRef<Path>) -> SyncResult<Self> {
        let conn = Connection::open_with_flags(path.as_ref(), OpenFlags::SQLITE_OPEN_READ_ONLY)?;
        debug!("Opened store read-only. path: {:?}", path.as_ref());
        Ok(Self { conn })
    }

    /// A throwaway store, mostly useful in tests.
    pub fn in_memory() -> SyncResult<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> SyncResult<Self> {
        let store = Self { conn };
        store.ensure_schema()?;
        Ok(store)
    }

    pub fn ensure_schema(&self) -> SyncResult<()> {
        self.conn.execute_batch(schema::SCHEMA)?;
        Ok(())
    }

    /// Run `f` inside one transaction; nothing it wrote survives an error.
    pub fn transaction<T>(
        &self,
        f: impl FnOnce(&Self) -> SyncResult<T>,
    ) -> SyncResult<T> {
        let tx = self.conn.unchecked_transaction()?;
        let result = f(self)?;
        tx.commit()?;
        Ok(result)
    }

    /// Highest block height recorded in `table`, if any row exists.
    pub fn max_block_height(
        &self,
        table: Table,
    ) -> SyncResult<Option<BlockNr>> {
        let sql = format!("SELECT MAX(block_height) FROM {}", table.name());
        let height: Option<i64> = self.conn.query_row(&sql, [], |row| row.get(0))?;
        Ok(height.map(from_sql_height))
    }

    pub fn upsert_node_resolver(
        &self,
        node: &NodeId,
        resolver: &Address,
        block_height: BlockNr,
    ) -> SyncResult<()> {
        self.conn
            .prepare_cached(
                "INSERT OR REPLACE INTO node_resolvers (node, resolver_address, block_height)
                 VALUES (?1, ?2, ?3)",
            )?
            .execute(params![
                node_hex(node),
                address_hex(resolver),
                to_sql_height(block_height),
            ])?;
        Ok(())
    }

    /// Point the projection row of `node` at `resolver`, creating the row if
    /// needed. Address, name and reverse node of an existing row are kept.
    pub fn upsert_node_projection_resolver(
        &self,
        node: &NodeId,
        resolver: &Address,
        block_height: BlockNr,
    ) -> SyncResult<()> {
        self.conn
            .prepare_cached(
                "INSERT INTO nodes (node, resolver_address, block_height) VALUES (?1, ?2, ?3)
                 ON CONFLICT (node) DO UPDATE SET
                    resolver_address = excluded.resolver_address,
                    block_height = excluded.block_height",
            )?
            .execute(params![
                node_hex(node),
                address_hex(resolver),
                to_sql_height(block_height),
            ])?;
        Ok(())
    }

    pub fn upsert_name_record(
        &self,
        resolver: &Address,
        node: &NodeId,
        name: &str,
        block_height: BlockNr,
    ) -> SyncResult<()> {
        self.conn
            .prepare_cached(
                "INSERT OR REPLACE INTO node_names (resolver_address, node, name, block_height)
                 VALUES (?1, ?2, ?3, ?4)",
            )?
            .execute(params![
                address_hex(resolver),
                node_hex(node),
                name,
                to_sql_height(block_height),
            ])?;
        Ok(())
    }

    /// Set the name of `node` if `resolver` is its current resolver.
    /// Returns the number of projection rows touched.
    pub fn update_node_name(
        &self,
        resolver: &Address,
        node: &NodeId,
        name: &str,
        block_height: BlockNr,
    ) -> SyncResult<usize> {
        let updated = self
            .conn
            .prepare_cached(
                "UPDATE nodes SET name = ?1, block_height = ?2
                 WHERE node = ?3 AND resolver_address = ?4",
            )?
            .execute(params![
                name,
                to_sql_height(block_height),
                node_hex(node),
                address_hex(resolver),
            ])?;
        Ok(updated)
    }

    pub fn upsert_address_record(
        &self,
        resolver: &Address,
        node: &NodeId,
        address: &Address,
        block_height: BlockNr,
    ) -> SyncResult<()> {
        self.conn
            .prepare_cached(
                "INSERT OR REPLACE INTO node_addresses (resolver_address, node, address, block_height)
                 VALUES (?1, ?2, ?3, ?4)",
            )?
            .execute(params![
                address_hex(resolver),
                node_hex(node),
                address_hex(address),
                to_sql_height(block_height),
            ])?;
        Ok(())
    }

    /// Set the address and reverse node of `node` if `resolver` is its
    /// current resolver. Returns the number of projection rows touched.
    pub fn update_node_address(
        &self,
        resolver: &Address,
        node: &NodeId,
        address: &Address,
        reverse_node: &NodeId,
        block_height: BlockNr,
    ) -> SyncResult<usize> {
        let updated = self
            .conn
            .prepare_cached(
                "UPDATE nodes SET address = ?1, reverse_node = ?2, block_height = ?3
                 WHERE node = ?4 AND resolver_address = ?5",
            )?
            .execute(params![
                address_hex(address),
                node_hex(reverse_node),
                to_sql_height(block_height),
                node_hex(node),
                address_hex(resolver),
            ])?;
        Ok(updated)
    }

    pub fn upsert_record(
        &self,
        node: &NodeId,
        resolver: &Address,
        kind: &RecordKind,
        value: &RecordValue,
        block_height: BlockNr,
    ) -> SyncResult<()> {
        self.conn
            .prepare_cached(
                "INSERT OR REPLACE INTO records
                    (node, resolver_address, record_type, record_key, value, block_height)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            )?
            .execute(params![
                node_hex(node),
                address_hex(resolver),
                kind.type_tag(),
                kind.key(),
                value,
                to_sql_height(block_height),
            ])?;
        self.conn
            .prepare_cached(
                "DELETE FROM record_deletions
                 WHERE node = ?1 AND resolver_address = ?2 AND record_type = ?3 AND record_key = ?4",
            )?
            .execute(params![
                node_hex(node),
                address_hex(resolver),
                kind.type_tag(),
                kind.key(),
            ])?;
        Ok(())
    }

    /// Remove a record and remember the height it was removed at.
    /// Returns the number of record rows removed.
    pub fn delete_record(
        &self,
        node: &NodeId,
        resolver: &Address,
        kind: &RecordKind,
        block_height: BlockNr,
    ) -> SyncResult<usize> {
        let deleted = self
            .conn
            .prepare_cached(
                "DELETE FROM records
                 WHERE node = ?1 AND resolver_address = ?2 AND record_type = ?3 AND record_key = ?4",
            )?
            .execute(params![
                node_hex(node),
                address_hex(resolver),
                kind.type_tag(),
                kind.key(),
            ])?;
        self.conn
            .prepare_cached(
                "INSERT OR REPLACE INTO record_deletions
                    (node, resolver_address, record_type, record_key, block_height)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
            )?
            .execute(params![
                node_hex(node),
                address_hex(resolver),
                kind.type_tag(),
                kind.key(),
                to_sql_height(block_height),
            ])?;
        Ok(deleted)
    }

    /// The resolver last assigned to `node` by the registry.
    pub fn resolver_assignment(
        &self,
        node: &NodeId,
    ) -> SyncResult<Option<Versioned<Address>>> {
        let assignment = self
            .conn
            .prepare_cached(
                "SELECT resolver_address, block_height FROM node_resolvers WHERE node = ?1",
            )?
            .query_row(params![node_hex(node)], |row| {
                Ok(Versioned {
                    value: required_hex_column(row, 0)?,
                    block_height: from_sql_height(row.get(1)?),
                })
            })
            .optional()?;
        Ok(assignment)
    }

    pub fn name_record(
        &self,
        resolver: &Address,
        node: &NodeId,
    ) -> SyncResult<Option<Versioned<String>>> {
        let name = self
            .conn
            .prepare_cached(
                "SELECT name, block_height FROM node_names
                 WHERE resolver_address = ?1 AND node = ?2",
            )?
            .query_row(params![address_hex(resolver), node_hex(node)], |row| {
                Ok(Versioned {
                    value: row.get(0)?,
                    block_height: from_sql_height(row.get(1)?),
                })
            })
            .optional()?;
        Ok(name)
    }

    pub fn address_record(
        &self,
        resolver: &Address,
        node: &NodeId,
    ) -> SyncResult<Option<Versioned<Address>>> {
        let address = self
            .conn
            .prepare_cached(
                "SELECT address, block_height FROM node_addresses
                 WHERE resolver_address = ?1 AND node = ?2",
            )?
            .query_row(params![address_hex(resolver), node_hex(node)], |row| {
                Ok(Versioned {
                    value: required_hex_column(row, 0)?,
                    block_height: from_sql_height(row.get(1)?),
                })
            })
            .optional()?;
        Ok(address)
    }

    /// The projection row of `node`.
    pub fn node(
        &self,
        node: &NodeId,
    ) -> SyncResult<Option<NodeRow>> {
        let row = self
            .conn
            .prepare_cached(
                "SELECT node, reverse_node, resolver_address, address, name, block_height
                 FROM nodes WHERE node = ?1",
            )?
            .query_row(params![node_hex(node)], |row| {
                Ok(NodeRow {
                    node: required_hex_column(row, 0)?,
                    reverse_node: hex_column(row, 1)?,
                    resolver: hex_column(row, 2)?,
                    address: hex_column(row, 3)?,
                    name: row.get(4)?,
                    block_height: from_sql_height(row.get(5)?),
                })
            })
            .optional()?;
        Ok(row)
    }

    pub fn resolver_of(
        &self,
        node: &NodeId,
    ) -> SyncResult<Option<Address>> {
        Ok(self.node(node)?.and_then(|row| row.resolver))
    }

    pub fn address_of(
        &self,
        node: &NodeId,
    ) -> SyncResult<Option<Address>> {
        Ok(self.node(node)?.and_then(|row| row.address))
    }

    pub fn name_of(
        &self,
        node: &NodeId,
    ) -> SyncResult<Option<String>> {
        Ok(self.node(node)?.and_then(|row| row.name))
    }

    /// Name published under the reverse node of `address`, taken from the
    /// most recently written node that resolves to `address`.
    pub fn primary_name(
        &self,
        address: &Address,
    ) -> SyncResult<Option<PrimaryName>> {
        let found = self
            .conn
            .prepare_cached("SELECT name, block_height FROM primary_names WHERE address = ?1")?
            .query_row(params![address_hex(address)], |row| {
                let name: Option<String> = row.get(0)?;
                let block_height = from_sql_height(row.get(1)?);
                Ok(name.map(|name| {
                    PrimaryName {
                        name,
                        block_height,
                    }
                }))
            })
            .optional()?;
        Ok(found.flatten())
    }

    /// Record of `node` as served by its current resolver.
    pub fn record(
        &self,
        node: &NodeId,
        kind: &RecordKind,
    ) -> SyncResult<Option<RecordValue>> {
        let value = self
            .conn
            .prepare_cached(
                "SELECT r.value FROM records r
                 JOIN nodes n ON n.node = r.node AND n.resolver_address = r.resolver_address
                 WHERE r.node = ?1 AND r.record_type = ?2 AND r.record_key = ?3",
            )?
            .query_row(
                params![node_hex(node), kind.type_tag(), kind.key()],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }

    /// Record of `node` as written by `resolver`, whether or not it still
    /// serves the node.
    pub fn resolver_record(
        &self,
        resolver: &Address,
        node: &NodeId,
        kind: &RecordKind,
    ) -> SyncResult<Option<Versioned<RecordValue>>> {
        let value = self
            .conn
            .prepare_cached(
                "SELECT value, block_height FROM records
                 WHERE node = ?1 AND resolver_address = ?2 AND record_type = ?3 AND record_key = ?4",
            )?
            .query_row(
                params![
                    node_hex(node),
                    address_hex(resolver),
                    kind.type_tag(),
                    kind.key(),
                ],
                |row| {
                    Ok(Versioned {
                        value: row.get(0)?,
                        block_height: from_sql_height(row.get(1)?),
                    })
                },
            )
            .optional()?;
        Ok(value)
    }

    /// Every row of every table, rendered in a stable order.
    #[cfg(test)]
    pub(crate) fn dump(&self) -> SyncResult<Vec<String>> {
        let mut rows = Vec::new();
        for table in [
            Table::NodeResolvers,
            Table::NodeAddresses,
            Table::NodeNames,
            Table::Nodes,
            Table::Records,
            Table::RecordDeletions,
        ] {
            let mut stmt = self
                .conn
                .prepare(&format!("SELECT * FROM {}", table.name()))?;
            let columns = stmt.column_count();
            let mut query = stmt.query([])?;
            while let Some(row) = query.next()? {
                let values = (0..columns)
                    .map(|i| row.get_ref(i).map(|value| format!("{value:?}")))
                    .collect::<rusqlite::Result<Vec<_>>>()?;
                rows.push(format!("{}: {}", table.name(), values.join(", ")));
            }
        }
        rows.sort();
        Ok(rows)
    }
}

// SQLite integers are signed; heights never come close to the limit.
fn to_sql_height(height: BlockNr) -> i64 {
    i64::try_from(height).unwrap_or(i64::MAX)
}

fn from_sql_height(height: i64) -> BlockNr {
    BlockNr::try_from(height).unwrap_or_default()
}

fn hex_column<T>(
    row: &Row<'_>,
    idx: usize,
) -> rusqlite::Result<Option<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let text: Option<String> = row.get(idx)?;
    text.map(|text| {
        text.parse::<T>().map_err(|err| {
            rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(err))
        })
    })
    .transpose()
}

fn required_hex_column<T>(
    row: &Row<'_>,
    idx: usize,
) -> rusqlite::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    hex_column(row, idx)?.ok_or(rusqlite::Error::InvalidColumnType(
        idx,
        "NULL".to_string(),
        Type::Null,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::namehash::reverse_node;

    fn node(n: u8) -> NodeId {
        NodeId::with_last_byte(n)
    }

    #[test]
    fn test_schema_is_idempotent() -> SyncResult<()> {
        let store = Store::in_memory()?;
        store.ensure_schema()?;
        store.ensure_schema()?;

        for table in [
            Table::NodeResolvers,
            Table::NodeAddresses,
            Table::NodeNames,
            Table::Nodes,
            Table::Records,
            Table::RecordDeletions,
        ] {
            assert_eq!(store.max_block_height(table)?, None, "{}", table.name());
        }
        Ok(())
    }

    #[test]
    fn test_open_on_disk_persists_rows() -> SyncResult<()> {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("index.db");
        let resolver = Address::repeat_byte(0x11);

        {
            let store = Store::open(&path)?;
            store.upsert_node_resolver(&node(1), &resolver, 42)?;
        }

        let store = Store::open(&path)?;
        assert_eq!(store.max_block_height(Table::NodeResolvers)?, Some(42));
        assert_eq!(
            store.resolver_assignment(&node(1))?,
            Some(Versioned {
                value: resolver,
                block_height: 42
            })
        );
        Ok(())
    }

    #[test]
    fn test_read_only_open_never_creates_database() -> SyncResult<()> {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("index.db");
        let resolver = Address::repeat_byte(0x11);

        assert!(Store::open_read_only(&path).is_err());
        assert!(!path.exists());

        {
            let store = Store::open(&path)?;
            store.upsert_node_projection_resolver(&node(1), &resolver, 42)?;
        }

        let store = Store::open_read_only(&path)?;
        assert_eq!(store.resolver_of(&node(1))?, Some(resolver));
        assert!(store.upsert_node_resolver(&node(2), &resolver, 43).is_err());
        Ok(())
    }

    #[test]
    fn test_projection_upsert_keeps_other_columns() -> SyncResult<()> {
        let store = Store::in_memory()?;
        let r1 = Address::repeat_byte(0x11);
        let r2 = Address::repeat_byte(0x22);
        let a1 = Address::repeat_byte(0xa1);

        store.upsert_node_projection_resolver(&node(1), &r1, 100)?;
        store.update_node_name(&r1, &node(1), "alice", 105)?;
        store.update_node_address(&r1, &node(1), &a1, &reverse_node(&a1), 110)?;
        store.upsert_node_projection_resolver(&node(1), &r2, 120)?;

        let row = store.node(&node(1))?.unwrap();
        assert_eq!(row.resolver, Some(r2));
        assert_eq!(row.name.as_deref(), Some("alice"));
        assert_eq!(row.address, Some(a1));
        assert_eq!(row.reverse_node, Some(reverse_node(&a1)));
        assert_eq!(row.block_height, 120);
        Ok(())
    }

    #[test]
    fn test_projection_updates_are_scoped_to_resolver() -> SyncResult<()> {
        let store = Store::in_memory()?;
        let r1 = Address::repeat_byte(0x11);
        let stale = Address::repeat_byte(0x22);

        store.upsert_node_projection_resolver(&node(1), &r1, 100)?;
        assert_eq!(store.update_node_name(&stale, &node(1), "mallory", 101)?, 0);
        assert_eq!(store.update_node_name(&r1, &node(1), "alice", 102)?, 1);
        assert_eq!(store.update_node_name(&r1, &node(2), "bob", 103)?, 0);

        assert_eq!(store.name_of(&node(1))?.as_deref(), Some("alice"));
        assert_eq!(store.node(&node(2))?, None);
        Ok(())
    }

    #[test]
    fn test_record_upsert_and_delete() -> SyncResult<()> {
        let store = Store::in_memory()?;
        let resolver = Address::repeat_byte(0x11);
        let kind = RecordKind::dns(b"www", 1);
        let value = RecordValue::Bytes(vec![1, 2, 3]);

        store.upsert_node_projection_resolver(&node(1), &resolver, 1)?;
        store.upsert_record(&node(1), &resolver, &kind, &value, 5)?;
        assert_eq!(store.record(&node(1), &kind)?, Some(value));
        assert_eq!(store.max_block_height(Table::Records)?, Some(5));

        assert_eq!(store.delete_record(&node(1), &resolver, &kind, 6)?, 1);
        assert_eq!(store.record(&node(1), &kind)?, None);
        assert_eq!(store.delete_record(&node(1), &resolver, &kind, 7)?, 0);
        Ok(())
    }

    #[test]
    fn test_record_deletion_keeps_its_height() -> SyncResult<()> {
        let store = Store::in_memory()?;
        let resolver = Address::repeat_byte(0x11);
        let value = RecordValue::Bytes(vec![0xe3, 0x01]);

        store.upsert_record(&node(1), &resolver, &RecordKind::Contenthash, &value, 50)?;
        store.delete_record(&node(1), &resolver, &RecordKind::Contenthash, 60)?;
        assert_eq!(store.max_block_height(Table::Records)?, None);
        assert_eq!(store.max_block_height(Table::RecordDeletions)?, Some(60));

        store.upsert_record(&node(1), &resolver, &RecordKind::Contenthash, &value, 70)?;
        assert_eq!(store.max_block_height(Table::Records)?, Some(70));
        assert_eq!(store.max_block_height(Table::RecordDeletions)?, None);
        Ok(())
    }

    #[test]
    fn test_record_lookup_follows_current_resolver() -> SyncResult<()> {
        let store = Store::in_memory()?;
        let old = Address::repeat_byte(0x11);
        let new = Address::repeat_byte(0x22);
        let kind = RecordKind::Text {
            key: "url".to_string(),
        };

        store.upsert_node_projection_resolver(&node(1), &old, 1)?;
        store.upsert_record(
            &node(1),
            &old,
            &kind,
            &RecordValue::Text("https://old".to_string()),
            2,
        )?;
        store.upsert_node_projection_resolver(&node(1), &new, 3)?;

        assert_eq!(store.record(&node(1), &kind)?, None);
        assert_eq!(
            store
                .resolver_record(&old, &node(1), &kind)?
                .map(|record| record.value),
            Some(RecordValue::Text("https://old".to_string()))
        );
        Ok(())
    }

    #[test]
    fn test_primary_name_picks_latest_node_for_address() -> SyncResult<()> {
        let store = Store::in_memory()?;
        let resolver = Address::repeat_byte(0x11);
        let a1 = Address::repeat_byte(0xa1);
        let reverse = reverse_node(&a1);

        store.upsert_node_projection_resolver(&reverse, &resolver, 90)?;
        store.update_node_name(&resolver, &reverse, "alice", 95)?;

        store.upsert_node_projection_resolver(&node(1), &resolver, 100)?;
        store.update_node_address(&resolver, &node(1), &a1, &reverse, 110)?;

        assert_eq!(
            store.primary_name(&a1)?,
            Some(PrimaryName {
                name: "alice".to_string(),
                block_height: 110,
            })
        );
        assert_eq!(store.primary_name(&Address::repeat_byte(0xb2))?, None);
        Ok(())
    }

    #[test]
    fn test_primary_name_absent_without_reverse_record() -> SyncResult<()> {
        let store = Store::in_memory()?;
        let resolver = Address::repeat_byte(0x11);
        let a1 = Address::repeat_byte(0xa1);

        store.upsert_node_projection_resolver(&node(1), &resolver, 100)?;
        store.update_node_address(&resolver, &node(1), &a1, &reverse_node(&a1), 110)?;

        assert_eq!(store.primary_name(&a1)?, None);
        Ok(())
    }

    #[test]
    fn test_failed_transaction_leaves_no_rows() {
        let store = Store::in_memory().unwrap();
        let resolver = Address::repeat_byte(0x11);

        let result: SyncResult<()> = store.transaction(|store| {
            store.upsert_node_resolver(&node(1), &resolver, 7)?;
            Err(rusqlite::Error::InvalidQuery.into())
        });

        assert!(result.is_err());
        assert_eq!(store.max_block_height(Table::NodeResolvers).unwrap(), None);
    }
}
