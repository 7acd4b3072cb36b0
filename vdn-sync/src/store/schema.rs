/// Tables and views of the derived store. Every statement is idempotent.
pub(crate) const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS node_resolvers (
    node TEXT PRIMARY KEY,
    resolver_address TEXT NOT NULL,
    block_height INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS node_addresses (
    resolver_address TEXT NOT NULL,
    node TEXT NOT NULL,
    address TEXT NOT NULL,
    block_height INTEGER NOT NULL,
    PRIMARY KEY (resolver_address, node)
);

CREATE TABLE IF NOT EXISTS node_names (
    resolver_address TEXT NOT NULL,
    node TEXT NOT NULL,
    name TEXT NOT NULL,
    block_height INTEGER NOT NULL,
    PRIMARY KEY (resolver_address, node)
);

CREATE TABLE IF NOT EXISTS nodes (
    node TEXT PRIMARY KEY,
    reverse_node TEXT,
    resolver_address TEXT,
    address TEXT,
    name TEXT,
    block_height INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS nodes_by_reverse_node ON nodes (reverse_node);
CREATE INDEX IF NOT EXISTS nodes_by_address ON nodes (address);

CREATE TABLE IF NOT EXISTS records (
    node TEXT NOT NULL,
    resolver_address TEXT NOT NULL,
    record_type TEXT NOT NULL,
    record_key TEXT NOT NULL,
    value NOT NULL,
    block_height INTEGER NOT NULL,
    PRIMARY KEY (node, resolver_address, record_type, record_key)
);

-- Height of the last removal of a record, so removals count towards the
-- checkpoint of the record pass. Cleared when the record is written again.
CREATE TABLE IF NOT EXISTS record_deletions (
    node TEXT NOT NULL,
    resolver_address TEXT NOT NULL,
    record_type TEXT NOT NULL,
    record_key TEXT NOT NULL,
    block_height INTEGER NOT NULL,
    PRIMARY KEY (node, resolver_address, record_type, record_key)
);

-- Bare columns next to MAX() come from the row holding the maximum. When two
-- nodes with the same address share that maximum, the row picked is
-- unspecified.
CREATE VIEW IF NOT EXISTS primary_names AS
    SELECT
        n.address AS address,
        nr.name AS name,
        MAX(n.block_height) AS block_height
    FROM nodes n
    LEFT JOIN nodes nr ON nr.node = n.reverse_node
    WHERE n.address IS NOT NULL
    GROUP BY n.address;
"#;
