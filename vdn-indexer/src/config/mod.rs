use std::time::Duration;

use alloy_primitives::Address;
use anyhow::ensure;
use anyhow::Context;
use config::FileFormat;
use lazy_static_include::*;
use serde_derive::Deserialize;
use tracing::debug;

lazy_static_include_str! {
    DEFAULT_CONFIG => "src/config/default.toml",
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
pub(crate) struct Config {
    pub(crate) chain: ChainConfig,
    pub(crate) store: StoreConfig,
    #[serde(default)]
    pub(crate) sync: SyncConfig,
    #[serde(default)]
    pub(crate) prometheus: PrometheusConfig,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
pub(crate) struct ChainConfig {
    /// Base URL of the Thor node REST API.
    pub(crate) node_url: String,
    /// Contract emitting `NewResolver` events.
    pub(crate) registry_address: String,
}

impl ChainConfig {
    pub fn validate(&self) -> anyhow::Result<()> {
        ensure!(!self.node_url.is_empty(), "Node URL is required");
        ensure!(
            !self.registry_address.is_empty(),
            "Registry address is required"
        );
        self.registry()?;
        Ok(())
    }

    pub fn registry(&self) -> anyhow::Result<Address> {
        self.registry_address
            .parse()
            .with_context(|| format!("parsing registry address {}", self.registry_address))
    }
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
pub(crate) struct StoreConfig {
    pub(crate) database: String,
}

impl StoreConfig {
    pub fn validate(&self) -> anyhow::Result<()> {
        ensure!(!self.database.is_empty(), "Database path is required");
        Ok(())
    }
}

#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
pub(crate) struct SyncConfig {
    /// Seconds to wait between cycles. Unset means a single cycle.
    pub(crate) poll_interval_secs: Option<u64>,
}

impl SyncConfig {
    pub fn poll_interval(&self) -> Option<Duration> {
        self.poll_interval_secs.map(Duration::from_secs)
    }
}

#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
pub(crate) struct PrometheusConfig {
    pub(crate) port: Option<u16>,
}

/// Values given on the command line, applied over every other source.
#[derive(Debug, Clone, Default)]
pub(crate) struct Overrides {
    pub(crate) node_url: Option<String>,
    pub(crate) registry_address: Option<String>,
    pub(crate) database: Option<String>,
}

impl Config {
    pub fn load(
        local_file: Option<String>,
        overrides: Overrides,
    ) -> anyhow::Result<Config> {
        let mut config_builder = config::Config::builder();
        config_builder =
            config_builder.add_source(config::File::from_str(&DEFAULT_CONFIG, FileFormat::Toml));

        if let Some(local_file) = local_file {
            debug!("Loading local configuration from {}", local_file);
            config_builder = config_builder.add_source(config::File::with_name(&local_file));
        }

        config_builder
            .add_source(
                config::Environment::default()
                    .separator("__")
                    .ignore_empty(true),
            )
            .set_override_option("chain.node_url", overrides.node_url)?
            .set_override_option("chain.registry_address", overrides.registry_address)?
            .set_override_option("store.database", overrides.database)?
            .build()
            .context("Could not load configuration")?
            .try_deserialize()
            .context("Could not deserialize configuration")
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        self.chain.validate()?;
        self.store.validate()?;
        if let Some(secs) = self.sync.poll_interval_secs {
            ensure!(secs > 0, "Poll interval must be positive");
        }
        Ok(())
    }
}
