use std::panic;

use alloy_primitives::Address;
use alloy_primitives::B256;
use anyhow::bail;
use anyhow::Context;
use backtrace::Backtrace;
use clap::ArgGroup;
use clap::Args;
use clap::Parser;
use clap::Subcommand;
use mimalloc::MiMalloc;
use tracing::debug;
use tracing::error;
use tracing::info;
use tracing::level_filters::LevelFilter;
use tracing::span;
use tracing::Level;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::EnvFilter;
use vdn_sync::namehash::namehash;
use vdn_sync::namehash::reverse_node;
use vdn_sync::source::ThorClient;
use vdn_sync::store::RecordKind;
use vdn_sync::store::RecordValue;
use vdn_sync::store::Store;
use vdn_sync::sync_cycle;

use crate::config::Config;
use crate::config::Overrides;

mod config;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[derive(Parser, Clone, Debug)]
#[command(version, about)]
struct Cli {
    /// Path to the configuration file.
    #[clap(short, long)]
    config: Option<String>,

    /// If set, output logs in JSON format.
    #[clap(short, long, action)]
    json: bool,

    /// Thor node URL, overrides `chain.node_url`.
    #[clap(long)]
    node: Option<String>,

    /// Registry contract address, overrides `chain.registry_address`.
    #[clap(long)]
    contract: Option<String>,

    /// SQLite database path, overrides `store.database`.
    #[clap(long)]
    database: Option<String>,

    #[clap(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Clone, Debug)]
enum Command {
    /// Replay registry and resolver events up to the chain head (default)
    Sync,
    /// Print what the local database knows about a node or an address
    Lookup(Lookup),
}

#[derive(Args, Clone, Debug)]
#[command(group(ArgGroup::new("target").required(true).args(["node", "name", "address"])))]
struct Lookup {
    /// Node ID as 0x-prefixed hex.
    #[clap(long)]
    node: Option<B256>,

    /// Dotted name, hashed into its node ID.
    #[clap(long)]
    name: Option<String>,

    /// Account address to reverse-resolve.
    #[clap(long)]
    address: Option<Address>,

    /// Text record keys to print for the node.
    #[clap(long)]
    text: Vec<String>,
}

fn setup_logging(json: bool) {
    if json {
        let subscriber = tracing_subscriber::fmt()
            .json()
            .with_level(true)
            .with_file(true)
            .with_line_number(true)
            .with_target(true)
            .with_env_filter(
                EnvFilter::builder()
                    .with_default_directive(LevelFilter::INFO.into())
                    .from_env_lossy(),
            )
            .with_span_events(FmtSpan::NEW | FmtSpan::CLOSE)
            .finish();
        tracing::subscriber::set_global_default(subscriber).expect("Setting up logging failed");
    } else {
        let subscriber = tracing_subscriber::fmt()
            .pretty()
            .compact()
            .with_level(true)
            .with_file(true)
            .with_line_number(true)
            .with_target(true)
            .with_env_filter(
                EnvFilter::builder()
                    .with_default_directive(LevelFilter::INFO.into())
                    .from_env_lossy(),
            )
            .with_span_events(FmtSpan::NEW | FmtSpan::CLOSE)
            .finish();
        tracing::subscriber::set_global_default(subscriber).expect("Setting up logging failed");
    };
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.json);

    panic::set_hook(Box::new(|panic_info| {
        let msg = match panic_info.payload().downcast_ref::<&'static str>() {
            Some(s) => *s,
            None => {
                match panic_info.payload().downcast_ref::<String>() {
                    Some(s) => &s[..],
                    None => "Box<dyn Any>",
                }
            },
        };
        let (file, lineno, col) = match panic_info.location() {
            Some(l) => (l.file(), l.line(), l.column()),
            None => ("<unknown>", 0, 0),
        };

        error!(
            msg,
            file,
            lineno,
            col,
            "Panic occurred: {:?}",
            Backtrace::new(),
        );
    }));

    if let Err(err) = run(cli).await {
        panic!("Indexer exited due to an error: {err:?}")
    } else {
        Ok(())
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let version = env!("CARGO_PKG_VERSION");
    let overrides = Overrides {
        node_url: cli.node,
        registry_address: cli.contract,
        database: cli.database,
    };
    let config = Config::load(cli.config, overrides).context("loading configuration")?;
    config.validate().context("validating configuration")?;
    debug!("Loaded configuration: {:?}", config);

    match cli.command.unwrap_or(Command::Sync) {
        Command::Sync => {
            info!("Starting indexer. version: {}", version);
            run_sync(&config).await
        },
        Command::Lookup(lookup) => run_lookup(&config, &lookup),
    }
}

async fn run_sync(config: &Config) -> anyhow::Result<()> {
    let registry = config.chain.registry()?;

    let span = span!(
        Level::INFO,
        "indexer",
        "node" = config.chain.node_url.as_str(),
        "registry" = registry.to_string(),
        "database" = config.store.database.as_str(),
    );
    let _guard = span.enter();

    if let Some(port) = config.prometheus.port {
        metrics_exporter_prometheus::PrometheusBuilder::new()
            .with_http_listener(([0, 0, 0, 0], port))
            .install()
            .context("setting up Prometheus")?;
    }

    let source = ThorClient::new(&config.chain.node_url).context("creating Thor client")?;
    let store = Store::open(&config.store.database)
        .with_context(|| format!("opening database {}", config.store.database))?;

    loop {
        let report = sync_cycle(&source, &store, registry)
            .await
            .context("running sync cycle")?;
        for (pass, pass_report) in [
            ("resolvers", &report.resolvers),
            ("records", &report.records),
        ] {
            info!(
                "Pass report. pass: {} from: {} to: {} requests: {} fetched: {} applied: {} skipped: {}",
                pass,
                pass_report.from,
                pass_report.to,
                pass_report.requests,
                pass_report.fetched,
                pass_report.applied,
                pass_report.skipped,
            );
        }

        match config.sync.poll_interval() {
            Some(interval) => {
                debug!("Waiting for next cycle. interval: {:?}", interval);
                tokio::time::sleep(interval).await;
            },
            None => return Ok(()),
        }
    }
}

fn run_lookup(
    config: &Config,
    lookup: &Lookup,
) -> anyhow::Result<()> {
    let store = Store::open_read_only(&config.store.database)
        .with_context(|| format!("opening database {}", config.store.database))?;

    if let Some(address) = &lookup.address {
        let primary = store
            .primary_name(address)
            .context("querying primary name")?;
        println!("address:      {}", address);
        println!("reverse node: {}", reverse_node(address));
        match primary {
            Some(primary) => {
                println!("primary name: {} (block {})", primary.name, primary.block_height)
            },
            None => println!("primary name: -"),
        }
        return Ok(());
    }

    let node = match (&lookup.node, &lookup.name) {
        (Some(node), _) => *node,
        (None, Some(name)) => namehash(name),
        (None, None) => bail!("one of --node, --name or --address is required"),
    };

    println!("node:     {}", node);
    let Some(row) = store.node(&node).context("querying node")? else {
        println!("not indexed");
        return Ok(());
    };
    println!("resolver: {}", display_or_dash(row.resolver));
    println!("address:  {}", display_or_dash(row.address));
    println!("name:     {}", display_or_dash(row.name));
    println!("height:   {}", row.block_height);

    let contenthash = store
        .record(&node, &RecordKind::Contenthash)
        .context("querying contenthash")?;
    println!("contenthash: {}", display_or_dash(contenthash.map(render_value)));

    for key in &lookup.text {
        let value = store
            .record(&node, &RecordKind::Text { key: key.clone() })
            .with_context(|| format!("querying text record {key}"))?;
        println!("text[{}]: {}", key, display_or_dash(value.map(render_value)));
    }

    Ok(())
}

fn render_value(value: RecordValue) -> String {
    match value {
        RecordValue::Text(text) => text,
        RecordValue::Bytes(bytes) => format!("0x{}", alloy_primitives::hex::encode(bytes)),
    }
}

fn display_or_dash<T: ToString>(value: Option<T>) -> String {
    value.map_or_else(|| "-".to_string(), |value| value.to_string())
}
