//! Ledger Report Binary
//!
//! Reads one group's transaction snapshot and prints its balances and a
//! settle-up plan as JSON.
//!
//! # Usage
//!
//! ```bash
//! # Snapshot path as argument
//! cargo run --bin ledger-report -- group.json
//!
//! # Snapshot path from the environment, skipping corrupt records
//! LEDGER_SNAPSHOT_PATH=group.json LEDGER_SKIP_CORRUPT_TRANSACTIONS=true cargo run --bin ledger-report
//! ```
//!
//! See `interface_ledger::config` for every `LEDGER_*` variable.

use anyhow::{anyhow, Context};
use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use domain_ledger::InMemoryTransactionStore;
use interface_ledger::{LedgerConfig, LedgerService, LedgerSnapshot};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present (useful for local development)
    dotenvy::dotenv().ok();

    let config = LedgerConfig::load().context("loading LEDGER_* configuration")?;
    init_tracing(&config.log_level, config.log_json);

    let path = std::env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .or_else(|| config.snapshot_path.clone())
        .ok_or_else(|| anyhow!("no snapshot given; pass a path or set LEDGER_SNAPSHOT_PATH"))?;

    let file = File::open(&path).with_context(|| format!("opening snapshot {}", path.display()))?;
    let snapshot = LedgerSnapshot::from_reader(BufReader::new(file))
        .with_context(|| format!("parsing snapshot {}", path.display()))?;

    tracing::info!(
        group = %snapshot.group_id,
        currency = %snapshot.currency,
        transactions = snapshot.transactions.len(),
        "Snapshot loaded"
    );

    let config = LedgerConfig {
        currency: snapshot.currency,
        ..config
    };
    let store = InMemoryTransactionStore::with_transactions(snapshot.group_id, snapshot.transactions);
    let service = LedgerService::new(store, config);

    let report = service
        .report(snapshot.group_id)
        .await
        .context("computing group balances")?;

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

/// Initializes the tracing subscriber; logs go to stderr so stdout stays JSON
fn init_tracing(log_level: &str, json: bool) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_target(true).with_writer(std::io::stderr))
            .init();
    }
}
