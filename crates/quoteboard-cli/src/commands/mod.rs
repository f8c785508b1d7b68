mod list;
mod show;
mod snapshot;
mod tabs;

use std::time::Duration;

use quoteboard_core::{InstrumentStore, SourceConfig, StoreConfig, Tab};
use serde_json::Value;
use tracing::debug;

use crate::cli::{Cli, Command};
use crate::error::CliError;

pub async fn run(cli: &Cli) -> Result<Value, CliError> {
    let store = build_store(cli)?;

    match &cli.command {
        Command::Tabs => tabs::run(&store).await,
        Command::List(args) => list::run(args, &store).await,
        Command::Show(args) => show::run(args, &store).await,
        Command::Snapshot(args) => snapshot::run(args, &store).await,
    }
}

/// Flags override `QUOTEBOARD_*` variables.
fn build_store(cli: &Cli) -> Result<InstrumentStore, CliError> {
    let mut config = StoreConfig::from_env()?;
    if let Some(timeout_ms) = cli.timeout_ms {
        config = config.with_fetch_timeout((timeout_ms > 0).then(|| Duration::from_millis(timeout_ms)));
    }

    let source_config = match (&cli.data_dir, &cli.base_url) {
        (Some(dir), _) => SourceConfig::Dir(dir.clone()),
        (None, Some(base_url)) => SourceConfig::Http {
            base_url: base_url.clone(),
        },
        (None, None) => SourceConfig::from_env().ok_or_else(|| {
            CliError::Config(String::from(
                "no data source: pass --data-dir or --base-url, or set QUOTEBOARD_DATA_DIR / QUOTEBOARD_BASE_URL",
            ))
        })?,
    };

    debug!(source = ?source_config, "building store");
    Ok(InstrumentStore::new(source_config.build(), config))
}

/// Parse an optional tab flag, falling back to the configured default.
fn resolve_tab(store: &InstrumentStore, raw: Option<&str>) -> Result<Tab, CliError> {
    match raw {
        Some(name) => Ok(Tab::parse(name)?),
        None => Ok(store.config().default_tab.clone()),
    }
}
