//! CLI argument definitions for quoteboard.
//!
//! # Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `tabs` | List known tabs and the catalog's market |
//! | `list` | List a tab's instruments, optionally filtered |
//! | `show` | Resolve one instrument's summary and history |
//! | `snapshot` | Bootstrap, navigate and dump the full store state |
//!
//! # Global Options
//!
//! | Option | Default | Description |
//! |--------|---------|-------------|
//! | `--data-dir` | `QUOTEBOARD_DATA_DIR` | Read payloads from a directory |
//! | `--base-url` | `QUOTEBOARD_BASE_URL` | Read payloads from an HTTP host |
//! | `--timeout-ms` | `QUOTEBOARD_FETCH_TIMEOUT_MS` | Per-fetch timeout, `0` disables it |
//! | `--pretty` | `false` | Pretty-print JSON output |
//! | `--log-format` | `LOG_FORMAT` | Log format on stderr |
//!
//! # Examples
//!
//! ```bash
//! quoteboard --data-dir ./data list --search banco
//! quoteboard --data-dir ./data show SQM-B --range 1M --pretty
//! quoteboard --base-url https://host/data snapshot --tab IPSA
//! ```

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// Browse market instruments from the command line.
#[derive(Debug, Parser)]
#[command(
    name = "quoteboard",
    author,
    version,
    about = "Browse market instruments, summaries and price history"
)]
pub struct Cli {
    /// Directory holding `constituents/`, `summary/` and `history/` payloads.
    #[arg(long, global = true, conflicts_with = "base_url")]
    pub data_dir: Option<PathBuf>,

    /// Base URL serving the same payload layout.
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// Upper bound for each summary/history fetch in milliseconds.
    #[arg(long, global = true)]
    pub timeout_ms: Option<u64>,

    /// Pretty-print JSON output with indentation.
    #[arg(long, global = true, default_value_t = false)]
    pub pretty: bool,

    /// Log format written to stderr.
    #[arg(long, global = true, value_enum)]
    pub log_format: Option<LogFormatArg>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}

/// Available CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// List known tabs and the market covered by the catalog.
    Tabs,

    /// List the instruments of a tab.
    ///
    /// # Examples
    ///
    ///   quoteboard list
    ///   quoteboard list --tab IPSA --search chile
    List(ListArgs),

    /// Select one instrument and print its summary and history.
    ///
    /// # Examples
    ///
    ///   quoteboard show CHILE
    ///   quoteboard show SQM-B --range 3M
    Show(ShowArgs),

    /// Bootstrap the store, apply the given navigation and print its state.
    Snapshot(SnapshotArgs),
}

#[derive(Debug, Args)]
pub struct ListArgs {
    /// Tab to activate; defaults to the configured default tab.
    #[arg(long)]
    pub tab: Option<String>,

    /// Case-insensitive filter over name and short name.
    #[arg(long)]
    pub search: Option<String>,
}

#[derive(Debug, Args)]
pub struct ShowArgs {
    /// Instrument code, e.g. `SQM-B`.
    pub code: String,

    /// Chart range: 1D, 1S, 1M, 3M, 6M, 1A or 5A.
    #[arg(long, default_value = "1A")]
    pub range: String,
}

#[derive(Debug, Args)]
pub struct SnapshotArgs {
    #[arg(long)]
    pub tab: Option<String>,

    #[arg(long)]
    pub search: Option<String>,

    /// Instrument to select after the tab is activated.
    #[arg(long)]
    pub select: Option<String>,

    #[arg(long)]
    pub range: Option<String>,
}
