//! # Quoteboard Core
//!
//! Instrument data-state and caching manager for a market-data board.
//!
//! ## Overview
//!
//! - **Catalog** of market constituents, split into per-tab instrument lists
//! - **Fetch-or-serve caches** for instrument summaries and price histories
//! - **Selection state machine** that ignores results for instruments the
//!   user already navigated away from
//! - **Search** over the active tab's list
//! - **Data sources** reading JSON payloads from a directory, over HTTP or
//!   from memory
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`adapters`] | Directory, HTTP and in-memory data sources |
//! | [`cache`] | Write-once per-instrument fetch cache |
//! | [`catalog`] | Constituent list and per-tab views |
//! | [`config`] | Store and source configuration |
//! | [`data_source`] | Data source trait and structured errors |
//! | [`domain`] | Domain models (InstrumentId, Tab, InstrumentDetail, HistoryPoint) |
//! | [`error`] | Core error types |
//! | [`history`] | Chart ranges over a history series |
//! | [`http_client`] | HTTP client abstraction |
//! | [`logging`] | `tracing` subscriber setup |
//! | [`payload`] | Wire envelope decoding |
//! | [`retry`] | Retry and backoff policy for HTTP sources |
//! | [`search`] | Instrument list filtering |
//! | [`store`] | The [`InstrumentStore`] state container |
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use quoteboard_core::{InstrumentStore, JsonDirSource, StoreConfig};
//!
//! #[tokio::main]
//! async fn main() {
//!     let source = Arc::new(JsonDirSource::new("./data"));
//!     let store = InstrumentStore::new(source, StoreConfig::default());
//!
//!     store.bootstrap().await;
//!     store.set_search_term("banco");
//!
//!     for instrument in store.instruments() {
//!         println!("{} {:.2}", instrument.id, instrument.last_price);
//!     }
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────┐
//! │ CLI / Presentation  │
//! └──────────┬──────────┘
//!            │
//!            ▼
//! ┌─────────────────────┐     ┌──────────────────┐
//! │  InstrumentStore    │────▶│ Search / History │
//! └──────────┬──────────┘     └──────────────────┘
//!            │
//!            ▼
//! ┌─────────────────────┐
//! │ FetchCache (x2)     │
//! │ + catalog OnceCell  │
//! └──────────┬──────────┘
//!            │
//!            ▼
//! ┌─────────────────────┐     ┌──────────────────┐
//! │ MarketDataSource    │────▶│ HTTP Client      │
//! │ (Adapter Trait)     │     │ (reqwest/static) │
//! └─────────────────────┘     └──────────────────┘
//! ```
//!
//! ## Error Handling
//!
//! Source failures never escape the store; they degrade the affected state
//! to empty and are reported through `tracing`. Direct callers of a source
//! get a structured [`SourceError`]:
//!
//! ```rust
//! use quoteboard_core::{SourceError, SourceErrorKind};
//!
//! fn handle_error(error: SourceError) {
//!     match error.kind() {
//!         SourceErrorKind::Unavailable | SourceErrorKind::TimedOut => {
//!             // Try again later
//!         }
//!         SourceErrorKind::MalformedPayload => {
//!             // Report upstream
//!         }
//!         _ => {}
//!     }
//! }
//! ```

pub mod adapters;
pub mod cache;
pub mod catalog;
pub mod config;
pub mod data_source;
pub mod domain;
pub mod error;
pub mod history;
pub mod http_client;
pub mod logging;
pub mod payload;
pub mod retry;
pub mod search;
pub mod store;

pub use adapters::{HttpSource, JsonDirSource, MemorySource, SourceLayout};
pub use cache::FetchCache;
pub use catalog::{load_catalog, Catalog};
pub use config::{SourceConfig, StoreConfig};
pub use data_source::{Endpoint, MarketDataSource, SourceError, SourceErrorKind, SourceFuture};
pub use domain::*;
pub use error::ValidationError;
pub use history::{window, HistoryRange};
pub use http_client::{HttpClient, HttpError, HttpRequest, HttpResponse, ReqwestHttpClient, StaticHttpClient};
pub use logging::{init_logging, LogConfig, LogFormat};
pub use retry::{Backoff, RetryConfig};
pub use search::filter_instruments;
pub use store::{CacheStats, InstrumentStore, SelectionOutcome, SelectionPhase, StoreSnapshot};
