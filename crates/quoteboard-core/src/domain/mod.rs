//! # Domain Models
//!
//! Typed market-data entities produced at the data-source boundary.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`InstrumentId`] | Validated instrument code |
//! | [`Tab`] | Named grouping of instruments |
//! | [`MarketInfo`] | Metadata of a constituent list |
//! | [`ConstituentInstrument`] | Raw catalog row |
//! | [`Instrument`] | Row shown in a tab's list |
//! | [`InstrumentDetail`] | Summary: [`InstrumentInfo`] + [`InstrumentPrice`] |
//! | [`HistoryPoint`] | One observation of a price series |
//!
//! Wire payloads deserialize straight into these types, so a payload that
//! doesn't match the schema never becomes a half-initialized entity.

mod id;
mod models;
mod tab;

pub use id::InstrumentId;
pub use models::{
    ConstituentInstrument, HistoryPoint, Instrument, InstrumentDetail, InstrumentInfo,
    InstrumentPrice, MarketInfo, Trend,
};
pub use tab::{Tab, DEFAULT_TAB, DEFAULT_TABS};
