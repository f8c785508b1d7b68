//! Data source trait and error types.
//!
//! This module defines the contract (`MarketDataSource`) that every backing
//! store of market data follows. There are three endpoints, each addressed by
//! a key derived from an instrument or tab identifier:
//!
//! | Endpoint | Key | Response |
//! |----------|-----|----------|
//! | Catalog | none | [`Catalog`] |
//! | Summary | instrument id | [`InstrumentDetail`] |
//! | History | upper-cased instrument id | `Vec<`[`HistoryPoint`]`>` |
//!
//! Implementations validate the `success` flag and the nested payload shape
//! (see [`crate::payload`]) before handing typed values back.

use std::fmt::{Display, Formatter};
use std::future::Future;
use std::pin::Pin;

use serde::{Deserialize, Serialize};

use crate::{Catalog, HistoryPoint, InstrumentDetail, InstrumentId, Tab};

/// Data endpoint, used in logs and error messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Endpoint {
    Catalog,
    Summary,
    History,
}

impl Endpoint {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Catalog => "catalog",
            Self::Summary => "summary",
            Self::History => "history",
        }
    }
}

impl Display for Endpoint {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Source-level error classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceErrorKind {
    /// The underlying store could not be read.
    Unavailable,
    /// The payload failed flag or shape validation.
    MalformedPayload,
    /// The requested tab has no known constituent source.
    UnknownTab,
    /// The fetch did not resolve within the configured timeout.
    TimedOut,
}

/// Structured source error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceError {
    kind: SourceErrorKind,
    message: String,
    retryable: bool,
}

impl SourceError {
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::Unavailable,
            message: message.into(),
            retryable: true,
        }
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::MalformedPayload,
            message: message.into(),
            retryable: false,
        }
    }

    pub fn unknown_tab(tab: &Tab) -> Self {
        Self {
            kind: SourceErrorKind::UnknownTab,
            message: format!("no constituent data for tab '{tab}'"),
            retryable: false,
        }
    }

    pub fn timed_out(endpoint: Endpoint, key: impl Display, after_ms: u128) -> Self {
        Self {
            kind: SourceErrorKind::TimedOut,
            message: format!("{endpoint} fetch for '{key}' timed out after {after_ms}ms"),
            retryable: true,
        }
    }

    pub const fn kind(&self) -> SourceErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub const fn retryable(&self) -> bool {
        self.retryable
    }

    pub const fn code(&self) -> &'static str {
        match self.kind {
            SourceErrorKind::Unavailable => "source.unavailable",
            SourceErrorKind::MalformedPayload => "source.malformed_payload",
            SourceErrorKind::UnknownTab => "source.unknown_tab",
            SourceErrorKind::TimedOut => "source.timed_out",
        }
    }
}

impl Display for SourceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.message, self.code())
    }
}

impl std::error::Error for SourceError {}

/// Boxed future returned by [`MarketDataSource`] methods.
pub type SourceFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, SourceError>> + Send + 'a>>;

/// Backing store of catalog, summary and history data.
///
/// Sources are read-only, possibly slow and possibly missing entries. They
/// never cache: caching is the job of [`crate::FetchCache`].
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync` as they are shared by every clone of
/// the store.
pub trait MarketDataSource: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Fetches the master constituent list and its market metadata.
    ///
    /// # Errors
    ///
    /// - [`SourceErrorKind::Unavailable`] if the catalog cannot be read
    /// - [`SourceErrorKind::MalformedPayload`] if `success` is false or the
    ///   constituents list is missing
    fn catalog<'a>(&'a self) -> SourceFuture<'a, Catalog>;

    /// Fetches the summary of one instrument.
    fn summary<'a>(&'a self, id: &'a InstrumentId) -> SourceFuture<'a, InstrumentDetail>;

    /// Fetches the price history of one instrument, addressed by
    /// [`InstrumentId::history_key`].
    fn history<'a>(&'a self, id: &'a InstrumentId) -> SourceFuture<'a, Vec<HistoryPoint>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_codes_are_stable() {
        assert_eq!(
            SourceError::unavailable("x").code(),
            "source.unavailable"
        );
        assert_eq!(
            SourceError::malformed("x").code(),
            "source.malformed_payload"
        );
        let tab = Tab::parse("NASDAQ").expect("tab");
        let error = SourceError::unknown_tab(&tab);
        assert_eq!(error.kind(), SourceErrorKind::UnknownTab);
        assert_eq!(error.code(), "source.unknown_tab");
        assert!(error.message().contains("NASDAQ"));
        assert_eq!(
            SourceError::timed_out(Endpoint::Summary, "CHILE", 10).code(),
            "source.timed_out"
        );
    }

    #[test]
    fn timeouts_are_retryable() {
        let error = SourceError::timed_out(Endpoint::History, "CHILE", 250);
        assert!(error.retryable());
        assert_eq!(error.to_string(), "history fetch for 'CHILE' timed out after 250ms (source.timed_out)");
    }
}
