//! Parse-or-fail decoding of source payloads.
//!
//! Every source answers with `{"success": bool, "data": ...}`. The flag is
//! checked first, then `data` is decoded into its typed shape. Anything else
//! becomes a [`SourceErrorKind::MalformedPayload`](crate::SourceErrorKind)
//! error.

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

use crate::data_source::{Endpoint, SourceError};
use crate::{Catalog, ConstituentInstrument, HistoryPoint, InstrumentDetail, MarketInfo};

#[derive(Debug, Deserialize)]
struct SourceEnvelope {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    data: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct CatalogData {
    info: MarketInfo,
    constituents: Vec<Value>,
}

#[derive(Debug, Deserialize)]
struct HistoryData {
    chart: Vec<HistoryPoint>,
}

fn unwrap_envelope<T: DeserializeOwned>(
    endpoint: Endpoint,
    key: &str,
    body: &str,
) -> Result<T, SourceError> {
    let envelope: SourceEnvelope = serde_json::from_str(body).map_err(|error| {
        SourceError::malformed(format!("{endpoint} payload for '{key}' is not a valid envelope: {error}"))
    })?;

    if !envelope.success {
        return Err(SourceError::malformed(format!(
            "{endpoint} payload for '{key}' reported success=false"
        )));
    }

    let data = envelope.data.ok_or_else(|| {
        SourceError::malformed(format!("{endpoint} payload for '{key}' has no data"))
    })?;

    serde_json::from_value(data).map_err(|error| {
        SourceError::malformed(format!("{endpoint} payload for '{key}' has unexpected shape: {error}"))
    })
}

/// Decode a catalog body. Requires `data.info` and `data.constituents`.
///
/// Rows are decoded one by one; a row that doesn't decode is logged and
/// skipped so the rest of the list survives.
pub fn parse_catalog(body: &str) -> Result<Catalog, SourceError> {
    let data: CatalogData = unwrap_envelope(Endpoint::Catalog, "catalog", body)?;

    let constituents = data
        .constituents
        .into_iter()
        .enumerate()
        .filter_map(|(index, row)| match serde_json::from_value::<ConstituentInstrument>(row) {
            Ok(constituent) => Some(constituent),
            Err(error) => {
                warn!(index, error = %error, "skipping undecodable constituent");
                None
            }
        })
        .collect();

    Ok(Catalog::new(data.info, constituents))
}

/// Decode a summary body.
pub fn parse_summary(key: &str, body: &str) -> Result<InstrumentDetail, SourceError> {
    unwrap_envelope(Endpoint::Summary, key, body)
}

/// Decode a history body. Points come back sorted by timestamp, ties kept in
/// source order.
pub fn parse_history(key: &str, body: &str) -> Result<Vec<HistoryPoint>, SourceError> {
    let data: HistoryData = unwrap_envelope(Endpoint::History, key, body)?;
    let mut chart = data.chart;
    chart.sort_by_key(|point| point.timestamp);
    Ok(chart)
}
