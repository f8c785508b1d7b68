use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::InstrumentId;

/// Price direction flag reported by the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trend {
    Up,
    Down,
    Same,
    #[default]
    #[serde(other)]
    Unknown,
}

/// Market metadata attached to a constituent list.
///
/// `name` identifies the tab the constituents belong to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketInfo {
    pub name: String,
    #[serde(default)]
    pub short_name: Option<String>,
    #[serde(default)]
    pub country_name: Option<String>,
    #[serde(default)]
    pub code_instrument: Option<String>,
    #[serde(default)]
    pub last_price: Option<f64>,
    #[serde(default)]
    pub datetime_last_price: Option<String>,
}

/// Raw constituent row as delivered by the catalog source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConstituentInstrument {
    pub code_instrument: InstrumentId,
    pub name: String,
    pub short_name: String,
    pub last_price: f64,
    pub pct_day: f64,
    #[serde(rename = "pct30D", default)]
    pub pct_30d: Option<f64>,
    #[serde(rename = "pctCY", default)]
    pub pct_cy: Option<f64>,
    #[serde(rename = "pct1Y", default)]
    pub pct_1y: Option<f64>,
    #[serde(default)]
    pub datetime_last_price: Option<String>,
    #[serde(default)]
    pub volume_money: Option<f64>,
    #[serde(default)]
    pub accumulated_volume_money: Option<f64>,
    #[serde(default)]
    pub tend: Trend,
    #[serde(default)]
    pub performance_absolute: Option<f64>,
    #[serde(default)]
    pub performance_relative: Option<f64>,
}

/// Instrument row shown in a tab's list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instrument {
    pub id: InstrumentId,
    pub name: String,
    pub short_name: String,
    pub last_price: f64,
    pub pct_day: f64,
    pub pct_30d: Option<f64>,
    pub pct_cy: Option<f64>,
    pub pct_1y: Option<f64>,
    pub volume_money: Option<f64>,
}

impl From<&ConstituentInstrument> for Instrument {
    fn from(raw: &ConstituentInstrument) -> Self {
        Self {
            id: raw.code_instrument.clone(),
            name: raw.name.clone(),
            short_name: raw.short_name.clone(),
            last_price: raw.last_price,
            pct_day: raw.pct_day,
            pct_30d: raw.pct_30d,
            pct_cy: raw.pct_cy,
            pct_1y: raw.pct_1y,
            volume_money: raw.volume_money,
        }
    }
}

/// Static descriptive attributes of an instrument.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstrumentInfo {
    pub name: String,
    #[serde(default)]
    pub short_name: Option<String>,
    #[serde(default)]
    pub country_name: Option<String>,
    #[serde(default)]
    pub currency_name: Option<String>,
    #[serde(default)]
    pub currency_symbol: Option<String>,
    #[serde(default)]
    pub code_instrument: Option<String>,
    #[serde(default)]
    pub market_name: Option<String>,
    #[serde(default)]
    pub hour_open: Option<String>,
    #[serde(default)]
    pub hour_close: Option<String>,
    #[serde(default)]
    pub trading: bool,
    #[serde(default)]
    pub exchange_rate: Option<f64>,
}

/// Live quote block of an instrument summary.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InstrumentPrice {
    pub last_price: Option<f64>,
    pub datetime_last_price: Option<String>,
    pub open_price: Option<f64>,
    pub close_price: Option<f64>,
    pub datetime_close_price: Option<String>,
    pub performance_absolute: Option<f64>,
    pub performance_relative: Option<f64>,
    pub bid: Option<f64>,
    pub bid_volume: Option<f64>,
    pub bid_datetime: Option<String>,
    pub ask: Option<f64>,
    pub ask_volume: Option<f64>,
    pub ask_datetime: Option<String>,
    pub volume_money: Option<f64>,
    pub accumulated_volume_money: Option<f64>,
    pub volume_instrument: Option<f64>,
    pub accumulated_volume_instrument: Option<f64>,
    pub tend: Trend,
    pub max_day: Option<f64>,
    pub min_day: Option<f64>,
    #[serde(rename = "min52W")]
    pub min_52w: Option<f64>,
    #[serde(rename = "max52W")]
    pub max_52w: Option<f64>,
    #[serde(rename = "pct30D")]
    pub pct_30d: Option<f64>,
    #[serde(rename = "pctRelW52")]
    pub pct_rel_w52: Option<f64>,
    #[serde(rename = "pctRelCY")]
    pub pct_rel_cy: Option<f64>,
}

/// Summary of one instrument: descriptive info plus live quote.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstrumentDetail {
    pub info: InstrumentInfo,
    pub price: InstrumentPrice,
}

/// One sampled observation of an instrument's price history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryPoint {
    #[serde(rename = "datetimeLastPrice")]
    pub datetime: String,
    /// Unix epoch seconds.
    #[serde(rename = "datetimeLastPriceTs")]
    pub timestamp: i64,
    #[serde(rename = "lastPrice")]
    pub last_price: f64,
    #[serde(rename = "highPrice", default)]
    pub high: Option<f64>,
    #[serde(rename = "lowPrice", default)]
    pub low: Option<f64>,
    #[serde(rename = "openPrice", default)]
    pub open: Option<f64>,
    #[serde(rename = "closePrice", default)]
    pub close: Option<f64>,
    #[serde(default)]
    pub volume: Option<f64>,
    #[serde(rename = "volumeMoney", default)]
    pub volume_money: Option<f64>,
    #[serde(rename = "performanceRelative", default)]
    pub performance_relative: Option<f64>,
    #[serde(rename = "performanceAbsolute", default)]
    pub performance_absolute: Option<f64>,
    #[serde(rename = "tend", default)]
    pub trend: Trend,
}

impl HistoryPoint {
    /// Timestamp as a UTC datetime, `None` when out of range.
    pub fn as_of(&self) -> Option<OffsetDateTime> {
        OffsetDateTime::from_unix_timestamp(self.timestamp).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_constituent_wire_shape() {
        let raw: ConstituentInstrument = serde_json::from_str(
            r#"{
                "codeInstrument": "SQM-B",
                "name": "SOC QUIMICA Y MINERA DE CHILE SA",
                "shortName": "SQM-B",
                "pctDay": -1.2,
                "pct30D": 3.4,
                "pctCY": 10.0,
                "pct1Y": -8.5,
                "lastPrice": 41500.0,
                "volumeMoney": 12000000.0,
                "tend": "down"
            }"#,
        )
        .expect("constituent should parse");

        assert_eq!(raw.code_instrument.as_str(), "SQM-B");
        assert_eq!(raw.tend, Trend::Down);

        let instrument = Instrument::from(&raw);
        assert_eq!(instrument.pct_1y, Some(-8.5));
        assert_eq!(instrument.volume_money, Some(12_000_000.0));
    }

    #[test]
    fn unknown_trend_values_are_tolerated() {
        let trend: Trend = serde_json::from_str("\"sideways\"").expect("trend");
        assert_eq!(trend, Trend::Unknown);
    }

    #[test]
    fn history_point_exposes_epoch_as_datetime() {
        let point: HistoryPoint = serde_json::from_str(
            r#"{
                "datetimeLastPrice": "2024-01-01 10:00:00",
                "datetimeLastPriceTs": 1704103200,
                "lastPrice": 100.5,
                "tend": "up"
            }"#,
        )
        .expect("point should parse");

        let as_of = point.as_of().expect("in range");
        assert_eq!(as_of.unix_timestamp(), 1_704_103_200);
        assert_eq!(point.trend, Trend::Up);
        assert!(point.high.is_none());
    }

    #[test]
    fn constituent_without_code_is_rejected() {
        let result = serde_json::from_str::<ConstituentInstrument>(
            r#"{"name": "X", "shortName": "X", "lastPrice": 1.0, "pctDay": 0.0}"#,
        );
        assert!(result.is_err());
    }
}
