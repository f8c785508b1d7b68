//! Master instrument list and its per-tab views.

use serde::Serialize;
use tracing::{error, info};

use crate::data_source::{MarketDataSource, SourceError};
use crate::{ConstituentInstrument, Instrument, MarketInfo, Tab};

/// Constituent list loaded from the catalog source. Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Catalog {
    pub market_info: MarketInfo,
    pub constituents: Vec<ConstituentInstrument>,
}

impl Catalog {
    pub fn new(market_info: MarketInfo, constituents: Vec<ConstituentInstrument>) -> Self {
        Self {
            market_info,
            constituents,
        }
    }

    pub fn len(&self) -> usize {
        self.constituents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.constituents.is_empty()
    }

    /// Instruments belonging to `tab`, in catalog order.
    ///
    /// Only the market named by `market_info.name` has constituents; any other
    /// tab, or an empty constituent list, is an
    /// [`UnknownTab`](crate::SourceErrorKind::UnknownTab) error.
    pub fn instruments_for_tab(&self, tab: &Tab) -> Result<Vec<Instrument>, SourceError> {
        if !tab.matches(&self.market_info.name) || self.constituents.is_empty() {
            return Err(SourceError::unknown_tab(tab));
        }

        Ok(self.constituents.iter().map(Instrument::from).collect())
    }
}

/// Load and validate the catalog from `source`.
///
/// Failures are logged and returned; the caller decides how to degrade.
pub async fn load_catalog(source: &dyn MarketDataSource) -> Result<Catalog, SourceError> {
    match source.catalog().await {
        Ok(catalog) => {
            info!(
                source = source.name(),
                market = %catalog.market_info.name,
                constituents = catalog.len(),
                "catalog loaded"
            );
            Ok(catalog)
        }
        Err(err) => {
            error!(source = source.name(), code = err.code(), error = %err, "catalog load failed");
            Err(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{InstrumentId, SourceErrorKind, Trend};

    fn constituent(code: &str, name: &str) -> ConstituentInstrument {
        ConstituentInstrument {
            code_instrument: InstrumentId::parse(code).expect("id"),
            name: name.to_owned(),
            short_name: code.to_owned(),
            last_price: 100.0,
            pct_day: 0.5,
            pct_30d: None,
            pct_cy: None,
            pct_1y: None,
            datetime_last_price: None,
            volume_money: Some(1_000.0),
            accumulated_volume_money: None,
            tend: Trend::Up,
            performance_absolute: None,
            performance_relative: None,
        }
    }

    fn ipsa_catalog(constituents: Vec<ConstituentInstrument>) -> Catalog {
        let info = MarketInfo {
            name: String::from("IPSA"),
            short_name: None,
            country_name: Some(String::from("Chile")),
            code_instrument: None,
            last_price: None,
            datetime_last_price: None,
        };
        Catalog::new(info, constituents)
    }

    #[test]
    fn maps_constituents_for_matching_tab() {
        let catalog = ipsa_catalog(vec![constituent("CHILE", "Banco de Chile"), constituent("SQM-B", "SQM")]);
        let tab = Tab::parse("IPSA").expect("tab");

        let instruments = catalog.instruments_for_tab(&tab).expect("known tab");
        let ids: Vec<&str> = instruments.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["CHILE", "SQM-B"]);
    }

    #[test]
    fn other_tabs_are_unknown() {
        let catalog = ipsa_catalog(vec![constituent("CHILE", "Banco de Chile")]);
        let tab = Tab::parse("NASDAQ").expect("tab");

        let err = catalog.instruments_for_tab(&tab).expect_err("unknown tab");
        assert_eq!(err.kind(), SourceErrorKind::UnknownTab);
    }

    #[test]
    fn empty_catalog_yields_unknown_tab() {
        let catalog = ipsa_catalog(Vec::new());
        let tab = Tab::parse("IPSA").expect("tab");
        assert!(catalog.instruments_for_tab(&tab).is_err());
    }
}
