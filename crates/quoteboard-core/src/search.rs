//! Free-text filtering of a tab's instrument list.

use crate::Instrument;

/// Instruments whose name or short name contains `query`, ignoring case.
///
/// An empty query returns the list as is. The query is not trimmed.
pub fn filter_instruments(instruments: &[Instrument], query: &str) -> Vec<Instrument> {
    if query.is_empty() {
        return instruments.to_vec();
    }

    let needle = query.to_lowercase();
    instruments
        .iter()
        .filter(|instrument| matches(instrument, &needle))
        .cloned()
        .collect()
}

fn matches(instrument: &Instrument, needle: &str) -> bool {
    instrument.name.to_lowercase().contains(needle)
        || instrument.short_name.to_lowercase().contains(needle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::InstrumentId;

    fn instrument(id: &str, name: &str, short_name: &str) -> Instrument {
        Instrument {
            id: InstrumentId::parse(id).expect("id"),
            name: name.to_owned(),
            short_name: short_name.to_owned(),
            last_price: 1.0,
            pct_day: 0.0,
            pct_30d: None,
            pct_cy: None,
            pct_1y: None,
            volume_money: None,
        }
    }

    fn sample() -> Vec<Instrument> {
        vec![
            instrument("AAPL", "Apple Inc", "Apple"),
            instrument("MSFT", "Microsoft Corporation", "Microsoft"),
        ]
    }

    fn ids(instruments: &[Instrument]) -> Vec<&str> {
        instruments.iter().map(|i| i.id.as_str()).collect()
    }

    #[test]
    fn single_letter_matches_both_names() {
        assert_eq!(ids(&filter_instruments(&sample(), "a")), vec!["AAPL", "MSFT"]);
        assert_eq!(ids(&filter_instruments(&sample(), "A")), vec!["AAPL", "MSFT"]);
    }

    #[test]
    fn empty_query_returns_everything() {
        assert_eq!(filter_instruments(&sample(), ""), sample());
    }

    #[test]
    fn ticker_is_not_searched() {
        assert!(filter_instruments(&sample(), "msft").is_empty());
    }

    #[test]
    fn matches_short_name_only() {
        let list = vec![instrument("SQM-B", "Sociedad Quimica y Minera", "SQM-B")];
        assert_eq!(ids(&filter_instruments(&list, "sqm")), vec!["SQM-B"]);
    }
}
