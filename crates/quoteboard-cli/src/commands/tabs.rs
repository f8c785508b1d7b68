use serde::Serialize;
use serde_json::Value;

use quoteboard_core::{InstrumentStore, MarketInfo, Tab};

use crate::error::CliError;

#[derive(Debug, Serialize)]
struct TabsResponseData {
    default_tab: Tab,
    tabs: Vec<Tab>,
    market_info: Option<MarketInfo>,
    constituents: usize,
}

pub async fn run(store: &InstrumentStore) -> Result<Value, CliError> {
    // A failed load leaves the count at zero.
    let constituents = store.load_catalog().await.unwrap_or(0);

    Ok(serde_json::to_value(TabsResponseData {
        default_tab: store.config().default_tab.clone(),
        tabs: store.tabs().to_vec(),
        market_info: store.market_info(),
        constituents,
    })?)
}
