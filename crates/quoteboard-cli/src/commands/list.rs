use serde::Serialize;
use serde_json::Value;

use quoteboard_core::{Instrument, InstrumentStore, Tab};

use crate::cli::ListArgs;
use crate::error::CliError;

use super::resolve_tab;

#[derive(Debug, Serialize)]
struct ListResponseData {
    tab: Tab,
    search: String,
    total: usize,
    instruments: Vec<Instrument>,
}

pub async fn run(args: &ListArgs, store: &InstrumentStore) -> Result<Value, CliError> {
    let tab = resolve_tab(store, args.tab.as_deref())?;

    store.set_active_tab(tab.clone()).await;
    if let Some(search) = &args.search {
        store.set_search_term(search.as_str());
    }

    Ok(serde_json::to_value(ListResponseData {
        tab,
        search: store.search_term(),
        total: store.all_instruments().len(),
        instruments: store.instruments(),
    })?)
}
