use serde_json::Value;

use quoteboard_core::{HistoryRange, InstrumentId, InstrumentStore, Tab};

use crate::cli::SnapshotArgs;
use crate::error::CliError;

pub async fn run(args: &SnapshotArgs, store: &InstrumentStore) -> Result<Value, CliError> {
    // Validate every flag before touching the source.
    let tab = args.tab.as_deref().map(Tab::parse).transpose()?;
    let selection = args.select.as_deref().map(InstrumentId::parse).transpose()?;
    let range = args
        .range
        .as_deref()
        .map(str::parse::<HistoryRange>)
        .transpose()?;

    store.bootstrap().await;
    if let Some(tab) = tab {
        store.set_active_tab(tab).await;
    }
    if let Some(search) = &args.search {
        store.set_search_term(search.as_str());
    }
    if selection.is_some() {
        store.select_instrument(selection).await;
    }
    if let Some(range) = range {
        store.set_history_range(range);
    }

    Ok(serde_json::to_value(store.snapshot())?)
}
