use serde::Serialize;
use serde_json::Value;

use quoteboard_core::{
    HistoryPoint, HistoryRange, InstrumentDetail, InstrumentId, InstrumentStore, SelectionPhase,
};

use crate::cli::ShowArgs;
use crate::error::CliError;

#[derive(Debug, Serialize)]
struct ShowResponseData {
    id: InstrumentId,
    phase: SelectionPhase,
    detail: Option<InstrumentDetail>,
    range: HistoryRange,
    points: usize,
    history: Vec<HistoryPoint>,
}

pub async fn run(args: &ShowArgs, store: &InstrumentStore) -> Result<Value, CliError> {
    let id = InstrumentId::parse(&args.code)?;
    let range: HistoryRange = args.range.parse()?;

    store.select_instrument(Some(id.clone())).await;
    store.set_history_range(range);

    let history = store.history_in_range();
    Ok(serde_json::to_value(ShowResponseData {
        id,
        phase: store.phase(),
        detail: store.detail().as_deref().cloned(),
        range,
        points: store.history().len(),
        history,
    })?)
}
