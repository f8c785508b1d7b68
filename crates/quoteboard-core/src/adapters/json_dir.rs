use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::debug;

use super::SourceLayout;
use crate::data_source::{MarketDataSource, SourceError, SourceFuture};
use crate::payload::{parse_catalog, parse_history, parse_summary};
use crate::{Catalog, HistoryPoint, InstrumentDetail, InstrumentId};

/// Reads payloads from JSON files under a root directory.
#[derive(Debug, Clone)]
pub struct JsonDirSource {
    root: PathBuf,
    layout: SourceLayout,
}

impl JsonDirSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            layout: SourceLayout::default(),
        }
    }

    pub fn with_layout(mut self, layout: SourceLayout) -> Self {
        self.layout = layout;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    async fn read(&self, relative: &str, what: &str) -> Result<String, SourceError> {
        let path = self.root.join(relative);
        debug!(path = %path.display(), "reading payload file");
        tokio::fs::read_to_string(&path).await.map_err(|error| match error.kind() {
            ErrorKind::NotFound => SourceError::unavailable(format!("no {what} file at {}", path.display())),
            _ => SourceError::unavailable(format!("failed to read {}: {error}", path.display())),
        })
    }
}

/// Keys become file names, so anything that could leave the root is refused.
fn file_key(key: &str) -> Result<&str, SourceError> {
    if key.contains('/') || key.contains('\\') || key.starts_with('.') {
        return Err(SourceError::unavailable(format!(
            "'{key}' cannot be mapped to a payload file"
        )));
    }
    Ok(key)
}

impl MarketDataSource for JsonDirSource {
    fn name(&self) -> &'static str {
        "json_dir"
    }

    fn catalog<'a>(&'a self) -> SourceFuture<'a, Catalog> {
        Box::pin(async move {
            let body = self.read(&self.layout.catalog, "catalog").await?;
            parse_catalog(&body)
        })
    }

    fn summary<'a>(&'a self, id: &'a InstrumentId) -> SourceFuture<'a, InstrumentDetail> {
        Box::pin(async move {
            let key = file_key(id.as_str())?;
            let body = self.read(&self.layout.summary_path(key), "summary").await?;
            parse_summary(key, &body)
        })
    }

    fn history<'a>(&'a self, id: &'a InstrumentId) -> SourceFuture<'a, Vec<HistoryPoint>> {
        Box::pin(async move {
            let history_key = id.history_key();
            let key = file_key(&history_key)?;
            let body = self.read(&self.layout.history_path(key), "history").await?;
            parse_history(key, &body)
        })
    }
}
