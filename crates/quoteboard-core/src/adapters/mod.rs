//! Concrete [`MarketDataSource`](crate::MarketDataSource) implementations.
//!
//! | Adapter | Backing store |
//! |---------|---------------|
//! | [`JsonDirSource`] | JSON files under a local directory |
//! | [`HttpSource`] | the same files served over HTTP |
//! | [`MemorySource`] | in-memory bodies, for tests and offline demos |
//!
//! File-backed adapters share one [`SourceLayout`].

mod http;
mod json_dir;
mod memory;

pub use http::HttpSource;
pub use json_dir::JsonDirSource;
pub use memory::MemorySource;

const ID_PLACEHOLDER: &str = "{id}";

/// Relative locations of the three payload kinds. `{id}` is replaced by the
/// instrument key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLayout {
    pub catalog: String,
    pub summary: String,
    pub history: String,
}

impl Default for SourceLayout {
    fn default() -> Self {
        Self {
            catalog: String::from("constituents/constituents.json"),
            summary: String::from("summary/{id}.json"),
            history: String::from("history/history-{id}.json"),
        }
    }
}

impl SourceLayout {
    pub fn summary_path(&self, key: &str) -> String {
        self.summary.replace(ID_PLACEHOLDER, key)
    }

    pub fn history_path(&self, key: &str) -> String {
        self.history.replace(ID_PLACEHOLDER, key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_instrument_paths() {
        let layout = SourceLayout::default();
        assert_eq!(layout.summary_path("CHILE"), "summary/CHILE.json");
        assert_eq!(layout.history_path("CHILE"), "history/history-CHILE.json");
    }
}
