use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::{InstrumentId, ValidationError};

/// Tabs shown by default, in display order.
pub const DEFAULT_TABS: [&str; 5] = ["IPSA", "IGPA", "NASDAQ", "DOW JONES", "SP/BVL"];

/// Tab selected when nothing else is configured.
pub const DEFAULT_TAB: &str = "IPSA";

/// Named grouping of instruments, usually a market index.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Tab(String);

impl Tab {
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::EmptyTabName);
        }
        Ok(Self(trimmed.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// ASCII case-insensitive comparison against a market name.
    pub fn matches(&self, market_name: &str) -> bool {
        self.0.eq_ignore_ascii_case(market_name.trim())
    }

    /// Identifier selected when the tab has no constituents.
    pub fn fallback_instrument(&self) -> Result<InstrumentId, ValidationError> {
        InstrumentId::parse(&self.0)
    }

    pub fn defaults() -> Vec<Tab> {
        DEFAULT_TABS.iter().map(|name| Tab(String::from(*name))).collect()
    }
}

impl Default for Tab {
    fn default() -> Self {
        Self(String::from(DEFAULT_TAB))
    }
}

impl Display for Tab {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<String> for Tab {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Tab> for String {
    fn from(value: Tab) -> Self {
        value.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_market_name_case_insensitively() {
        let tab = Tab::parse("ipsa").expect("tab");
        assert!(tab.matches("IPSA"));
        assert!(!tab.matches("IGPA"));
    }

    #[test]
    fn default_tabs_keep_display_order() {
        let names: Vec<String> = Tab::defaults().into_iter().map(String::from).collect();
        assert_eq!(names, vec!["IPSA", "IGPA", "NASDAQ", "DOW JONES", "SP/BVL"]);
    }

    #[test]
    fn tab_name_is_a_valid_fallback_instrument() {
        let tab = Tab::parse("SP/BVL").expect("tab");
        let id = tab.fallback_instrument().expect("fallback id");
        assert_eq!(id.as_str(), "SP/BVL");
    }
}
