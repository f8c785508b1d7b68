use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::ValidationError;

const MAX_ID_LEN: usize = 32;

/// Stable instrument code, e.g. `SQM-B` or `CHILE`.
///
/// Case is preserved as received. The history source is addressed by the
/// upper-cased form, see [`InstrumentId::history_key`].
///
/// Deserialized ids go through [`InstrumentId::from_source`]; user input goes
/// through the stricter [`InstrumentId::parse`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct InstrumentId(String);

impl InstrumentId {
    /// Parse and trim an instrument code.
    ///
    /// Tab names such as `DOW JONES` or `SP/BVL` are accepted too, since a
    /// tab with no constituents falls back to selecting its own name.
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::EmptyInstrumentId);
        }

        let len = trimmed.chars().count();
        if len > MAX_ID_LEN {
            return Err(ValidationError::InstrumentIdTooLong {
                len,
                max: MAX_ID_LEN,
            });
        }

        for (index, ch) in trimmed.chars().enumerate() {
            let valid = ch.is_ascii_alphanumeric() || matches!(ch, '.' | '-' | '_' | '/' | '&' | ' ');
            if !valid {
                return Err(ValidationError::InstrumentIdInvalidChar { ch, index });
            }
        }

        Ok(Self(trimmed.to_owned()))
    }

    /// Accept a code delivered by a data source. Only trims and rejects
    /// empty codes; sources may use characters user input may not.
    pub fn from_source(input: &str) -> Result<Self, ValidationError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::EmptyInstrumentId);
        }
        Ok(Self(trimmed.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Key used to address the history source.
    pub fn history_key(&self) -> String {
        self.0.to_ascii_uppercase()
    }
}

impl Display for InstrumentId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<String> for InstrumentId {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_source(&value)
    }
}

impl From<InstrumentId> for String {
    fn from(value: InstrumentId) -> Self {
        value.0
    }
}
