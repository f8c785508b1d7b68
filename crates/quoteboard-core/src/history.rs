//! Chart time ranges over a resolved history series.

use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use time::Duration;

use crate::{HistoryPoint, ValidationError};

/// Chart window. Labels follow the chart buttons: `S` is a week, `A` a year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum HistoryRange {
    #[serde(rename = "1D")]
    OneDay,
    #[serde(rename = "1S")]
    OneWeek,
    #[serde(rename = "1M")]
    OneMonth,
    #[serde(rename = "3M")]
    ThreeMonths,
    #[serde(rename = "6M")]
    SixMonths,
    #[default]
    #[serde(rename = "1A")]
    OneYear,
    #[serde(rename = "5A")]
    FiveYears,
}

impl HistoryRange {
    pub const ALL: [HistoryRange; 7] = [
        Self::OneDay,
        Self::OneWeek,
        Self::OneMonth,
        Self::ThreeMonths,
        Self::SixMonths,
        Self::OneYear,
        Self::FiveYears,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::OneDay => "1D",
            Self::OneWeek => "1S",
            Self::OneMonth => "1M",
            Self::ThreeMonths => "3M",
            Self::SixMonths => "6M",
            Self::OneYear => "1A",
            Self::FiveYears => "5A",
        }
    }

    /// Span covered by the range. Months are 30 days, years 365.
    pub const fn span(self) -> Duration {
        match self {
            Self::OneDay => Duration::days(1),
            Self::OneWeek => Duration::weeks(1),
            Self::OneMonth => Duration::days(30),
            Self::ThreeMonths => Duration::days(90),
            Self::SixMonths => Duration::days(180),
            Self::OneYear => Duration::days(365),
            Self::FiveYears => Duration::days(5 * 365),
        }
    }
}

impl Display for HistoryRange {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HistoryRange {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_uppercase();
        Self::ALL
            .into_iter()
            .find(|range| range.as_str() == normalized)
            .ok_or_else(|| ValidationError::InvalidHistoryRange {
                value: value.to_owned(),
            })
    }
}

/// Tail of `points` that falls within `range` of the latest point.
///
/// `points` must be sorted by timestamp, as sources return them.
pub fn window(points: &[HistoryPoint], range: HistoryRange) -> &[HistoryPoint] {
    let Some(last) = points.last() else {
        return points;
    };

    let start = last.timestamp.saturating_sub(range.span().whole_seconds());
    let first = points.partition_point(|point| point.timestamp < start);
    &points[first..]
}
