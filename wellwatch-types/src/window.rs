//! Time windows for historical queries.

use core::fmt;
use core::str::FromStr;

/// A named span bounding a historical query.
///
/// Each window maps to a minutes filter (absent for [`TimeWindow::All`]) and
/// a flag telling the provider it may return a coarse, representative subset
/// of the points instead of every sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "String", into = "String"))]
pub enum TimeWindow {
    OneMinute,
    #[default]
    FiveMinutes,
    TenMinutes,
    ThirtyMinutes,
    OneHour,
    SixHours,
    OneDay,
    TwoDays,
    All,
}

impl TimeWindow {
    /// Every window, shortest first.
    pub const ALL: [TimeWindow; 9] = [
        TimeWindow::OneMinute,
        TimeWindow::FiveMinutes,
        TimeWindow::TenMinutes,
        TimeWindow::ThirtyMinutes,
        TimeWindow::OneHour,
        TimeWindow::SixHours,
        TimeWindow::OneDay,
        TimeWindow::TwoDays,
        TimeWindow::All,
    ];

    /// Minutes filter for the query, `None` meaning unbounded.
    pub const fn minutes(&self) -> Option<u32> {
        match self {
            TimeWindow::OneMinute => Some(1),
            TimeWindow::FiveMinutes => Some(5),
            TimeWindow::TenMinutes => Some(10),
            TimeWindow::ThirtyMinutes => Some(30),
            TimeWindow::OneHour => Some(60),
            TimeWindow::SixHours => Some(360),
            TimeWindow::OneDay => Some(1440),
            TimeWindow::TwoDays => Some(2880),
            TimeWindow::All => None,
        }
    }

    /// Whether the provider may thin out the returned points.
    pub const fn coarse_sample(&self) -> bool {
        matches!(
            self,
            TimeWindow::SixHours | TimeWindow::OneDay | TimeWindow::TwoDays | TimeWindow::All
        )
    }

    pub const fn label(&self) -> &'static str {
        match self {
            TimeWindow::OneMinute => "1m",
            TimeWindow::FiveMinutes => "5m",
            TimeWindow::TenMinutes => "10m",
            TimeWindow::ThirtyMinutes => "30m",
            TimeWindow::OneHour => "1h",
            TimeWindow::SixHours => "6h",
            TimeWindow::OneDay => "1d",
            TimeWindow::TwoDays => "2d",
            TimeWindow::All => "All",
        }
    }

    /// Query string parameters for the history endpoint.
    pub fn query_params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::with_capacity(2);
        if let Some(minutes) = self.minutes() {
            params.push(("minutes", minutes.to_string()));
        }
        params.push(("sample", self.coarse_sample().to_string()));
        params
    }

    /// Cycle to the next longer window (wraps to the shortest).
    pub fn next(self) -> Self {
        let idx = self.index();
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }

    /// Cycle to the next shorter window (wraps to `All`).
    pub fn prev(self) -> Self {
        let idx = self.index();
        Self::ALL[(idx + Self::ALL.len() - 1) % Self::ALL.len()]
    }

    fn index(&self) -> usize {
        Self::ALL.iter().position(|w| w == self).unwrap_or(0)
    }
}

impl fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Error returned when parsing an unknown window label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseTimeWindowError(pub String);

impl fmt::Display for ParseTimeWindowError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unknown time window '{}' (expected one of 1m, 5m, 10m, 30m, 1h, 6h, 1d, 2d, all)",
            self.0
        )
    }
}

impl std::error::Error for ParseTimeWindowError {}

impl FromStr for TimeWindow {
    type Err = ParseTimeWindowError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|w| w.label().eq_ignore_ascii_case(needle))
            .ok_or_else(|| ParseTimeWindowError(s.to_string()))
    }
}

impl TryFrom<String> for TimeWindow {
    type Error = ParseTimeWindowError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TimeWindow> for String {
    fn from(window: TimeWindow) -> Self {
        window.label().to_string()
    }
}
