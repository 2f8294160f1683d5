//! Staff roster records.

use core::fmt;
use core::str::FromStr;

use crate::Timestamp;

/// Stable identifier of a staff member.
pub type StaffId = u64;

/// Stress classification produced by the data provider.
///
/// Consumers display this value as received; it is never recomputed
/// client-side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum StressLevel {
    #[default]
    Normal,
    High,
    Critical,
}

impl StressLevel {
    /// Severity rank: Critical=1, High=2, Normal=3. Lower is more severe.
    pub const fn rank(&self) -> u8 {
        match self {
            StressLevel::Critical => 1,
            StressLevel::High => 2,
            StressLevel::Normal => 3,
        }
    }

    /// Returns a short symbol for display.
    pub const fn symbol(&self) -> &'static str {
        match self {
            StressLevel::Normal => "OK",
            StressLevel::High => "HIGH",
            StressLevel::Critical => "CRIT",
        }
    }

    pub const fn label(&self) -> &'static str {
        match self {
            StressLevel::Normal => "Normal",
            StressLevel::High => "High",
            StressLevel::Critical => "Critical",
        }
    }
}

impl fmt::Display for StressLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Error returned when parsing an unknown stress level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseStressLevelError(pub String);

impl fmt::Display for ParseStressLevelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown stress level: {}", self.0)
    }
}

impl std::error::Error for ParseStressLevelError {}

impl FromStr for StressLevel {
    type Err = ParseStressLevelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "normal" => Ok(StressLevel::Normal),
            "high" => Ok(StressLevel::High),
            "critical" => Ok(StressLevel::Critical),
            _ => Err(ParseStressLevelError(s.to_string())),
        }
    }
}

/// One staff member's latest known state.
///
/// A record is always replaced as a whole; there is no field-level merge.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StaffRecord {
    pub id: StaffId,
    pub name: String,
    /// Free-text category (e.g. "Nurse", "Doctor").
    pub role: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub stress_level: StressLevel,
    /// Beats per minute.
    #[cfg_attr(feature = "serde", serde(default))]
    pub current_heart_rate: Option<u32>,
    /// Heart rate variability in milliseconds.
    #[cfg_attr(feature = "serde", serde(default))]
    pub current_hrv: Option<u32>,
    /// 0..1 scale.
    #[cfg_attr(feature = "serde", serde(default))]
    pub current_steadiness: Option<f64>,
    /// 0..10 scale.
    #[cfg_attr(feature = "serde", serde(default))]
    pub current_sleep_index: Option<f64>,
    /// Composite mental wellness index, 0..100 scale.
    #[cfg_attr(feature = "serde", serde(default))]
    pub mental_wellness_index: Option<f64>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub sleep_hours_last_night: Option<f64>,
    /// Absent if the staff member has never reported.
    #[cfg_attr(
        feature = "serde",
        serde(default, with = "crate::timestamp::option")
    )]
    pub last_update: Option<Timestamp>,
}

impl StaffRecord {
    /// Create a record with no metrics reported yet.
    pub fn new(id: StaffId, name: impl Into<String>, role: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            role: role.into(),
            stress_level: StressLevel::Normal,
            current_heart_rate: None,
            current_hrv: None,
            current_steadiness: None,
            current_sleep_index: None,
            mental_wellness_index: None,
            sleep_hours_last_night: None,
            last_update: None,
        }
    }

    pub fn with_stress_level(mut self, level: StressLevel) -> Self {
        self.stress_level = level;
        self
    }

    pub fn with_heart_rate(mut self, bpm: u32) -> Self {
        self.current_heart_rate = Some(bpm);
        self
    }

    pub fn with_hrv(mut self, hrv: u32) -> Self {
        self.current_hrv = Some(hrv);
        self
    }

    pub fn with_steadiness(mut self, steadiness: f64) -> Self {
        self.current_steadiness = Some(steadiness);
        self
    }

    pub fn with_sleep_index(mut self, index: f64) -> Self {
        self.current_sleep_index = Some(index);
        self
    }

    pub fn with_mwi(mut self, mwi: f64) -> Self {
        self.mental_wellness_index = Some(mwi);
        self
    }

    pub fn with_last_update(mut self, at: Timestamp) -> Self {
        self.last_update = Some(at);
        self
    }
}
