//! Historical metric samples.

use crate::{StaffRecord, Timestamp};

/// One historical sample for one staff member.
///
/// Every metric is independently nullable: a sensor can be silent on one
/// channel while the others report. Within a fetched series points are
/// ordered non-decreasing by timestamp; duplicate timestamps are allowed.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MetricPoint {
    #[cfg_attr(feature = "serde", serde(with = "crate::timestamp"))]
    pub timestamp: Timestamp,
    #[cfg_attr(feature = "serde", serde(default))]
    pub heart_rate: Option<u32>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub hrv: Option<u32>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub steadiness: Option<f64>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub sleep_index: Option<f64>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub mwi: Option<f64>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub steps: Option<u32>,
}

impl MetricPoint {
    /// Create a point with no metrics set.
    pub fn empty(timestamp: Timestamp) -> Self {
        Self {
            timestamp,
            heart_rate: None,
            hrv: None,
            steadiness: None,
            sleep_index: None,
            mwi: None,
            steps: None,
        }
    }

    /// Build a point from a record's current metrics.
    ///
    /// Returns `None` if the record has no `last_update`.
    pub fn from_record(record: &StaffRecord) -> Option<Self> {
        let timestamp = record.last_update?;
        Some(Self {
            timestamp,
            heart_rate: record.current_heart_rate,
            hrv: record.current_hrv,
            steadiness: record.current_steadiness,
            sleep_index: record.current_sleep_index,
            mwi: record.mental_wellness_index,
            steps: None,
        })
    }
}
