//! In-memory roster and history shared by the ticker and the servers.

use std::collections::{BTreeMap, HashMap, VecDeque};
use std::sync::Arc;

use chrono::Duration;
use parking_lot::RwLock;
use wellwatch_types::{MetricPoint, StaffId, StaffRecord, Timestamp};

/// Maximum number of points a sampled history response carries.
pub const DEFAULT_MAX_POINTS: usize = 300;

/// Points retained per staff member before the oldest are dropped.
pub const DEFAULT_HISTORY_LIMIT: usize = 50_000;

#[derive(Debug, Default)]
struct Inner {
    roster: BTreeMap<StaffId, StaffRecord>,
    history: HashMap<StaffId, VecDeque<MetricPoint>>,
}

/// Thread-safe store for the simulated data. Cloning shares the store.
#[derive(Debug, Clone)]
pub struct SimStore {
    inner: Arc<RwLock<Inner>>,
    max_points: usize,
    history_limit: usize,
}

impl Default for SimStore {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_POINTS, DEFAULT_HISTORY_LIMIT)
    }
}

impl SimStore {
    pub fn new(max_points: usize, history_limit: usize) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Inner::default())),
            max_points: max_points.max(1),
            history_limit: history_limit.max(1),
        }
    }

    /// Insert or replace staff records without recording history.
    pub fn seed(&self, records: impl IntoIterator<Item = StaffRecord>) {
        let mut inner = self.inner.write();
        for record in records {
            inner.roster.insert(record.id, record);
        }
    }

    /// Store a fresh reading: replace the record and append the point.
    pub fn record(&self, record: StaffRecord, point: MetricPoint) {
        let limit = self.history_limit;
        let mut inner = self.inner.write();
        let series = inner.history.entry(record.id).or_default();
        series.push_back(point);
        while series.len() > limit {
            series.pop_front();
        }
        inner.roster.insert(record.id, record);
    }

    /// All staff records, ordered by id.
    pub fn roster(&self) -> Vec<StaffRecord> {
        self.inner.read().roster.values().cloned().collect()
    }

    pub fn staff(&self, id: StaffId) -> Option<StaffRecord> {
        self.inner.read().roster.get(&id).cloned()
    }

    /// History for `id`, oldest first.
    ///
    /// `minutes` bounds the lookback from `now`; `None` returns everything.
    /// With `sample` set, long series are thinned to at most the configured
    /// number of points. Returns `None` for an unknown staff member.
    pub fn history(
        &self,
        id: StaffId,
        minutes: Option<u32>,
        sample: bool,
        now: Timestamp,
    ) -> Option<Vec<MetricPoint>> {
        let inner = self.inner.read();
        if !inner.roster.contains_key(&id) {
            return None;
        }

        let threshold = minutes.map(|m| now - Duration::minutes(i64::from(m)));
        let points: Vec<MetricPoint> = inner
            .history
            .get(&id)
            .into_iter()
            .flatten()
            .filter(|p| threshold.is_none_or(|t| p.timestamp >= t))
            .cloned()
            .collect();

        if sample {
            Some(downsample(points, self.max_points))
        } else {
            Some(points)
        }
    }
}

/// Keep every n-th point, counting back from the newest so it is always kept.
pub fn downsample(points: Vec<MetricPoint>, max_points: usize) -> Vec<MetricPoint> {
    if max_points == 0 || points.len() <= max_points {
        return points;
    }
    let step = points.len().div_ceil(max_points);
    let last = points.len() - 1;
    points
        .into_iter()
        .enumerate()
        .filter(|(idx, _)| (last - idx) % step == 0)
        .map(|(_, p)| p)
        .collect()
}
