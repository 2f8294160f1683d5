//! Time-windowed chart formatting.
//!
//! Turns a point sequence into plot coordinates for one metric. X is seconds
//! since the start of the window; Y is the metric value.

use chrono::Duration;
use wellwatch_types::{MetricPoint, TimeWindow, Timestamp};

/// Metric plotted in the detail chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChartMetric {
    #[default]
    HeartRate,
    Hrv,
    Mwi,
    SleepIndex,
    Steadiness,
}

impl ChartMetric {
    pub const ALL: [ChartMetric; 5] = [
        ChartMetric::HeartRate,
        ChartMetric::Hrv,
        ChartMetric::Mwi,
        ChartMetric::SleepIndex,
        ChartMetric::Steadiness,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            ChartMetric::HeartRate => "Heart rate (bpm)",
            ChartMetric::Hrv => "HRV (ms)",
            ChartMetric::Mwi => "Wellness index",
            ChartMetric::SleepIndex => "Sleep index",
            ChartMetric::Steadiness => "Steadiness",
        }
    }

    pub fn value(&self, point: &MetricPoint) -> Option<f64> {
        match self {
            ChartMetric::HeartRate => point.heart_rate.map(f64::from),
            ChartMetric::Hrv => point.hrv.map(f64::from),
            ChartMetric::Mwi => point.mwi,
            ChartMetric::SleepIndex => point.sleep_index,
            ChartMetric::Steadiness => point.steadiness,
        }
    }

    /// Natural range of the metric; widened if the data falls outside.
    pub fn natural_bounds(&self) -> [f64; 2] {
        match self {
            ChartMetric::HeartRate => [50.0, 160.0],
            ChartMetric::Hrv => [15.0, 100.0],
            ChartMetric::Mwi => [0.0, 100.0],
            ChartMetric::SleepIndex => [0.0, 10.0],
            ChartMetric::Steadiness => [0.0, 1.0],
        }
    }

    pub fn next(self) -> Self {
        let idx = Self::ALL.iter().position(|m| *m == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }
}

/// Plot-ready series for one metric over one window.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartSeries {
    pub data: Vec<(f64, f64)>,
    pub x_bounds: [f64; 2],
    pub y_bounds: [f64; 2],
    /// Start, middle and end labels for the x axis.
    pub x_labels: Vec<String>,
}

impl ChartSeries {
    /// Build the series for `metric` over `window`, ending at `now`.
    ///
    /// Points with no value for the metric are skipped. For bounded windows
    /// the origin is `now - window`; points before it are dropped. For
    /// [`TimeWindow::All`] the origin is the first point.
    pub fn build(
        points: &[MetricPoint],
        metric: ChartMetric,
        window: TimeWindow,
        now: Timestamp,
    ) -> Self {
        let origin = match window.minutes() {
            Some(minutes) => now - Duration::minutes(i64::from(minutes)),
            None => points.first().map(|p| p.timestamp).unwrap_or(now),
        };

        let data: Vec<(f64, f64)> = points
            .iter()
            .filter(|p| p.timestamp >= origin)
            .filter_map(|p| {
                let y = metric.value(p)?;
                Some((seconds_between(origin, p.timestamp), y))
            })
            .collect();

        let span = seconds_between(origin, now).max(1.0);
        let x_max = data.iter().map(|(x, _)| *x).fold(span, f64::max);

        let [mut y_min, mut y_max] = metric.natural_bounds();
        for (_, y) in &data {
            y_min = y_min.min(*y);
            y_max = y_max.max(*y);
        }

        let end = origin + Duration::milliseconds((x_max * 1000.0) as i64);
        let mid = origin + Duration::milliseconds((x_max * 500.0) as i64);
        let x_labels = vec![
            format_tick(origin, window),
            format_tick(mid, window),
            format_tick(end, window),
        ];

        Self {
            data,
            x_bounds: [0.0, x_max],
            y_bounds: [y_min, y_max],
            x_labels,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Format an axis tick at a resolution suited to the window.
pub fn format_tick(ts: Timestamp, window: TimeWindow) -> String {
    let pattern = match window.minutes() {
        Some(m) if m <= 60 => "%H:%M:%S",
        Some(m) if m <= 1440 => "%H:%M",
        _ => "%m-%d %H:%M",
    };
    ts.format(pattern).to_string()
}

fn seconds_between(from: Timestamp, to: Timestamp) -> f64 {
    (to - from).num_milliseconds() as f64 / 1000.0
}
