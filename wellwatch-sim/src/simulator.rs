//! Random-walk vitals simulator.
//!
//! Each tick moves every staff member's heart rate and HRV a small random
//! step. Occasionally a stress event spikes the heart rate; the following
//! ticks recover it towards the member's baseline. Steadiness and sleep
//! index drift slowly, and the wellness index is derived from the rest.

use std::collections::HashMap;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info};
use wellwatch_types::{MetricPoint, StaffId, StaffRecord, StressLevel, Timestamp};

pub const HEART_RATE_RANGE: (i64, i64) = (50, 160);
pub const HRV_RANGE: (i64, i64) = (15, 100);

/// Default chance per tick that a stable staff member starts a stress event.
pub const DEFAULT_STRESS_EVENT_CHANCE: f64 = 0.05;

/// Classify stress from the current heart rate and HRV.
pub fn classify_stress(heart_rate: u32, hrv: u32) -> StressLevel {
    if heart_rate > 120 || hrv < 25 {
        StressLevel::Critical
    } else if heart_rate > 100 || hrv < 40 {
        StressLevel::High
    } else {
        StressLevel::Normal
    }
}

/// Composite 0..100 wellness index from HRV, steadiness and sleep index.
pub fn wellness_index(hrv: u32, steadiness: f64, sleep_index: f64) -> f64 {
    let (lo, hi) = HRV_RANGE;
    let hrv_score = (f64::from(hrv) - lo as f64) / (hi - lo) as f64 * 100.0;
    let score = 0.4 * hrv_score + 0.3 * steadiness * 100.0 + 0.3 * sleep_index * 10.0;
    round_to(score.clamp(0.0, 100.0), 1)
}

fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Trend {
    Stable,
    Rising,
    Recovering,
}

impl Trend {
    fn sign(self) -> i64 {
        match self {
            Trend::Stable => 0,
            Trend::Rising => 1,
            Trend::Recovering => -1,
        }
    }
}

#[derive(Debug, Clone)]
struct VitalsState {
    baseline_hr: i64,
    trend: Trend,
    stress_event_chance: f64,
}

/// A sample staff member to seed the roster with.
#[derive(Debug, Clone, PartialEq, serde::Deserialize)]
pub struct StaffSeed {
    pub name: String,
    pub role: String,
}

impl StaffSeed {
    pub fn new(name: impl Into<String>, role: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            role: role.into(),
        }
    }
}

/// The four staff members the provider starts with by default.
pub fn default_roster() -> Vec<StaffSeed> {
    vec![
        StaffSeed::new("Dr. Alice Green", "Doctor"),
        StaffSeed::new("Bob White", "Nurse"),
        StaffSeed::new("Carol Black", "Nurse"),
        StaffSeed::new("Dave Gray", "Technician"),
    ]
}

/// Build initial records with resting values, ids starting at 1.
pub fn seed_records(seeds: &[StaffSeed], now: Timestamp) -> Vec<StaffRecord> {
    seeds
        .iter()
        .zip(1..)
        .map(|(seed, id)| {
            StaffRecord::new(id, seed.name.clone(), seed.role.clone())
                .with_heart_rate(70)
                .with_hrv(50)
                .with_steadiness(0.85)
                .with_sleep_index(7.0)
                .with_mwi(75.0)
                .with_last_update(now)
        })
        .map(|mut record| {
            record.sleep_hours_last_night = Some(7.0);
            record
        })
        .collect()
}

/// Generates the next reading for every staff member.
#[derive(Debug)]
pub struct Simulator {
    rng: StdRng,
    records: Vec<StaffRecord>,
    states: HashMap<StaffId, VitalsState>,
    stress_event_chance: f64,
}

impl Simulator {
    /// Create a simulator over `records`. A seed makes runs reproducible.
    pub fn new(records: Vec<StaffRecord>, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            rng,
            records,
            states: HashMap::new(),
            stress_event_chance: DEFAULT_STRESS_EVENT_CHANCE,
        }
    }

    pub fn with_stress_event_chance(mut self, chance: f64) -> Self {
        self.stress_event_chance = chance.clamp(0.0, 1.0);
        self
    }

    pub fn records(&self) -> &[StaffRecord] {
        &self.records
    }

    /// Advance every staff member one step.
    ///
    /// Returns the updated record and the matching history point for each.
    pub fn tick(&mut self, now: Timestamp) -> Vec<(StaffRecord, MetricPoint)> {
        let mut out = Vec::with_capacity(self.records.len());
        for idx in 0..self.records.len() {
            let record = self.step(idx, now);
            let point = MetricPoint {
                timestamp: now,
                heart_rate: record.current_heart_rate,
                hrv: record.current_hrv,
                steadiness: record.current_steadiness,
                sleep_index: record.current_sleep_index,
                mwi: record.mental_wellness_index,
                steps: Some(self.rng.gen_range(0..=10)),
            };
            out.push((record, point));
        }
        out
    }

    fn step(&mut self, idx: usize, now: Timestamp) -> StaffRecord {
        let id = self.records[idx].id;
        let chance = self.stress_event_chance;
        let rng = &mut self.rng;
        let state = self.states.entry(id).or_insert_with(|| {
            info!(staff_id = id, "Initialized simulation state");
            VitalsState {
                baseline_hr: rng.gen_range(60..=80),
                trend: Trend::Stable,
                stress_event_chance: chance,
            }
        });

        let record = &mut self.records[idx];
        let prev_hr = i64::from(record.current_heart_rate.unwrap_or(70));
        let prev_hrv = i64::from(record.current_hrv.unwrap_or(50));

        let mut hr_change = rng.gen_range(-2..=2) + state.trend.sign() * 2;

        match state.trend {
            Trend::Stable if rng.gen_bool(state.stress_event_chance) => {
                hr_change += rng.gen_range(20..=40);
                state.trend = Trend::Rising;
                state.stress_event_chance = 0.0;
                info!(staff_id = id, "Stress event triggered");
            }
            Trend::Rising => {
                state.trend = Trend::Recovering;
                debug!(staff_id = id, "Recovery phase started");
            }
            Trend::Recovering if prev_hr <= state.baseline_hr + 5 => {
                state.trend = Trend::Stable;
                state.stress_event_chance = chance;
                debug!(staff_id = id, "Recovery phase ended");
            }
            _ => {}
        }

        let mut hr = prev_hr + hr_change;
        if state.trend == Trend::Stable {
            if hr > state.baseline_hr + 10 {
                hr -= rng.gen_range(0..=2);
            } else if hr < state.baseline_hr - 5 {
                hr += rng.gen_range(0..=1);
            }
        }
        let hr = hr.clamp(HEART_RATE_RANGE.0, HEART_RATE_RANGE.1);

        let mut hrv_change: i64 = rng.gen_range(-3..=3);
        match state.trend {
            Trend::Rising => hrv_change -= rng.gen_range(4..=8),
            Trend::Recovering => hrv_change += rng.gen_range(2..=5),
            Trend::Stable => {}
        }
        if hr > 100 {
            hrv_change -= rng.gen_range(1..=5);
        } else if hr < 70 {
            hrv_change += rng.gen_range(0..=2);
        }
        let hrv = (prev_hrv + hrv_change).clamp(HRV_RANGE.0, HRV_RANGE.1);

        let mut steadiness_change = rng.gen_range(-0.02..=0.02);
        if state.trend == Trend::Rising {
            steadiness_change -= 0.05;
        }
        let steadiness =
            round_to((record.current_steadiness.unwrap_or(0.85) + steadiness_change).clamp(0.0, 1.0), 2);
        let sleep_index = round_to(
            (record.current_sleep_index.unwrap_or(7.0) + rng.gen_range(-0.05..=0.05)).clamp(0.0, 10.0),
            2,
        );

        // Both bounds are non-negative, so the casts cannot truncate.
        let hr = hr as u32;
        let hrv = hrv as u32;

        record.current_heart_rate = Some(hr);
        record.current_hrv = Some(hrv);
        record.current_steadiness = Some(steadiness);
        record.current_sleep_index = Some(sleep_index);
        record.mental_wellness_index = Some(wellness_index(hrv, steadiness, sleep_index));
        record.stress_level = classify_stress(hr, hrv);
        record.last_update = Some(now);

        debug!(
            staff_id = id,
            hr,
            hrv,
            stress = %record.stress_level,
            "Simulated reading"
        );
        record.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    fn start() -> Timestamp {
        Utc.with_ymd_and_hms(2024, 5, 1, 8, 0, 0).unwrap()
    }

    fn simulator(seed: u64) -> Simulator {
        Simulator::new(seed_records(&default_roster(), start()), Some(seed))
    }

    #[test]
    fn stress_classification_thresholds() {
        assert_eq!(classify_stress(70, 50), StressLevel::Normal);
        assert_eq!(classify_stress(100, 40), StressLevel::Normal);
        assert_eq!(classify_stress(101, 50), StressLevel::High);
        assert_eq!(classify_stress(70, 39), StressLevel::High);
        assert_eq!(classify_stress(120, 40), StressLevel::High);
        assert_eq!(classify_stress(121, 50), StressLevel::Critical);
        assert_eq!(classify_stress(70, 24), StressLevel::Critical);
    }

    #[test]
    fn wellness_index_is_bounded() {
        assert_eq!(wellness_index(100, 1.0, 10.0), 100.0);
        assert_eq!(wellness_index(15, 0.0, 0.0), 0.0);
        let mid = wellness_index(50, 0.85, 7.0);
        assert!(mid > 0.0 && mid < 100.0);
    }

    #[test]
    fn default_roster_is_seeded() {
        let records = seed_records(&default_roster(), start());
        assert_eq!(records.len(), 4);
        assert_eq!(records[0].id, 1);
        assert_eq!(records[0].name, "Dr. Alice Green");
        assert_eq!(records[3].role, "Technician");
        assert_eq!(records[1].current_heart_rate, Some(70));
        assert_eq!(records[1].sleep_hours_last_night, Some(7.0));
    }

    #[test]
    fn values_stay_in_bounds() {
        let mut sim = simulator(7).with_stress_event_chance(0.3);
        let mut now = start();
        for _ in 0..2_000 {
            now += Duration::seconds(5);
            for (record, point) in sim.tick(now) {
                let hr = record.current_heart_rate.unwrap();
                let hrv = record.current_hrv.unwrap();
                assert!((50..=160).contains(&hr));
                assert!((15..=100).contains(&hrv));
                assert!((0.0..=1.0).contains(&record.current_steadiness.unwrap()));
                assert!((0.0..=10.0).contains(&record.current_sleep_index.unwrap()));
                assert!((0.0..=100.0).contains(&record.mental_wellness_index.unwrap()));
                assert_eq!(record.stress_level, classify_stress(hr, hrv));
                assert!(point.steps.unwrap() <= 10);
            }
        }
    }

    #[test]
    fn tick_stamps_records_and_points() {
        let mut sim = simulator(1);
        let now = start() + Duration::seconds(5);
        let out = sim.tick(now);
        assert_eq!(out.len(), 4);
        for (record, point) in &out {
            assert_eq!(record.last_update, Some(now));
            assert_eq!(point.timestamp, now);
            assert_eq!(point.heart_rate, record.current_heart_rate);
            assert_eq!(point.mwi, record.mental_wellness_index);
        }
        assert_eq!(sim.records()[0].last_update, Some(now));
    }

    #[test]
    fn same_seed_same_sequence() {
        let mut a = simulator(42);
        let mut b = simulator(42);
        let now = start() + Duration::seconds(5);
        assert_eq!(a.tick(now), b.tick(now));
    }

    #[test]
    fn stress_event_raises_heart_rate() {
        let mut sim = simulator(3).with_stress_event_chance(1.0);
        let out = sim.tick(start() + Duration::seconds(5));
        // Every member starts stable, so every member spikes by at least 20 - 2.
        for (record, _) in out {
            assert!(record.current_heart_rate.unwrap() >= 70 + 18);
        }
    }
}
