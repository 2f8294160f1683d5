//! Provider configuration: defaults, then an optional TOML file, then
//! `WELLWATCH_SIM_*` environment variables.

use std::path::Path;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use config::{Config, Environment, File};
use serde::Deserialize;

use crate::simulator::{default_roster, StaffSeed, DEFAULT_STRESS_EVENT_CHANCE};
use crate::store::{DEFAULT_HISTORY_LIMIT, DEFAULT_MAX_POINTS};

pub const ENV_PREFIX: &str = "WELLWATCH_SIM";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// REST API bind address. Port 0 picks a free port.
    pub http_addr: String,
    /// Push stream bind address.
    pub push_addr: String,
    pub tick_ms: u64,
    /// Cap on points in a sampled history response.
    pub max_points: usize,
    pub history_limit: usize,
    pub stress_event_chance: f64,
    /// Fixed RNG seed for reproducible runs.
    pub seed: Option<u64>,
    pub staff: Vec<StaffSeed>,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            http_addr: "0.0.0.0:5001".to_string(),
            push_addr: "0.0.0.0:5002".to_string(),
            tick_ms: 5_000,
            max_points: DEFAULT_MAX_POINTS,
            history_limit: DEFAULT_HISTORY_LIMIT,
            stress_event_chance: DEFAULT_STRESS_EVENT_CHANCE,
            seed: None,
            staff: default_roster(),
        }
    }
}

impl SimConfig {
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(File::from(path));
        }
        let cfg: Self = builder
            .add_source(Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()
            .context("failed to read configuration")?
            .try_deserialize()
            .context("invalid configuration")?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        if self.tick_ms == 0 {
            return Err(anyhow!("tick_ms must be positive"));
        }
        if !(0.0..=1.0).contains(&self.stress_event_chance) {
            return Err(anyhow!(
                "stress_event_chance must be between 0 and 1, got {}",
                self.stress_event_chance
            ));
        }
        if self.staff.is_empty() {
            return Err(anyhow!("at least one staff member is required"));
        }
        Ok(())
    }

    pub fn tick(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn defaults() {
        let cfg = SimConfig::default();
        assert_eq!(cfg.http_addr, "0.0.0.0:5001");
        assert_eq!(cfg.tick(), Duration::from_secs(5));
        assert_eq!(cfg.staff.len(), 4);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn file_overrides_defaults() {
        let file = write_config(
            r#"
http_addr = "127.0.0.1:0"
tick_ms = 250
seed = 9

[[staff]]
name = "Erin Blue"
role = "Paramedic"
"#,
        );
        let cfg = SimConfig::load(Some(file.path())).unwrap();
        assert_eq!(cfg.http_addr, "127.0.0.1:0");
        assert_eq!(cfg.tick(), Duration::from_millis(250));
        assert_eq!(cfg.seed, Some(9));
        assert_eq!(cfg.staff, vec![StaffSeed::new("Erin Blue", "Paramedic")]);
        assert_eq!(cfg.push_addr, "0.0.0.0:5002");
    }

    #[test]
    fn out_of_range_chance_is_rejected() {
        let file = write_config("stress_event_chance = 1.5\n");
        assert!(SimConfig::load(Some(file.path())).is_err());
    }

    #[test]
    fn zero_tick_is_rejected() {
        let cfg = SimConfig {
            tick_ms: 0,
            ..SimConfig::default()
        };
        assert!(cfg.validate().is_err());
    }
}
