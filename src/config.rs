//! Dashboard configuration.
//!
//! Settings are layered, later sources winning:
//!
//! 1. built-in defaults
//! 2. an optional TOML file (`--config`)
//! 3. `WELLWATCH_*` environment variables (e.g. `WELLWATCH_SERVER_URL`)
//! 4. command-line flags, applied by the binary
//!
//! ```toml
//! server_url = "http://127.0.0.1:5001"
//! push_addr = "127.0.0.1:5002"
//! window = "1h"
//! sort = "mwi"
//! role = "Nurse"
//! theme = "dark"
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use config::{Config, Environment, File, Map};
use serde::Deserialize;
use wellwatch_types::TimeWindow;

use crate::data::{RoleFilter, SortKey, SortState};
use crate::transport::Backoff;
use crate::ui::ThemeMode;

/// Environment variable prefix.
pub const ENV_PREFIX: &str = "WELLWATCH";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Base URL of the provider's REST API.
    pub server_url: String,
    /// host:port of the provider's push stream.
    pub push_addr: String,
    pub request_timeout_ms: u64,
    pub reconnect_initial_ms: u64,
    pub reconnect_max_ms: u64,
    /// Event loop poll interval.
    pub tick_ms: u64,
    pub window: TimeWindow,
    pub sort: String,
    pub role: String,
    pub theme: String,
    pub log_file: Option<PathBuf>,
    pub log_filter: String,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            server_url: "http://127.0.0.1:5001".to_string(),
            push_addr: "127.0.0.1:5002".to_string(),
            request_timeout_ms: 5_000,
            reconnect_initial_ms: 500,
            reconnect_max_ms: 30_000,
            tick_ms: 100,
            window: TimeWindow::default(),
            sort: SortKey::default().label().to_string(),
            role: RoleFilter::ALL_LABEL.to_string(),
            theme: "auto".to_string(),
            log_file: None,
            log_filter: "info".to_string(),
        }
    }
}

impl DashboardConfig {
    /// Load defaults, then `path` if given, then the environment.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::load_with_env(path, None)
    }

    /// Like [`DashboardConfig::load`], reading variables from `env` instead
    /// of the process environment when given.
    pub fn load_with_env(path: Option<&Path>, env: Option<Map<String, String>>) -> Result<Self> {
        let mut builder = Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(File::from(path));
        }
        let config = builder
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .try_parsing(true)
                    .source(env),
            )
            .build()
            .context("failed to read configuration")?;

        let cfg: Self = config
            .try_deserialize()
            .context("invalid configuration")?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Check the fields that are parsed lazily.
    pub fn validate(&self) -> Result<()> {
        self.sort_key()?;
        self.theme_mode()?;
        if self.reconnect_initial_ms == 0 {
            return Err(anyhow!("reconnect_initial_ms must be positive"));
        }
        Ok(())
    }

    pub fn sort_key(&self) -> Result<SortKey> {
        self.sort.parse().map_err(|e: String| anyhow!(e))
    }

    pub fn sort_state(&self) -> Result<SortState> {
        Ok(SortState::new(self.sort_key()?))
    }

    pub fn role_filter(&self) -> RoleFilter {
        RoleFilter::from(self.role.as_str())
    }

    pub fn theme_mode(&self) -> Result<ThemeMode> {
        self.theme.parse().map_err(|e: String| anyhow!(e))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn tick(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }

    pub fn backoff(&self) -> Backoff {
        Backoff::new(
            Duration::from_millis(self.reconnect_initial_ms),
            Duration::from_millis(self.reconnect_max_ms.max(self.reconnect_initial_ms)),
        )
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
        let cfg = DashboardConfig::default();
        assert_eq!(cfg.server_url, "http://127.0.0.1:5001");
        assert_eq!(cfg.window, TimeWindow::FiveMinutes);
        assert_eq!(cfg.sort_key().unwrap(), SortKey::Status);
        assert_eq!(cfg.role_filter(), RoleFilter::All);
        assert_eq!(cfg.theme_mode().unwrap(), ThemeMode::Auto);
        assert_eq!(cfg.backoff(), Backoff::default());
    }

    #[test]
    fn file_overrides_defaults() {
        let file = write_config(
            r#"
server_url = "http://dash.example:8080"
window = "6h"
sort = "mwi"
role = "Nurse"
request_timeout_ms = 1500
"#,
        );

        let cfg = DashboardConfig::load(Some(file.path())).unwrap();
        assert_eq!(cfg.server_url, "http://dash.example:8080");
        assert_eq!(cfg.window, TimeWindow::SixHours);
        assert_eq!(cfg.sort_key().unwrap(), SortKey::Mwi);
        assert_eq!(cfg.role_filter(), RoleFilter::Role("Nurse".to_string()));
        assert_eq!(cfg.request_timeout(), Duration::from_millis(1500));
        // Untouched keys keep their defaults.
        assert_eq!(cfg.push_addr, "127.0.0.1:5002");
    }

    #[test]
    fn invalid_sort_is_rejected() {
        let file = write_config("sort = \"shoe_size\"\n");
        assert!(DashboardConfig::load(Some(file.path())).is_err());
    }

    #[test]
    fn invalid_window_is_rejected() {
        let file = write_config("window = \"3h\"\n");
        assert!(DashboardConfig::load(Some(file.path())).is_err());
    }

    fn env(vars: &[(&str, &str)]) -> Option<Map<String, String>> {
        Some(
            vars.iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }

    #[test]
    fn environment_overrides_file() {
        let file = write_config("sort = \"mwi\"\nrole = \"Nurse\"\n");
        let cfg = DashboardConfig::load_with_env(
            Some(file.path()),
            env(&[("WELLWATCH_SORT", "hrv"), ("WELLWATCH_TICK_MS", "250")]),
        )
        .unwrap();

        assert_eq!(cfg.sort_key().unwrap(), SortKey::Hrv);
        assert_eq!(cfg.tick(), Duration::from_millis(250));
        assert_eq!(cfg.role_filter(), RoleFilter::Role("Nurse".to_string()));
    }

    #[test]
    fn invalid_sort_from_environment_is_rejected() {
        assert!(DashboardConfig::load_with_env(None, env(&[("WELLWATCH_SORT", "age")])).is_err());
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(DashboardConfig::load(Some(&dir.path().join("absent.toml"))).is_err());
    }
}
