//! # wellwatch-sim
//!
//! A simulated wearable data provider for the wellwatch dashboard.
//!
//! The provider keeps a small staff roster, advances every member's vitals
//! on a fixed tick, and serves the results two ways:
//!
//! - a REST API for the roster and per-staff history ([`http`])
//! - a TCP push stream carrying each updated record as one JSON line ([`push`])
//!
//! ```no_run
//! use wellwatch_sim::{Provider, SimConfig};
//!
//! # async fn run() -> anyhow::Result<()> {
//! let provider = Provider::new(SimConfig::default()).start().await?;
//! println!("REST on {}, push on {}", provider.base_url(), provider.push_addr());
//! provider.shutdown().await;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod http;
pub mod provider;
pub mod push;
pub mod simulator;
pub mod store;

pub use config::SimConfig;
pub use provider::{Provider, RunningProvider};
pub use simulator::{classify_stress, wellness_index, Simulator, StaffSeed};
pub use store::SimStore;
