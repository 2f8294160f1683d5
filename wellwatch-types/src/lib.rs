//! # wellwatch-types
//!
//! Core types for staff wellness monitoring. This crate defines the schema
//! shared by the wellwatch dashboard and the data provider that feeds it.
//!
//! ## Features
//!
//! - `serde`: JSON (and other formats) serialization via serde. The wire
//!   format uses snake_case field names and RFC 3339 timestamps.
//!
//! ## Example
//!
//! ```rust
//! use wellwatch_types::{MetricPoint, StaffRecord, StressLevel, TimeWindow};
//!
//! let record = StaffRecord::new(1, "Bob White", "Nurse")
//!     .with_stress_level(StressLevel::High)
//!     .with_heart_rate(104);
//!
//! assert_eq!(record.stress_level.rank(), 2);
//! assert!(MetricPoint::from_record(&record).is_none()); // never reported
//!
//! let window: TimeWindow = "6h".parse().unwrap();
//! assert_eq!(window.minutes(), Some(360));
//! assert!(window.coarse_sample());
//! ```

mod point;
mod staff;
mod window;

#[cfg(feature = "serde")]
pub mod timestamp;

pub use point::*;
pub use staff::*;
pub use window::*;

/// Timestamp type used throughout the schema.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
