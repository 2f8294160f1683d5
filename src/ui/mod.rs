//! Terminal UI rendering using ratatui.
//!
//! ## Submodules
//!
//! - [`roster`]: Main table of every visible staff member
//! - [`detail`]: Modal overlay charting the selected staff member's history
//! - [`common`]: Shared components (header, window tabs, status bar, help overlay)
//! - [`theme`]: Light/dark theme support with terminal auto-detection
//!
//! ## Rendering Architecture
//!
//! ```text
//! ┌──────────────────────────────────────┐
//! │ Header (common::render_header)       │
//! ├──────────────────────────────────────┤
//! │ Window tabs (common::render_tabs)    │
//! ├──────────────────────────────────────┤
//! │                                      │
//! │ Roster table (roster::render)        │
//! │                                      │
//! ├──────────────────────────────────────┤
//! │ Status Bar (common::render_status)   │
//! └──────────────────────────────────────┘
//!         ↑
//!    Overlays rendered on top:
//!    - detail::render_overlay
//!    - common::render_help
//! ```

pub mod common;
pub mod detail;
pub mod roster;
pub mod theme;

pub use theme::{Theme, ThemeMode};
