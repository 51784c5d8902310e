//! # Core Application Logic
//!
//! This module contains Footprints' business logic.
//! It knows nothing about how the results are shown.
//!
//! ```text
//!                    ┌─────────────────────────┐
//!                    │         CORE            │
//!                    │  (this module)          │
//!                    │                         │
//!                    │  • Dataset (countries)  │
//!                    │  • Stats (pure)         │
//!                    │  • App + Action         │
//!                    └───────────┬─────────────┘
//!                                │
//!            ┌───────────────────┼───────────────────┐
//!            ▼                   ▼                   ▼
//!     ┌────────────┐      ┌────────────┐      ┌────────────┐
//!     │    CLI     │      │  Web map   │      │   Other    │
//!     │  (main.rs) │      │  (future)  │      │  (future)  │
//!     └────────────┘      └────────────┘      └────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`dataset`]: Reference countries and name resolution
//! - [`stats`]: Continents covered, percent explored, top traveler
//! - [`state`]: The `App` struct, everything the UI reads
//! - [`action`]: The `Action` enum, everything a user can ask for
//! - [`config`]: Layered configuration

pub mod action;
pub mod config;
pub mod dataset;
pub mod state;
pub mod stats;
