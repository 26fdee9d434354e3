//! Scheduler module
//!
//! Handles scheduled tasks:
//! - Daily gold price refresh at the cutoff hour in IST

mod gold_refresh;

pub use gold_refresh::GoldRefreshScheduler;
