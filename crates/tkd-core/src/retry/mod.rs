//! Retry policy for whole-part attempts.
//!
//! Every failure is treated the same: wait a flat delay, try the part again
//! from the probe, give up after the configured number of attempts.

mod policy;
mod run;

pub use policy::{RetryDecision, RetryPolicy};
pub use run::run_with_retry;
