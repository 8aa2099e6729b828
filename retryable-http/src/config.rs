//! Configuration for the retrying client.
//!
//! This module contains:
//! - [`BackoffPolicy`] / [`Strategy`]: attempt budget and delay progression,
//!   plus the [`run_with_backoff`] loop that drives them
//! - [`Classify`]: per-attempt outcome verdicts ([`AcceptSuccess`] default,
//!   [`Classifier`] closure adapter)
//! - [`CancelSignal`] / [`CancelHandle`]: cooperative cancellation

mod backoff;
mod cancel;
mod classify;

pub use backoff::{BackoffPolicy, MAX_ATTEMPTS, Strategy, defaults, run_with_backoff};
pub use cancel::{CancelHandle, CancelSignal};
pub use classify::{AcceptSuccess, Classifier, Classify};
