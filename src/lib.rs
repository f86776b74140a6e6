//! Background internet speed probe.
//!
//! [`SpeedTestEngine`] runs one latency + download measurement at a time on a
//! background task and publishes state, fractional progress, and the final
//! result through non-blocking polling methods, so a UI frame loop can watch
//! a run without ever waiting on the network. Completed results can be
//! appended to a human-readable log file.

pub mod engine;
pub mod history;
pub mod probe;
pub mod settings;

pub use engine::{SpeedTestEngine, TestState};
pub use probe::{NetworkProbe, ProbeError, SpeedTestResult, UPLOAD_RATIO};
pub use settings::Settings;
