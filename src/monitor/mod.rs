//! Runtime monitoring of an instrumented program.
//!
//! - events: `EventKind` and the `Frame` snapshot passed with each event
//! - dispatch: process-wide subscriber registry shared by all threads
//! - monitor: `TypeMonitor`, the subscriber that checks annotated locals
//! - result: `CheckResult`, one recorded observation

pub mod dispatch;
pub mod events;
pub mod monitor;
pub mod result;

#[cfg(test)]
mod tests;
