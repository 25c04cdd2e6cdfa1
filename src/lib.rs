//! Submit data-license history and data jobs, then poll until both finish.
//!
//! [`controller::JobController`] drives the two jobs; [`dlws`] is the
//! remote boundary and [`state_machine`] holds the job model, status
//! classification and retry policy.

pub mod cli;
pub mod config;
pub mod controller;
pub mod dlws;
pub mod error;
pub mod input;
pub mod shutdown;
pub mod state_machine;
pub mod ui;
