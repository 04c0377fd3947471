// src/exec/mod.rs

//! Process execution layer.
//!
//! Runs the external command that generates configuration text in command
//! mode, using `tokio::process::Command`.
//!
//! - [`backend`] provides the `CommandRunner` trait that acquisition talks to,
//!   so tests can swap in a fake.
//! - [`command`] holds `RealCommandRunner`, the production implementation.

pub mod backend;
pub mod command;

pub use backend::{CommandOutput, CommandRunner, RunFuture};
pub use command::RealCommandRunner;
